pub use crate::checksum::{checksum, with_checksum};
pub use crate::elements::{catalog_number, parse_elements, parse_record, ElementsError};
pub use crate::format::format_elements;
pub use crate::parser::{parse_tle_set, ParseError, ParseErrorExt};

pub mod checksum;
pub mod elements;
pub mod format;
pub mod parser;

/// Columns per element line, checksum included
pub const LINE_LENGTH: usize = 69;

/// Two digit epoch years at or above this are 19xx, below are 20xx
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 57;
