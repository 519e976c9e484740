use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A named two-line element set, exactly as exchanged with the catalog
/// https://en.wikipedia.org/wiki/Two-line_element_set
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Serialize, Deserialize)]
#[display(fmt = "{}", "name")]
pub struct TleRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl TleRecord {
    pub fn new<N, L1, L2>(name: N, line1: L1, line2: L2) -> Self
    where
        N: Into<String>,
        L1: Into<String>,
        L2: Into<String>,
    {
        Self {
            name: name.into(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }
}
