extern crate nalgebra as na;

pub mod elements;
pub mod geo;
pub mod prelude;
pub mod state;
pub mod time;
pub mod tle;
