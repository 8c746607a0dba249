//! Share-link parsing
//!
//! [`explode`] routes a single link to the parser of its scheme;
//! [`explode_sub`] does the same for every line of a subscription body.

pub mod explodes;

pub use explodes::{detect_scheme, explode, explode_sub};
