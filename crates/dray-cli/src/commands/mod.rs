//! CLI command implementations.

pub mod fetch;
pub mod parse;
pub mod url;
