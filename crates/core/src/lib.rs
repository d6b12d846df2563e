#![forbid(unsafe_code)]

pub mod definition;
pub mod model;

pub use definition::{DefinitionParser, FormatError, UnknownTypePolicy, parse_definition};
