//! Building the model from parsed Go declarations.

mod constant;
mod defaults;
mod field;
mod structure;

pub use defaults::parse_defaults;
pub use field::parse_tags;
