//! Command implementations.

mod generate;

pub use generate::execute as generate_execute;
