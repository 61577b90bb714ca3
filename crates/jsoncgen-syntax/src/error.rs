//! Error types for Go source loading and evaluation

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while reading, parsing or resolving Go sources
#[derive(Error, Debug, Diagnostic)]
pub enum SourceError {
    /// A file or directory could not be read
    #[error("failed to read '{}': {error}", path.display())]
    #[diagnostic(code(jsoncgen::syntax::io))]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The tokenizer or parser rejected a source file
    #[error("{}:{line}: {message}", path.display())]
    #[diagnostic(code(jsoncgen::syntax::parse))]
    Parse {
        path: PathBuf,
        line: u32,
        message: String,
    },

    /// A type name could not be found in scope
    #[error("undefined type: {0}")]
    #[diagnostic(code(jsoncgen::syntax::unknown_type))]
    UnknownType(String),

    /// A package qualifier does not match any import of the file
    #[error("undefined package qualifier: {0}")]
    #[diagnostic(code(jsoncgen::syntax::unknown_package))]
    UnknownPackage(String),

    /// An expression that had to be constant is not
    #[error("{0} is not a constant expression")]
    #[diagnostic(code(jsoncgen::syntax::not_constant))]
    NotConstant(String),

    /// Constant arithmetic failed (division by zero, mismatched operands, ...)
    #[error("invalid constant operation: {0}")]
    #[diagnostic(code(jsoncgen::syntax::invalid_operation))]
    InvalidOperation(String),

    /// A literal could not be decoded
    #[error("malformed literal {0}")]
    #[diagnostic(code(jsoncgen::syntax::invalid_literal))]
    InvalidLiteral(String),

    /// A constant refers to itself through its initializer
    #[error("constant definition loop involving {0}")]
    #[diagnostic(code(jsoncgen::syntax::constant_cycle))]
    ConstantCycle(String),

    /// A directory holds more than one package
    #[error("expected exactly 1 package in '{}', found {count}", dir.display())]
    #[diagnostic(code(jsoncgen::syntax::ambiguous_package))]
    AmbiguousPackage { dir: PathBuf, count: usize },
}

impl SourceError {
    /// Create an Io error for `path`
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Create a NotConstant error
    pub fn not_constant(what: impl Into<String>) -> Self {
        Self::NotConstant(what.into())
    }
}

/// Location-free parse failure, attached to a file by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Attach the file this error was found in
    pub fn in_file(self, path: impl Into<PathBuf>) -> SourceError {
        SourceError::Parse {
            path: path.into(),
            line: self.line,
            message: self.message,
        }
    }
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
