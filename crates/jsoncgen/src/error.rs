use std::path::PathBuf;

use jsoncgen_syntax::SourceError;
use miette::Diagnostic;
use thiserror::Error;

use crate::MAX_DEPTH;

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Broad classes of generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input directory or its declarations cannot be used.
    Input,
    /// A requested struct does not exist.
    Lookup,
    /// The defaults factory has the wrong shape.
    Signature,
    /// The model cannot be rendered.
    Structural,
    /// Loading or evaluating Go sources failed.
    Source,
}

/// Error variants for extraction and rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    /// The package path is not a directory.
    #[error("'{}' is not a directory", path.display())]
    #[diagnostic(code(jsoncgen::input::not_a_directory))]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// The package path cannot be accessed.
    #[error("failed to access '{}': {error}", path.display())]
    #[diagnostic(code(jsoncgen::input::io))]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The directory does not hold exactly one package.
    #[error("expected exactly 1 package in '{}', found {count}", dir.display())]
    #[diagnostic(
        code(jsoncgen::input::ambiguous_package),
        help("point the generator at a directory containing a single Go package")
    )]
    AmbiguousPackage {
        /// Package directory.
        dir: PathBuf,
        /// Number of packages found.
        count: usize,
    },

    /// A struct field declares several names at once (`A, B int`).
    #[error("unsupported multiple names in a field of {owner}: {}", names.join(", "))]
    #[diagnostic(
        code(jsoncgen::input::multiple_names),
        help("declare each field on its own line")
    )]
    MultipleNames {
        /// Qualified name of the struct.
        owner: String,
        /// Names sharing the declaration.
        names: Vec<String>,
    },

    /// The target type is not a struct of the package.
    #[error("cannot find struct {name} in package {package}")]
    #[diagnostic(code(jsoncgen::lookup::struct_not_found))]
    StructNotFound {
        /// Requested type name.
        name: String,
        /// Package import path.
        package: String,
    },

    /// `<Name>Defaults` exists with the wrong signature.
    #[error("invalid defaults function signature\nexpected: {expected}\nfound:    {found}")]
    #[diagnostic(code(jsoncgen::signature::defaults))]
    InvalidDefaultsSignature {
        /// Signature the generator looks for.
        expected: String,
        /// Signature found in the source.
        found: String,
    },

    /// A nested value refers to a type that is not an extracted struct.
    #[error("cannot lookup structure {0}")]
    #[diagnostic(code(jsoncgen::structural::unresolved_structure))]
    UnresolvedStructure(String),

    /// A slice or map field is embedded.
    #[error("field of slice or map type {0} cannot be embedded")]
    #[diagnostic(code(jsoncgen::structural::embedded_collection))]
    EmbeddedCollection(String),

    /// No zero value is known for a field type.
    #[error("unhandled zero value for type {0}")]
    #[diagnostic(code(jsoncgen::structural::unhandled_zero_value))]
    UnhandledZeroValue(String),

    /// A default value does not fit the shape of its field.
    #[error("default value of {field} is {found}, expected {expected}")]
    #[diagnostic(code(jsoncgen::structural::unexpected_value))]
    UnexpectedValue {
        /// Field or type the value belongs to.
        field: String,
        /// Expected shape.
        expected: &'static str,
        /// Shape found.
        found: &'static str,
    },

    /// Structures or defaults nest beyond the recursion limit.
    #[error("{0} nests deeper than {max} levels", max = MAX_DEPTH)]
    #[diagnostic(code(jsoncgen::structural::nesting_too_deep))]
    NestingTooDeep(String),

    /// The defaults literal uses a form that cannot be turned into values.
    #[error("unsupported literal in {function}: {detail}")]
    #[diagnostic(
        code(jsoncgen::structural::unsupported_literal),
        help("defaults must be keyed composite literals of constant expressions")
    )]
    UnsupportedLiteral {
        /// Defaults function name.
        function: String,
        /// What was rejected.
        detail: String,
    },

    /// Loading, parsing or evaluating Go sources failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotADirectory { .. }
            | Self::Io { .. }
            | Self::AmbiguousPackage { .. }
            | Self::MultipleNames { .. } => ErrorKind::Input,
            Self::StructNotFound { .. } => ErrorKind::Lookup,
            Self::InvalidDefaultsSignature { .. } => ErrorKind::Signature,
            Self::UnresolvedStructure(_)
            | Self::EmbeddedCollection(_)
            | Self::UnhandledZeroValue(_)
            | Self::UnexpectedValue { .. }
            | Self::NestingTooDeep(_)
            | Self::UnsupportedLiteral { .. } => ErrorKind::Structural,
            Self::Source(SourceError::AmbiguousPackage { .. }) => ErrorKind::Input,
            Self::Source(_) => ErrorKind::Source,
        }
    }

    /// Errors that signal a declaration the generator can never handle,
    /// as opposed to a problem with this particular run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MultipleNames { .. } | Self::UnhandledZeroValue(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        let err = GenerateError::MultipleNames {
            owner: "example.com/app.Config".into(),
            names: vec!["A".into(), "B".into()],
        };
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "unsupported multiple names in a field of example.com/app.Config: A, B"
        );

        let err = GenerateError::StructNotFound {
            name: "Missing".into(),
            package: "example.com/app".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert!(!err.is_fatal());

        let err = GenerateError::from(SourceError::UnknownType("Nope".into()));
        assert_eq!(err.kind(), ErrorKind::Source);
    }
}
