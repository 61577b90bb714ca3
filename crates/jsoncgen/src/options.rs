use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use miette::Diagnostic;
use thiserror::Error;

bitflags! {
    /// Which fields get their type shown in comments.
    ///
    /// The empty set shows types everywhere. `NOT_FIELDS` hides every type
    /// regardless of the other flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DocTypes: u8 {
        /// Hide types of struct fields.
        const NOT_STRUCT_FIELDS = 1 << 0;
        /// Hide types of slice and array fields.
        const NOT_ARRAY_FIELDS = 1 << 1;
        /// Hide types of map fields.
        const NOT_MAP_FIELDS = 1 << 2;
        /// Hide all types.
        const NOT_FIELDS = 1 << 3;
    }
}

const NAMES: [(&str, DocTypes); 4] = [
    ("NotFields", DocTypes::NOT_FIELDS),
    ("NotStructFields", DocTypes::NOT_STRUCT_FIELDS),
    ("NotArrayFields", DocTypes::NOT_ARRAY_FIELDS),
    ("NotMapFields", DocTypes::NOT_MAP_FIELDS),
];

impl DocTypes {
    /// Show types on all fields.
    pub const ALL_FIELDS: Self = Self::empty();
}

/// An unknown name in a `--doc-types` list.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
#[error("unknown doc type '{0}'")]
#[diagnostic(
    code(jsoncgen::options::doc_types),
    help("use AllFields or a pipe-separated list of NotFields, NotStructFields, NotArrayFields, NotMapFields")
)]
pub struct ParseDocTypesError(pub String);

impl FromStr for DocTypes {
    type Err = ParseDocTypesError;

    /// Parse a pipe-separated list such as `NotStructFields|NotMapFields`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = DocTypes::empty();
        for name in s.split('|').map(str::trim).filter(|name| !name.is_empty()) {
            if name == "AllFields" {
                continue;
            }
            let flag = NAMES
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| ParseDocTypesError(name.to_string()))?;
            flags |= flag;
        }
        Ok(flags)
    }
}

impl fmt::Display for DocTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("AllFields")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipe_separated_names() {
        let flags: DocTypes = "NotStructFields | NotMapFields".parse().unwrap();
        assert_eq!(flags, DocTypes::NOT_STRUCT_FIELDS | DocTypes::NOT_MAP_FIELDS);
        assert_eq!(flags.to_string(), "NotStructFields|NotMapFields");

        assert_eq!("".parse::<DocTypes>().unwrap(), DocTypes::ALL_FIELDS);
        assert_eq!("AllFields".parse::<DocTypes>().unwrap(), DocTypes::ALL_FIELDS);
        assert_eq!(DocTypes::default().to_string(), "AllFields");
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "NotFields|Everything".parse::<DocTypes>().unwrap_err();
        assert_eq!(err, ParseDocTypesError("Everything".into()));
    }
}
