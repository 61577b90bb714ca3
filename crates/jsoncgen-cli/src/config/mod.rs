//! Configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables and `jsoncgen.toml`.
//! Priority: CLI > Environment > File > Defaults

mod loading;
mod tests;

use std::path::{Path, PathBuf};

use jsoncgen::DocTypes;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub use loading::{CONFIG_FILE, ENV_PREFIX};

/// jsoncgen settings - loaded from jsoncgen.toml, the environment or CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsoncgenConfig {
    /// Directory of the Go package
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Struct type to render
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Pipe-separated doc-type names
    #[serde(default = "default_doc_types")]
    pub doc_types: String,

    /// Output file, stdout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
}

impl Default for JsoncgenConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            type_name: None,
            doc_types: default_doc_types(),
            out: None,
        }
    }
}

impl JsoncgenConfig {
    /// The struct to render, required from some source.
    pub fn type_name(&self) -> Result<&str> {
        match self.type_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(ConfigError::MissingField {
                field: "type".to_string(),
                hint: "Pass --type <TYPE>, set JSONCGEN_TYPE or add `type = \"...\"` to jsoncgen.toml"
                    .to_string(),
            }
            .into()),
        }
    }

    pub fn doc_types(&self) -> Result<DocTypes> {
        self.doc_types.parse().map_err(|err: jsoncgen::ParseDocTypesError| {
            ConfigError::InvalidValue {
                field: "doc_types".to_string(),
                value: self.doc_types.clone(),
                hint: err.to_string(),
            }
            .into()
        })
    }

    /// Whether the package directory was left at its default.
    pub fn uses_working_dir(&self) -> bool {
        self.dir == Path::new(".")
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_doc_types() -> String {
    DocTypes::ALL_FIELDS.to_string()
}
