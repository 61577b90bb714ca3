use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::Serialize;
use tracing::debug;

use crate::cli::Cli;
use crate::config::JsoncgenConfig;
use crate::error::{ConfigError, Result};

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "jsoncgen.toml";

/// Prefix of the environment variables read (`JSONCGEN_TYPE`, ...).
pub const ENV_PREFIX: &str = "JSONCGEN_";

const KEYS: [&str; 4] = ["dir", "type", "doc_types", "out"];

/// Values given on the command line; absent flags leave lower layers alone.
#[derive(Serialize)]
struct CliOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dir: Option<&'a Path>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out: Option<&'a Path>,
}

impl<'a> From<&'a Cli> for CliOverrides<'a> {
    fn from(args: &'a Cli) -> Self {
        Self {
            dir: args.dir.as_deref(),
            type_name: args.type_name.as_deref(),
            doc_types: args.doc_types.map(|flags| flags.to_string()),
            out: args.out.as_deref(),
        }
    }
}

impl JsoncgenConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file(args.config.as_deref())? {
            debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&KEYS));
        figment = figment.merge(Serialized::defaults(CliOverrides::from(args)));

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {CONFIG_FILE} syntax and field types"),
            }
            .into()
        })
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound(path.to_path_buf()).into()),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            Ok(default_path.is_file().then(|| default_path.to_path_buf()))
        }
    }
}
