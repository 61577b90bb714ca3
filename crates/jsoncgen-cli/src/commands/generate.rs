use std::fs;
use std::io::Write;

use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::JsoncgenConfig;
use crate::error::{Result, ResultExt};
use crate::ui;

/// Generate the JSONC document and write it to the output file or stdout.
///
/// Nothing is written unless generation succeeded.
pub fn execute(args: &Cli) -> Result<()> {
    let config = JsoncgenConfig::load(args)?;
    debug!(?config, "resolved configuration");

    let type_name = config.type_name()?;
    let doc_types = config.doc_types()?;

    if config.uses_working_dir() && !args.quiet {
        ui::warning("No directory specified, using current working dir.");
    }
    info!(dir = %config.dir.display(), type_name, %doc_types, "generating JSONC");

    let jsonc = jsoncgen::generate(&config.dir, type_name, doc_types)?;

    match &config.out {
        Some(path) => {
            fs::write(path, &jsonc)
                .with_path(path)
                .with_hint("Check that the output directory exists and is writable")?;
            if !args.quiet {
                ui::success(&format!("Wrote {}", path.display()));
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(jsonc.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
