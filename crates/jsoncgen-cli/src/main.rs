//! jsoncgen CLI - commented JSONC configuration files from Go structs.
//!
//! Parses arguments, sets up logging and runs the generation.

use clap::Parser;
use jsoncgen_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    commands::generate_execute(&args).map_err(error::cli_error_to_miette)
}
