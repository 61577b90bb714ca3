//! Command-line interface definition for jsoncgen.
//!
//! Every option may also come from `jsoncgen.toml` or a `JSONCGEN_*`
//! environment variable; flags given here take precedence.

mod tests;
mod validation;

use std::path::PathBuf;

use clap::Parser;
use jsoncgen::DocTypes;

pub use validation::parse_doc_types;

/// jsoncgen - commented JSONC configuration files from Go structs
#[derive(Parser, Debug)]
#[command(
    name = "jsoncgen",
    version,
    about = "Generate a commented JSONC configuration file from a Go struct",
    long_about = "jsoncgen reads the Go package in PACKAGE_DIR and writes the JSONC document of\n\
                  the struct named by --type. Field doc comments become JSONC comments, values come\n\
                  from the optional <Type>Defaults() function and typed constants are listed as\n\
                  allowed values.",
    after_help = "Allowed names for --doc-types:\n  \
                  NotFields        Does not display the type of any field\n  \
                  NotStructFields  Does not display the type of struct fields\n  \
                  NotArrayFields   Does not display the type of array and slice fields\n  \
                  NotMapFields     Does not display the type of map fields"
)]
pub struct Cli {
    /// Directory of the Go package declaring the type
    ///
    /// Defaults to the current working directory.
    #[arg(value_name = "PACKAGE_DIR")]
    pub dir: Option<PathBuf>,

    /// Struct type to generate the JSONC document for
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: Option<String>,

    /// Pipe-separated list of fields whose type is not shown in comments
    ///
    /// For example `NotStructFields|NotMapFields`. When omitted the type of
    /// every field is shown.
    #[arg(long, value_name = "BITS", value_parser = parse_doc_types)]
    pub doc_types: Option<DocTypes>,

    /// Output file; the document is written to stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Configuration file to use instead of ./jsoncgen.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
