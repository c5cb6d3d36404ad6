use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Dump, fill, and flatten PDF form fields.
#[derive(Debug, Parser)]
#[command(name = "pdffiller", about, version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Password for encrypted PDFs
    #[arg(long, global = true)]
    pub password: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the form fields of a PDF with their types, values and options
    DumpDataFields {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = DumpFormat::Text)]
        format: DumpFormat,
    },

    /// Fill a PDF's form fields from JSON or YAML data
    FillForm {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the output PDF file
        #[arg(short, long, value_name = "OUTPUT_PATH")]
        output: PathBuf,

        /// Data file with field/value pairs (.json, .yaml, .yml, or - for JSON on stdin)
        #[arg(
            short,
            long,
            value_name = "DATA_PATH",
            required_unless_present = "input_data",
            conflicts_with = "input_data"
        )]
        data: Option<String>,

        /// Inline JSON with field/value pairs
        #[arg(short, long, value_name = "DATA")]
        input_data: Option<String>,

        /// Merge the filled fields into the page content
        #[arg(short, long)]
        flatten: bool,

        /// Which skipped entries make the command fail
        #[arg(long, value_enum, default_value_t = OnFailure::NoneApplied)]
        on_failure: OnFailure,
    },
}

/// Output format for the field dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// `Key: value` lines, one block per field
    Text,
    /// JSON array of field objects
    Json,
}

/// When unknown names or rejected values turn a fill into a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnFailure {
    /// Report skipped entries but always succeed
    Ignore,
    /// Fail only when entries were given and none could be applied
    NoneApplied,
    /// Fail when any entry was skipped
    Any,
}
