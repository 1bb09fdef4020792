use clap::{Parser, Subcommand, ValueEnum};

pub mod inspect;

#[derive(Parser)]
#[command(
    name = "tinyremap",
    version,
    about = "Parse and inspect tiny-format mapping files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Source namespace
    #[arg(long, global = true, default_value = "official")]
    pub from: String,

    /// Target namespace
    #[arg(long, global = true, default_value = "named")]
    pub to: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a mapping file and print table sizes
    Inspect {
        /// Mapping file (.tiny, optionally .gz-compressed)
        path: String,
    },

    /// List class renames
    Classes {
        /// Mapping file (.tiny, optionally .gz-compressed)
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
