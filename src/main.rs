use std::path::Path;

use anyhow::Result;
use clap::Parser;

use tinyremap::cli::{inspect, Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { ref path } => {
            let tables = inspect::load(Path::new(path), &cli.from, &cli.to)?;
            println!("{}", inspect::format_summary(&tables, cli.format)?);
        }

        Commands::Classes { ref path } => {
            let tables = inspect::load(Path::new(path), &cli.from, &cli.to)?;
            println!("{}", inspect::format_classes(&tables, cli.format)?);
        }
    }

    Ok(())
}
