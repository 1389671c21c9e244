//! pageable - page through remote record collections from the command line.
//!
//! Provides commands to show a single page and to walk a collection by
//! following its `next` links.

mod commands;
mod output;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{page, walk};
use output::OutputFormat;
use pageable_core::config::Config;
use pageable_core::telemetry::init_logging;

/// pageable - infinite paging over remote collections
#[derive(Parser)]
#[command(
    name = "pageable",
    author = "Aezi <aezi.zhu@icloud.com>",
    version,
    about = "Page through remote record collections",
    long_about = "Fetches pages of JSON records, following RFC 5988 Link headers and caching \
                  every page already seen.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "PAGEABLE_CONFIG")]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a single page
    Page(page::PageArgs),

    /// Follow next links through the collection
    Walk(walk::WalkArgs),
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    match cli.verbose {
        0 => {}
        1 => config.logging.level = "debug".to_string(),
        _ => config.logging.level = "trace".to_string(),
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    };
    init_logging(&config.logging)?;

    let format = cli.output;
    let result = match cli.command {
        Commands::Page(args) => page::execute(args, &config, format).await,
        Commands::Walk(args) => walk::execute(args, &config, format).await,
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_page_command() {
        let cli = Cli::try_parse_from([
            "pageable",
            "-o",
            "json",
            "page",
            "https://api.example.test/items",
            "--page",
            "3",
            "-s",
            "5",
            "-q",
            "sort=name",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Page(_)));
    }

    #[test]
    fn test_rejects_bad_page() {
        assert!(Cli::try_parse_from(["pageable", "page", "url", "--page", "nosuchpage"]).is_err());
    }
}
