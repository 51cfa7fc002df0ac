use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod core;
mod mcp;
pub mod ui;

use commands::{config, read, search, serve};

#[derive(Parser)]
#[command(name = "kwsearch")]
#[command(about = "MCP server that searches for keywords in files via resources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as MCP server over stdio
    #[command(name = "mcp-server", alias = "serve")]
    McpServer,

    /// Search a file for a literal keyword
    #[command(alias = "s")]
    Search {
        /// Keyword to search for (matched literally, whitespace trimmed)
        keyword: String,

        /// File to search
        path: String,

        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,

        /// Print the raw search result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a file's text content
    #[command(alias = "r")]
    Read {
        /// File to read
        path: String,
    },

    /// Configure kwsearch settings
    #[command(alias = "c")]
    Config {
        /// Characters of context kept on each side of a match
        #[arg(long)]
        snippet_radius: Option<usize>,

        /// Reject files larger than this many bytes (0 removes the limit)
        #[arg(long)]
        max_file_size: Option<u64>,

        /// Default log level (off, error, warn, info, debug, trace)
        #[arg(long)]
        log_level: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Restore default settings
        #[arg(long)]
        reset: bool,
    },
}

fn init_logging(verbose: u8) {
    let configured = crate::core::config::Config::load()
        .ok()
        .and_then(|c| c.log_level)
        .unwrap_or_else(|| "warn".to_string());

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(configured),
    );
    builder.target(env_logger::Target::Stderr);

    let level = match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }

    let _ = builder.try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::McpServer) => {
            serve::run().await?;
        }
        Some(Commands::Search {
            keyword,
            path,
            case_sensitive,
            json,
        }) => {
            search::run(search::SearchOptions {
                keyword,
                path,
                case_sensitive,
                json,
            })
            .await?;
        }
        Some(Commands::Read { path }) => {
            read::run(read::ReadOptions { path }).await?;
        }
        Some(Commands::Config {
            snippet_radius,
            max_file_size,
            log_level,
            show,
            reset,
        }) => {
            config::run(config::ConfigOptions {
                snippet_radius,
                max_file_size,
                log_level,
                show,
                reset,
            })
            .await?;
        }
        None => {
            // Show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
