//! Lemmings CLI - Command-line interface for the level catalog and asset cache.

// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use lemmings::cache::Method;
use std::process::ExitCode;

/// Lemmings - level catalog and offline asset cache
#[derive(Parser, Debug)]
#[command(name = "lemmings")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// List every level in catalog order
    List {
        /// Level table to read instead of the bundled one
        #[arg(short, long)]
        catalog: Option<std::path::PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Show one level in detail
    Show {
        /// Catalog index (0-based)
        #[arg(required = true)]
        index: usize,

        /// Level table to read instead of the bundled one
        #[arg(short, long)]
        catalog: Option<std::path::PathBuf>,
    },

    /// Validate a level table (default: the bundled one)
    Validate {
        /// Level table file
        file: Option<std::path::PathBuf>,
    },

    /// Serve paths through the asset cache
    Fetch {
        /// Directory the origin is served from
        #[arg(short, long, required = true)]
        root: std::path::PathBuf,

        /// Proxy configuration file (JSON)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Cache file to load before and save after serving
        #[arg(short, long)]
        store: Option<std::path::PathBuf>,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: Method,

        /// Paths or URLs to request, in order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::List { catalog, format } => cli::list::execute(catalog, format),

        Commands::Show { index, catalog } => cli::show::execute(index, catalog),

        Commands::Validate { file } => cli::validate::execute(file),

        Commands::Fetch {
            root,
            config,
            store,
            method,
            paths,
        } => cli::fetch::execute(root, config, store, method, paths),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
