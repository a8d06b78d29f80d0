#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
// parse and url always succeed once clap has accepted the arguments, but
// every command reports through the same Result-returning signature
#![allow(clippy::unnecessary_wraps)]

mod commands;
mod logging;
mod registry;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dray")]
#[command(author, version, about = "Package URL coordinates and tarball retrieval", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Parse a package request URL into coordinates
    Parse {
        /// Request URL, e.g. "/@scope/name@1.0.0/lib/index.js?main=browser"
        url: String,
    },

    /// Build the canonical path for a set of coordinates
    Url {
        /// Package name ("name" or "@scope/name")
        name: String,

        /// Version token (omitted = no version segment)
        #[arg(long)]
        version: Option<String>,

        /// Path inside the package, leading '/' included
        #[arg(long)]
        filename: Option<String>,

        /// Query string to append, leading '?' included
        #[arg(long)]
        search: Option<String>,
    },

    /// Fetch a package tarball and extract it into a directory
    Fetch {
        /// Request path (leading '/') resolved through the registry, or a
        /// direct tarball URL
        target: String,

        /// Directory to extract into
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Registry used to resolve request paths
        #[arg(long, env = registry::REGISTRY_ENV, default_value = registry::DEFAULT_REGISTRY)]
        registry: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Commands::Parse { url } => commands::parse::run(&url, cli.json),
        Commands::Url {
            name,
            version,
            filename,
            search,
        } => commands::url::run(
            &name,
            version.as_deref(),
            filename.as_deref(),
            search.as_deref(),
            cli.json,
        ),
        Commands::Fetch {
            target,
            output,
            registry,
        } => commands::fetch::run(&target, &output, &registry, cli.json),
    }
}
