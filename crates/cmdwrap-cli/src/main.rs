#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;
mod project;

use clap::{CommandFactory, Parser};
use cmdwrap_core::Config;
use miette::{IntoDiagnostic, Result};
use project::{Context, ResolveArgs};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cmdwrap")]
#[command(author, version, about = "Resolve CMD module ids and dependencies", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Options file (defaults to cmdwrap.json at the project root)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(flatten)]
    resolve: ResolveArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the module id of a file
    Id {
        /// File to resolve
        file: PathBuf,
    },

    /// Print the dependency array of a file
    Deps {
        /// File to resolve
        file: PathBuf,
    },

    /// Print a stylesheet with its imports inlined
    Css {
        /// Stylesheet to inline
        file: PathBuf,

        /// Write the stylesheet and its url() resources here instead
        #[arg(short, long, value_name = "DIR")]
        outdir: Option<PathBuf>,
    },

    /// Wrap files as define() modules
    Wrap {
        /// Files to wrap
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (prints to stdout if omitted)
        #[arg(short, long, value_name = "DIR")]
        outdir: Option<PathBuf>,

        /// Append the modules each file pulls in, per --include
        #[arg(long)]
        concat: bool,
    },

    /// Dump the loaded package graph
    Graph,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    let Some(command) = cli.command else {
        Cli::command().print_help().into_diagnostic()?;
        return Ok(());
    };

    if matches!(command, Commands::Version) {
        return commands::version::run();
    }

    logging::init(config.verbosity, config.json_logs);

    let ctx = Context {
        cwd: config.cwd,
        config: cli.config,
        resolve: cli.resolve,
        json: cli.json,
    };

    match command {
        Commands::Version => commands::version::run(),
        Commands::Id { file } => commands::id::run(&ctx, &file),
        Commands::Deps { file } => commands::deps::run(&ctx, &file),
        Commands::Css { file, outdir } => commands::css::run(&ctx, &file, outdir.as_deref()),
        Commands::Wrap {
            files,
            outdir,
            concat,
        } => commands::wrap::run(&ctx, &files, outdir.as_deref(), concat),
        Commands::Graph => commands::graph::run(&ctx),
    }
}
