//! hfsm - authoring tools for data-driven actor automatons.
//!
//! Loads automaton sets without a host application: states and events come
//! from a catalog manifest instead of native callbacks.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::OutputFormat;

/// Verify automaton sets and generate their data files.
#[derive(Parser, Debug)]
#[command(
    name = "hfsm",
    author,
    version,
    about = "hfsm: check and scaffold data-driven actor automatons",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true, env = "HFSM_JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a set and report every problem found.
    Verify {
        /// Structural XML file of the set.
        set: PathBuf,

        /// Catalog manifest listing event and state names.
        #[arg(short, long, env = "HFSM_CATALOG")]
        catalog: PathBuf,

        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },

    /// Write an empty lookup table for each automaton of a set.
    ///
    /// Tables are written where the set expects them; existing files are
    /// never overwritten.
    BlankTable {
        /// Structural XML file of the set.
        set: PathBuf,

        #[arg(short, long, env = "HFSM_CATALOG")]
        catalog: PathBuf,

        /// Only this automaton.
        #[arg(short, long)]
        automaton: Option<String>,
    },

    /// Write the linked lookup table of one automaton.
    DumpTable {
        set: PathBuf,

        #[arg(short, long, env = "HFSM_CATALOG")]
        catalog: PathBuf,

        #[arg(short, long)]
        automaton: String,

        /// Output file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Write a Lua stub defining every predicate the set uses.
    BlankScript {
        set: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export the state graph of a set as Graphviz DOT.
    Graph {
        set: PathBuf,

        #[arg(short, long, env = "HFSM_CATALOG")]
        catalog: PathBuf,

        /// Output file path (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Verify {
            set,
            catalog,
            format,
            strict,
        } => {
            let format: OutputFormat = format.parse()?;
            commands::verify::execute(&set, &catalog, format, strict)?;
        }

        Commands::BlankTable {
            set,
            catalog,
            automaton,
        } => {
            let written = commands::table::blank(&set, &catalog, automaton.as_deref())?;
            for path in written {
                println!("{}", path.display());
            }
        }

        Commands::DumpTable {
            set,
            catalog,
            automaton,
            output,
            force,
        } => {
            commands::table::dump(&set, &catalog, &automaton, &output, force)?;
        }

        Commands::BlankScript { set, output } => {
            let count = commands::script::blank(&set, &output)?;
            if !cli.quiet {
                println!("{count} predicates written to {}", output.display());
            }
        }

        Commands::Graph {
            set,
            catalog,
            output,
        } => {
            let dot = commands::graph::dot(&set, &catalog)?;
            match output {
                Some(path) => std::fs::write(&path, dot)?,
                None => print!("{dot}"),
            }
        }
    }

    Ok(())
}
