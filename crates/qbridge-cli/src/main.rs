//! qbridge Command-Line Interface
//!
//! Rebase OpenQASM programs onto a gate set, apply dialect compatibility
//! rewrites, and convert programs along the conversion graph.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compat, conversions, decompose, graph, path, rebase, transpile, version};

/// qbridge - move quantum programs between representations
#[derive(Parser)]
#[command(name = "qbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Transpiler configuration file (YAML)
    #[arg(short, long, global = true, env = "QBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite an OpenQASM program so it only uses the given gates
    Rebase {
        /// Input OpenQASM file ("-" for stdin)
        input: String,

        /// Comma separated basis gates, or "any"
        #[arg(short, long, default_value = "any")]
        basis: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Return the input unchanged instead of failing when gates remain
        /// outside the basis
        #[arg(long)]
        no_verify: bool,
    },

    /// Expand controlled rotations (crx, cry, crz, cy, cz)
    Decompose {
        /// Input OpenQASM file ("-" for stdin)
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Apply text-level dialect rewrites
    Compat {
        /// Input OpenQASM file ("-" for stdin)
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Rename gates towards this spelling (standard, vendor)
        #[arg(long)]
        rename: Option<String>,

        /// Also rename gates the program defines itself
        #[arg(long, requires = "rename")]
        force: bool,

        /// Replace pi expressions with decimal values
        #[arg(long)]
        pi_to_decimal: bool,

        /// Drop redundant parentheses around gate arguments
        #[arg(long)]
        simplify_parens: bool,

        /// Remove gate definitions nothing calls
        #[arg(long)]
        remove_unused: bool,

        /// Rewrite OpenQASM 3 declarations as qreg/creg
        #[arg(long)]
        qasm2_declarations: bool,
    },

    /// Convert a program to a target type
    Transpile {
        /// Input OpenQASM file ("-" for stdin)
        input: String,

        /// Target program type (qasm2, qasm3, openqasm3, ionq, ...)
        #[arg(short, long)]
        target: String,

        /// Intermediate types to pass through before the target
        #[arg(long, value_delimiter = ',')]
        via: Vec<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show conversion paths between two program types
    Path {
        /// Source program type
        source: String,

        /// Target program type
        target: String,

        /// Show up to this many paths, fewest hops first
        #[arg(short = 'k', long)]
        top: Option<usize>,
    },

    /// List the conversions in the graph
    Conversions {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the conversion graph
    Graph {
        /// Output format (dot, types)
        #[arg(short, long, default_value = "dot")]
        format: String,

        /// Keep only nodes of these experiment types
        #[arg(long, value_delimiter = ',')]
        experiment: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Rebase {
            input,
            basis,
            output,
            no_verify,
        } => rebase::execute(&input, &basis, output.as_deref(), !no_verify),

        Commands::Decompose { input, output } => decompose::execute(&input, output.as_deref()),

        Commands::Compat {
            input,
            output,
            rename,
            force,
            pi_to_decimal,
            simplify_parens,
            remove_unused,
            qasm2_declarations,
        } => compat::execute(
            &input,
            output.as_deref(),
            &compat::CompatOptions {
                rename,
                force,
                pi_to_decimal,
                simplify_parens,
                remove_unused,
                qasm2_declarations,
            },
        ),

        Commands::Transpile {
            input,
            target,
            via,
            output,
        } => transpile::execute(&input, &target, &via, output.as_deref(), config),

        Commands::Path {
            source,
            target,
            top,
        } => path::execute(&source, &target, top, config),

        Commands::Conversions { json } => conversions::execute(json, config),

        Commands::Graph { format, experiment } => graph::execute(&format, &experiment, config),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
