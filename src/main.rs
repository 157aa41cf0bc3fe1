//! `rilgraph` command line entry point.
//!
//! Reads a graph configuration, resolves every port format and writes the result
//! as C source, a readable plan or a Graphviz graph.

use clap::{Parser, ValueEnum};
use rilgraph::config;
use rilgraph::emit::{BuildPlan, CSourceOptions, render_c};
use rilgraph::negotiation::ResolvedGraph;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "rilgraph")]
#[command(about = "Resolve component graph formats and emit init/finalize code", long_about = None)]
struct Cli {
    /// Configuration file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(short, long, value_enum, default_value_t = Emit::C)]
    emit: Emit,

    /// Support header included by the generated C source
    #[arg(long, default_value = "genmmal_internal.h")]
    header: String,

    /// Prefix of the generated C functions
    #[arg(long, default_value = "genmmal")]
    prefix: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// C translation unit with init and finalize functions
    C,
    /// Readable list of handles and operations
    Plan,
    /// Graphviz DOT of the topology
    Dot,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rilgraph=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rilgraph: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> rilgraph::Result<()> {
    let graph = match &cli.input {
        Some(path) => config::from_path(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            config::from_str(&text)?
        }
    };

    let rendered = match cli.emit {
        Emit::Dot => graph.to_dot(),
        Emit::Plan | Emit::C => {
            let resolved = ResolvedGraph::resolve(graph)?;
            let plan = BuildPlan::from_resolved(&resolved);
            if cli.emit == Emit::Plan {
                plan.to_string()
            } else {
                let options = CSourceOptions::default()
                    .with_header(&cli.header)
                    .with_prefix(&cli.prefix);
                render_c(&plan, &options)
            }
        }
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "output written");
        }
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}
