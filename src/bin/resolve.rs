//! Schema Resolve CLI
//!
//! Inlines every `$ref` of a schema file and writes the resolved schema and
//! its reference graph.

use anyhow::Context;
use clap::Parser;
use schema_refgraph::graph::{cycles, to_dot};
use schema_refgraph::{RefResolver, ResolverConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-resolve")]
#[command(about = "Resolve JSON Schema $refs and export the type reference graph")]
struct Cli {
    /// Root schema file
    schema: PathBuf,

    /// Extra search path for relative references (repeatable)
    #[arg(short, long = "search-path")]
    search_path: Vec<PathBuf>,

    /// Reference to inline without a graph entry (repeatable)
    #[arg(short, long = "ignore")]
    ignore: Vec<String>,

    /// Config file (defaults to refgraph.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file for the resolved schema (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file for the reference graph (JSON)
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Output file for the reference graph (GraphViz DOT)
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ResolverConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let content = std::fs::read_to_string(&cli.schema)
        .with_context(|| format!("reading {}", cli.schema.display()))?;
    let root: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", cli.schema.display()))?;

    let schema_dir = cli
        .schema
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let resolver = RefResolver::new()
        .search_paths([schema_dir])
        .with_config(&config)
        .search_paths(cli.search_path)
        .ignorable_types(&cli.ignore);
    tracing::debug!(search_paths = ?resolver.search_path_list(), "searching for references");

    let resolution = resolver
        .resolve(&root)
        .with_context(|| format!("resolving {}", cli.schema.display()))?;

    tracing::info!(
        types = resolution.graph.resolved_titles().count(),
        references = resolution.graph.reference_count(),
        "resolved {}",
        cli.schema.display()
    );
    for group in cycles(&resolution.graph) {
        tracing::warn!("reference cycle between types: {}", group.join(", "));
    }

    let format = config.output.format;
    let rendered = format.render(&resolution.schema)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("✅ Resolved schema written to: {:?}", path);
        }
        None => println!("{}", rendered),
    }

    if let Some(path) = &cli.graph {
        std::fs::write(path, format.render(&resolution.graph)?)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("✅ Reference graph written to: {:?}", path);
    }

    if let Some(path) = &cli.dot {
        std::fs::write(path, to_dot(&resolution.graph))
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("✅ Exported DOT to: {:?}", path);
    }

    Ok(())
}
