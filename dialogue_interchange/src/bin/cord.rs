//! Cord CLI - imports, exports and re-lays-out dialogue graphs.
//!
//! Usage:
//!   cord import-twee <script> <container> [--config path]
//!   cord import-json <json> <container> [--config path]
//!   cord export-json <container> <json>
//!   cord layout <container> [--config path]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dialogue_interchange::{
    export_json_file, import_json_file, import_twee_file, load_graph, relayout_container,
    save_graph, CordConfig, FileContainerStore, InterchangeResult,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "cord", version, about = "Branching dialogue graph tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from a Twee script and save it as a container
    ImportTwee {
        /// Twee script to read
        input: PathBuf,
        /// Container file to write
        container: PathBuf,
    },
    /// Build and lay out a graph from interchange JSON and save it as a container
    ImportJson {
        /// Interchange JSON to read
        input: PathBuf,
        /// Container file to write
        container: PathBuf,
    },
    /// Write a saved container as interchange JSON
    ExportJson {
        /// Container file to read
        container: PathBuf,
        /// Interchange JSON to write
        output: PathBuf,
    },
    /// Re-run auto-layout over a saved container
    Layout {
        /// Container file to update in place
        container: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> InterchangeResult<CordConfig> {
    match path {
        Some(path) => CordConfig::load(path),
        None => Ok(CordConfig::default()),
    }
}

fn cmd_import_twee(config: &CordConfig, input: &Path, container: &Path) -> InterchangeResult<()> {
    let (graph, report) = import_twee_file(input, config)?;
    save_graph(&mut FileContainerStore::current_dir(), container, &graph)?;
    for link in &report.unresolved {
        eprintln!(
            "Warning: choice {} of '{}' leads to unknown passage '{}'",
            link.source_port, link.source_id, link.target_title
        );
    }
    println!(
        "Imported {} nodes and {} links into {}",
        graph.node_count(),
        graph.link_count(),
        container.display()
    );
    Ok(())
}

fn cmd_import_json(config: &CordConfig, input: &Path, container: &Path) -> InterchangeResult<()> {
    let graph = import_json_file(input, config)?;
    save_graph(&mut FileContainerStore::current_dir(), container, &graph)?;
    println!(
        "Imported {} nodes and {} links into {}",
        graph.node_count(),
        graph.link_count(),
        container.display()
    );
    Ok(())
}

fn cmd_export_json(container: &Path, output: &Path) -> InterchangeResult<()> {
    let graph = load_graph(&FileContainerStore::current_dir(), container)?;
    export_json_file(&graph, output)?;
    println!("Exported {} nodes to {}", graph.node_count(), output.display());
    Ok(())
}

fn cmd_layout(config: &CordConfig, container: &Path) -> InterchangeResult<()> {
    let placed = relayout_container(&mut FileContainerStore::current_dir(), container, config)?;
    println!("Placed {} nodes in {}", placed, container.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::ImportTwee { input, container } => cmd_import_twee(&config, input, container),
        Commands::ImportJson { input, container } => cmd_import_json(&config, input, container),
        Commands::ExportJson { container, output } => cmd_export_json(container, output),
        Commands::Layout { container } => cmd_layout(&config, container),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
