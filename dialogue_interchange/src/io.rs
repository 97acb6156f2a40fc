//! File workflows: reading scripts and interchange files, saving and loading containers.
//!
//! Every function here either completes or returns an error before touching
//! the caller's graph.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use dialogue_graph::DialogueGraph;
use tracing::info;

use crate::builder::{BuildReport, GraphBuilder};
use crate::config::CordConfig;
use crate::error::{InterchangeError, InterchangeResult};
use crate::layout::AutoLayout;
use crate::serializer::{export_json, from_json_str, import_json, to_json_string, ContainerData};
use crate::store::ContainerStore;
use crate::twee::parse_passages;

/// Read a whole text file. A missing file is [`InterchangeError::MissingFile`].
pub fn read_text(path: impl AsRef<Path>) -> InterchangeResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => InterchangeError::MissingFile(path.to_path_buf()),
        _ => InterchangeError::Io(err),
    })
}

/// Write a whole text file, replacing any previous content.
pub fn write_text(path: impl AsRef<Path>, text: &str) -> InterchangeResult<()> {
    fs::write(path, text)?;
    Ok(())
}

/// Build a graph from Twee script text.
///
/// The builder's own placement is kept; no auto-layout runs.
pub fn import_twee_str(text: &str, config: &CordConfig) -> (DialogueGraph, BuildReport) {
    let passages = parse_passages(text);
    GraphBuilder::new(config.builder).build(&passages)
}

/// Build a graph from a Twee script file.
pub fn import_twee_file(
    path: impl AsRef<Path>,
    config: &CordConfig,
) -> InterchangeResult<(DialogueGraph, BuildReport)> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let (graph, report) = import_twee_str(&text, config);
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        unresolved = report.unresolved.len(),
        "imported Twee script"
    );
    Ok((graph, report))
}

/// Build and lay out a graph from an interchange JSON file.
pub fn import_json_file(path: impl AsRef<Path>, config: &CordConfig) -> InterchangeResult<DialogueGraph> {
    let path = path.as_ref();
    let root = from_json_str(&read_text(path)?)?;
    let graph = import_json(&root, &config.layout);
    info!(path = %path.display(), nodes = graph.node_count(), "imported JSON file");
    Ok(graph)
}

/// Write a graph as pretty-printed interchange JSON.
pub fn export_json_file(graph: &DialogueGraph, path: impl AsRef<Path>) -> InterchangeResult<()> {
    let path = path.as_ref();
    write_text(path, &to_json_string(&export_json(graph))?)?;
    info!(path = %path.display(), nodes = graph.node_count(), "exported JSON file");
    Ok(())
}

/// Save a graph into a container store.
pub fn save_graph<S: ContainerStore + ?Sized>(
    store: &mut S,
    path: impl AsRef<Path>,
    graph: &DialogueGraph,
) -> InterchangeResult<()> {
    let path = path.as_ref();
    store.save(path, &ContainerData::capture(graph))?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        links = graph.link_count(),
        "saved dialogue graph"
    );
    Ok(())
}

/// Load a graph from a container store.
pub fn load_graph<S: ContainerStore + ?Sized>(
    store: &S,
    path: impl AsRef<Path>,
) -> InterchangeResult<DialogueGraph> {
    let path = path.as_ref();
    match store.load(path)? {
        Some(data) => Ok(data.restore()),
        None => Err(InterchangeError::MissingFile(path.to_path_buf())),
    }
}

/// Replace a live graph with a stored container. On error the graph is untouched.
pub fn load_graph_into<S: ContainerStore + ?Sized>(
    store: &S,
    path: impl AsRef<Path>,
    graph: &mut DialogueGraph,
) -> InterchangeResult<()> {
    *graph = load_graph(store, path)?;
    Ok(())
}

/// Load a container, re-run auto-layout over it, and save it back.
///
/// Returns the number of nodes placed.
pub fn relayout_container<S: ContainerStore + ?Sized>(
    store: &mut S,
    path: impl AsRef<Path>,
    config: &CordConfig,
) -> InterchangeResult<usize> {
    let path = path.as_ref();
    let mut graph = load_graph(store, path)?;
    let placed = AutoLayout::new(config.layout).apply(&mut graph);
    save_graph(store, path, &graph)?;
    Ok(placed)
}
