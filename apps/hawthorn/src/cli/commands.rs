//! # CLI Command Implementations
//!
//! Each command loads the snapshot, runs one engine operation, prints the
//! outcome and, for mutations, writes the snapshot back. Commands also
//! return their outcome so callers other than `main` can inspect it.

use super::Context;
use crate::bulk::{LoadDocument, LoadReport};
use crate::pipeline::{QueryOutcome, QueryPlan};
use hawthorn_core::{
    Edge, EdgeWeight, Graph, GraphStore, HawthornError, NodeId, Properties, graph_from_bytes,
    graph_to_bytes,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a bulk-load document (100 MB).
const MAX_LOAD_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum size of a snapshot file (500 MB).
const MAX_SNAPSHOT_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), HawthornError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| HawthornError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(HawthornError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `..` and symlinks and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, HawthornError> {
    let canonical = path.canonicalize().map_err(|e| {
        HawthornError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(HawthornError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Confirmation line, silenced by `--quiet` and `--json-mode`.
fn confirm(ctx: &Context, message: impl std::fmt::Display) {
    if !ctx.quiet && !ctx.json_mode {
        println!("{}", message);
    }
}

fn id_list(nodes: &[NodeId]) -> Vec<u64> {
    nodes.iter().map(|n| n.0).collect()
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write an empty snapshot.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), HawthornError> {
    if ctx.database.exists() && !force {
        return Err(HawthornError::IoError(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    save_graph(&Graph::new(), &ctx.database)?;
    confirm(ctx, format_args!("Initialized new database at {:?}", ctx.database));
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub node_count: usize,
    pub edge_count: usize,
    pub edge_types: Vec<String>,
}

/// Show node, edge and edge type counts.
pub fn cmd_status(ctx: &Context) -> Result<Status, HawthornError> {
    let graph = load_graph(ctx)?;
    let status = Status {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        edge_types: graph
            .edge_types()
            .iter()
            .map(|(_, name)| name.to_string())
            .collect(),
    };

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "database": ctx.database.to_string_lossy(),
            "node_count": status.node_count,
            "edge_count": status.edge_count,
            "edge_types": status.edge_types,
        }));
        return Ok(status);
    }

    println!("Hawthorn Graph Status");
    println!("=====================");
    println!("Database:   {:?}", ctx.database);
    println!();
    println!("Nodes:      {}", status.node_count);
    println!("Edges:      {}", status.edge_count);
    println!("Edge Types: {}", status.edge_types.len());
    for name in &status.edge_types {
        println!("  {}", name);
    }

    Ok(status)
}

// =============================================================================
// NODE COMMANDS
// =============================================================================

/// Create a node and print its id.
pub fn cmd_create(ctx: &Context, props: Vec<(String, String)>) -> Result<NodeId, HawthornError> {
    let mut graph = load_graph(ctx)?;
    let properties: Properties = props.into_iter().collect();
    let node = graph.create_node(properties)?;
    save_graph(&graph, &ctx.database)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "node": node.0 }));
    } else {
        println!("{}", node.0);
    }
    Ok(node)
}

/// Set one property.
pub fn cmd_set(ctx: &Context, node: NodeId, key: &str, value: &str) -> Result<(), HawthornError> {
    let mut graph = load_graph(ctx)?;
    graph.set_property(node, key, value)?;
    save_graph(&graph, &ctx.database)?;

    confirm(ctx, format_args!("Node {}: {} = {}", node.0, key, value));
    Ok(())
}

/// Show a node's properties.
pub fn cmd_props(ctx: &Context, node: NodeId) -> Result<Properties, HawthornError> {
    let graph = load_graph(ctx)?;
    let props = graph.get_properties(node)?;

    if ctx.json_mode {
        print_json(&props);
    } else if props.is_empty() {
        println!("Node {} has no properties", node.0);
    } else {
        println!("Properties for node {}:", node.0);
        for (key, value) in &props {
            println!("  {} = {}", key, value);
        }
    }
    Ok(props)
}

/// Delete a node with every incident edge.
pub fn cmd_delete(ctx: &Context, node: NodeId) -> Result<(), HawthornError> {
    let mut graph = load_graph(ctx)?;
    graph.delete_node(node)?;
    save_graph(&graph, &ctx.database)?;

    confirm(ctx, format_args!("Deleted node {}", node.0));
    Ok(())
}

/// Find nodes by exact property value.
pub fn cmd_find(ctx: &Context, key: &str, value: &str) -> Result<Vec<NodeId>, HawthornError> {
    let graph = load_graph(ctx)?;
    let nodes = graph.find(key, value);

    if ctx.json_mode {
        print_json(&id_list(&nodes));
    } else {
        for node in &nodes {
            println!("{}", node.0);
        }
    }
    Ok(nodes)
}

// =============================================================================
// EDGE COMMANDS
// =============================================================================

/// Create or update a typed edge.
pub fn cmd_connect(
    ctx: &Context,
    source: NodeId,
    target: NodeId,
    edge_type: &str,
    weight: Option<f64>,
) -> Result<(), HawthornError> {
    let mut graph = load_graph(ctx)?;
    let weight = weight.map(EdgeWeight::new).unwrap_or_default();
    graph.connect(source, target, edge_type, weight)?;
    save_graph(&graph, &ctx.database)?;

    confirm(
        ctx,
        format_args!(
            "Connected {} -[{}]-> {} (weight: {})",
            source.0,
            edge_type,
            target.0,
            weight.value()
        ),
    );
    Ok(())
}

/// Remove a typed edge. Missing edges are not an error.
pub fn cmd_disconnect(
    ctx: &Context,
    source: NodeId,
    target: NodeId,
    edge_type: &str,
) -> Result<(), HawthornError> {
    let mut graph = load_graph(ctx)?;
    graph.disconnect(source, target, edge_type)?;
    save_graph(&graph, &ctx.database)?;

    confirm(
        ctx,
        format_args!("Disconnected {} -[{}]-> {}", source.0, edge_type, target.0),
    );
    Ok(())
}

/// List a node's edges of one type, in either direction.
pub fn cmd_edges(
    ctx: &Context,
    node: NodeId,
    edge_type: &str,
    inbound: bool,
) -> Result<Vec<Edge>, HawthornError> {
    let graph = load_graph(ctx)?;
    let edges = if inbound {
        graph.inbound_edges(node, edge_type)?
    } else {
        graph.outbound_edges(node, edge_type)?
    };

    if ctx.json_mode {
        print_json(&edges);
    } else {
        for edge in &edges {
            println!(
                "{} -[{}]-> {} (weight: {})",
                edge.source.0,
                edge.edge_type,
                edge.target.0,
                edge.weight.value()
            );
        }
    }
    Ok(edges)
}

// =============================================================================
// LOAD COMMAND
// =============================================================================

/// Bulk-load a JSON document. Nothing is saved if any part fails.
pub fn cmd_load(ctx: &Context, file: &Path) -> Result<LoadReport, HawthornError> {
    tracing::info!("Loading from {:?}", file);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_LOAD_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| HawthornError::IoError(format!("Read file: {}", e)))?;
    let document = LoadDocument::from_slice(&contents)?;

    let mut graph = load_graph(ctx)?;
    let report = document.apply(&mut graph)?;
    save_graph(&graph, &ctx.database)?;

    if ctx.json_mode {
        print_json(&report);
    } else if !ctx.quiet {
        println!(
            "Loaded {} nodes, {} edges",
            report.nodes.len(),
            report.edges
        );
        for (key, node) in &report.nodes {
            println!("  {} -> {}", key, node.0);
        }
    }
    Ok(report)
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Run a traversal pipeline.
pub fn cmd_query(ctx: &Context, plan: &QueryPlan) -> Result<QueryOutcome, HawthornError> {
    let graph = load_graph(ctx)?;
    let outcome = plan.run(&graph)?;

    match (&outcome, ctx.json_mode) {
        (_, true) => print_json(&outcome),
        (QueryOutcome::Contains(found), false) => println!("{}", found),
        (QueryOutcome::Nodes(nodes), false) => {
            for node in nodes {
                println!("{}", node.0);
            }
        }
    }
    Ok(outcome)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load the snapshot, or start empty when the file does not exist yet.
///
/// The config crawl limits become the graph's default query limits.
pub fn load_graph(ctx: &Context) -> Result<Graph, HawthornError> {
    let graph = if ctx.database.exists() {
        validate_file_size(&ctx.database, MAX_SNAPSHOT_FILE_SIZE)?;
        let data = std::fs::read(&ctx.database)
            .map_err(|e| HawthornError::IoError(format!("Read db: {}", e)))?;
        graph_from_bytes(&data)?
    } else {
        tracing::debug!("no snapshot at {:?}, starting empty", ctx.database);
        Graph::new()
    };
    Ok(graph.with_crawl_limits(ctx.limits))
}

/// Write the snapshot through a temporary sibling file and rename it into
/// place, so a failed write never leaves a truncated snapshot behind.
pub fn save_graph(graph: &Graph, db_path: &Path) -> Result<(), HawthornError> {
    let data = graph_to_bytes(graph)?;

    let mut tmp_name = db_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, &data)
        .map_err(|e| HawthornError::IoError(format!("Write db: {}", e)))?;
    if let Err(e) = std::fs::rename(&tmp_path, db_path) {
        if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
            tracing::warn!("could not remove {:?}: {}", tmp_path, cleanup);
        }
        return Err(HawthornError::IoError(format!("Replace db: {}", e)));
    }

    tracing::debug!(bytes = data.len(), "saved snapshot to {:?}", db_path);
    Ok(())
}
