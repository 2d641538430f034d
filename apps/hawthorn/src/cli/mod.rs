//! # Hawthorn CLI Module
//!
//! This module implements the command-line interface for Hawthorn.
//!
//! ## Available Commands
//!
//! - `init` - Write an empty snapshot
//! - `status` - Show node, edge and edge type counts
//! - `create` / `set` / `props` / `delete` - Node operations
//! - `connect` / `disconnect` / `edges` - Edge operations
//! - `find` - Property index lookup
//! - `load` - Bulk-load a JSON document
//! - `query` - Run a traversal pipeline

mod commands;

use crate::config::Config;
use crate::pipeline::{QueryPlan, QueryStart, QueryStep, parse_key_value};
use clap::{Parser, Subcommand};
use hawthorn_core::{CrawlLimits, HawthornError, NodeId};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Hawthorn - embeddable property graph
///
/// Nodes carry string properties; edges are typed, weighted and directed.
/// Every command loads the snapshot file, applies one operation and saves it.
#[derive(Parser, Debug)]
#[command(name = "hawthorn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress confirmation messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the graph snapshot file
    #[arg(short = 'D', long, global = true, default_value = "hawthorn.db")]
    pub database: PathBuf,

    /// Path to a TOML config file (default: hawthorn.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty snapshot
    Init {
        /// Force initialization even if the snapshot exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show graph status
    Status,

    /// Create a node and print its id
    Create {
        /// Initial property (repeatable)
        #[arg(short, long = "prop", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        props: Vec<(String, String)>,
    },

    /// Set one property on a node
    Set { node: u64, key: String, value: String },

    /// Show a node's properties
    Props { node: u64 },

    /// Delete a node with all its edges
    Delete { node: u64 },

    /// Create or update a typed edge
    Connect {
        source: u64,
        target: u64,
        edge_type: String,

        /// Edge weight (default 1.0)
        #[arg(short, long)]
        weight: Option<f64>,
    },

    /// Remove a typed edge
    Disconnect {
        source: u64,
        target: u64,
        edge_type: String,
    },

    /// Find nodes by exact property value
    Find { key: String, value: String },

    /// List a node's edges of one type
    Edges {
        node: u64,
        edge_type: String,

        /// List inbound instead of outbound edges
        #[arg(short, long)]
        inbound: bool,
    },

    /// Bulk-load nodes and edges from a JSON document
    Load {
        /// Path to the JSON document
        file: PathBuf,
    },

    /// Run a traversal pipeline
    Query {
        /// Start from every node with this property
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value,
              conflicts_with = "node", required_unless_present = "node")]
        start: Option<(String, String)>,

        /// Start from a single node
        #[arg(long)]
        node: Option<u64>,

        /// Steps, applied in order: out:<type>, in:<type>, crawl:<t1,t2>, where:<key=value>
        #[arg(value_name = "STEP")]
        steps: Vec<QueryStep>,

        /// Print whether this node is in the result instead of the result
        #[arg(long)]
        contains: Option<u64>,

        /// Override the configured crawl node bound
        #[arg(long)]
        max_visited: Option<usize>,

        /// Override the configured crawl depth bound
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Per-invocation settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub json_mode: bool,
    pub quiet: bool,
    /// Crawl bounds from the config file.
    pub limits: CrawlLimits,
}

impl Context {
    #[must_use]
    pub fn new(cli: &Cli, config: &Config) -> Self {
        Self {
            database: cli.database.clone(),
            json_mode: cli.json_mode,
            quiet: cli.quiet,
            limits: config.crawl,
        }
    }
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &Config) -> Result<(), HawthornError> {
    let ctx = Context::new(&cli, config);

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Status) | None => cmd_status(&ctx).map(|_| ()),
        Some(Commands::Create { props }) => cmd_create(&ctx, props).map(|_| ()),
        Some(Commands::Set { node, key, value }) => cmd_set(&ctx, NodeId(node), &key, &value),
        Some(Commands::Props { node }) => cmd_props(&ctx, NodeId(node)).map(|_| ()),
        Some(Commands::Delete { node }) => cmd_delete(&ctx, NodeId(node)),
        Some(Commands::Connect {
            source,
            target,
            edge_type,
            weight,
        }) => cmd_connect(&ctx, NodeId(source), NodeId(target), &edge_type, weight),
        Some(Commands::Disconnect {
            source,
            target,
            edge_type,
        }) => cmd_disconnect(&ctx, NodeId(source), NodeId(target), &edge_type),
        Some(Commands::Find { key, value }) => cmd_find(&ctx, &key, &value).map(|_| ()),
        Some(Commands::Edges {
            node,
            edge_type,
            inbound,
        }) => cmd_edges(&ctx, NodeId(node), &edge_type, inbound).map(|_| ()),
        Some(Commands::Load { file }) => cmd_load(&ctx, &file).map(|_| ()),
        Some(Commands::Query {
            start,
            node,
            steps,
            contains,
            max_visited,
            max_depth,
        }) => {
            let start = query_start(start, node)?;
            let mut limits = ctx.limits;
            if let Some(max) = max_visited {
                limits = limits.with_max_visited(max);
            }
            if let Some(max) = max_depth {
                limits = limits.with_max_depth(max);
            }
            let plan = QueryPlan {
                start,
                steps,
                contains: contains.map(NodeId),
                limits,
            };
            cmd_query(&ctx, &plan).map(|_| ())
        }
    }
}

/// Turn the `--start` / `--node` pair into a start clause.
fn query_start(
    start: Option<(String, String)>,
    node: Option<u64>,
) -> Result<QueryStart, HawthornError> {
    match (start, node) {
        (Some((key, value)), None) => Ok(QueryStart::Property { key, value }),
        (None, Some(node)) => Ok(QueryStart::Node(NodeId(node))),
        (Some(_), Some(_)) => Err(HawthornError::InvalidArgument(
            "query takes either --start or --node, not both".to_string(),
        )),
        (None, None) => Err(HawthornError::InvalidArgument(
            "query needs --start or --node".to_string(),
        )),
    }
}

// =============================================================================
// TESTS
// =============================================================================
