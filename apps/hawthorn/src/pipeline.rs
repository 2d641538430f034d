//! # Query Pipeline
//!
//! Command-line form of the query builder. A pipeline is a start clause
//! followed by steps applied left to right:
//!
//! ```text
//! hawthorn query --start name=alice crawl:member,read where:type=machine
//! hawthorn query --node 3 in:member --contains 1
//! ```

use hawthorn_core::{CrawlLimits, Graph, HawthornError, NodeId};
use serde::Serialize;
use std::str::FromStr;

// =============================================================================
// PIPELINE TYPES
// =============================================================================

/// Where a pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStart {
    /// Every node whose property `key` equals `value`.
    Property { key: String, value: String },
    /// A single known node.
    Node(NodeId),
}

/// One step after the start clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStep {
    Out(String),
    In(String),
    Crawl(Vec<String>),
    Where { key: String, value: String },
}

impl FromStr for QueryStep {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (op, arg) = raw
            .split_once(':')
            .ok_or_else(|| format!("expected <op>:<arg>, got '{}'", raw))?;
        if arg.is_empty() {
            return Err(format!("step '{}' has no argument", op));
        }

        match op {
            "out" => Ok(Self::Out(arg.to_string())),
            "in" => Ok(Self::In(arg.to_string())),
            "crawl" => {
                let types: Vec<String> = arg
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                if types.is_empty() {
                    return Err("crawl needs at least one edge type".to_string());
                }
                Ok(Self::Crawl(types))
            }
            "where" => {
                let (key, value) = parse_key_value(arg)?;
                Ok(Self::Where { key, value })
            }
            _ => Err(format!(
                "unknown step '{}'. Use: out, in, crawl, where",
                op
            )),
        }
    }
}

/// Parse `key=value`. The value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// A complete pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub start: QueryStart,
    pub steps: Vec<QueryStep>,
    /// When set, answer membership instead of listing results.
    pub contains: Option<NodeId>,
    pub limits: CrawlLimits,
}

/// What a pipeline produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Nodes(Vec<NodeId>),
    Contains(bool),
}

// =============================================================================
// EXECUTION
// =============================================================================

impl QueryPlan {
    /// Run the pipeline against `graph`.
    pub fn run(&self, graph: &Graph) -> Result<QueryOutcome, HawthornError> {
        let query = graph.query().with_limits(self.limits);
        let mut query = match &self.start {
            QueryStart::Property { key, value } => query.start(key, value),
            QueryStart::Node(node) => query.start_at(*node)?,
        };

        for step in &self.steps {
            query = match step {
                QueryStep::Out(edge_type) => query.out(edge_type)?,
                QueryStep::In(edge_type) => query.in_(edge_type)?,
                QueryStep::Crawl(edge_types) => query.crawl(edge_types.as_slice())?,
                QueryStep::Where { key, value } => query.filter_property(key, value),
            };
        }

        tracing::debug!(steps = self.steps.len(), results = query.len(), "query ran");
        Ok(match self.contains {
            Some(target) => QueryOutcome::Contains(query.contains(target)),
            None => QueryOutcome::Nodes(query.into_results()),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
