//! # hawthorn
//!
//! Command-line host for the Hawthorn property graph.
//!
//! The engine in `hawthorn-core` never touches the filesystem; this crate
//! owns the snapshot file, the TOML configuration and the output formats.

pub mod bulk;
pub mod cli;
pub mod config;
pub mod pipeline;
