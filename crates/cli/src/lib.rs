//! Command line front end for apkschema
//!
//! Resolves the on-disk layout for a build flavor, runs the inspector and the
//! schema dumper, then fetches and stores the flavor's remote config.

pub mod cli;
pub mod pipeline;

pub use cli::Cli;
pub use pipeline::{Pipeline, RunOptions};
