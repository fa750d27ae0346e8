//! Core types, settings and errors for apkschema
//!
//! This crate provides the foundational types shared by the dumper wrappers,
//! the config fetchers and the command line pipeline.

pub mod error;
pub mod types;
pub mod config;
pub mod layout;
pub mod logging;

pub use error::{Error, Result};
pub use types::*;
pub use config::Settings;
pub use layout::WorkspaceLayout;
