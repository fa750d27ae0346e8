//! Flavor-specific config resolution

use crate::http::JsonClient;
use apkschema_core::Result;
use serde_json::Value;

/// Where the remote JSON lives, plus any document obtained on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub url: String,
    pub document: Option<Value>,
}

/// A JSON payload destined for a file in the data directory
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    pub file_name: &'static str,
    pub value: Value,
}

pub const CONFIG_FILE: &str = "config.json";
pub const RESOURCES_FILE: &str = "resources.json";

/// Resolution of the remote config for one build flavor.
///
/// `resolve` failures abort the run; `fetch` failures are logged by the caller
/// and the run continues.
pub trait ConfigSource {
    fn name(&self) -> &'static str;

    fn resolve(&self, client: &JsonClient) -> Result<ResolvedConfig>;

    /// Perform the single GET and shape the documents to persist
    fn fetch(&self, client: &JsonClient, resolved: &ResolvedConfig) -> Result<Vec<JsonDocument>>;
}
