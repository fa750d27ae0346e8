//! Catalog lookup for the global build

use crate::http::JsonClient;
use crate::source::{ConfigSource, JsonDocument, ResolvedConfig, CONFIG_FILE, RESOURCES_FILE};
use apkschema_core::config::GlobalSettings;
use apkschema_core::{Error, Result};
use serde_json::Value;
use tracing::info;

/// Asks the version-check endpoint for the catalog, whose
/// `patch.resource_path` points at the resources document
#[derive(Debug, Clone)]
pub struct GlobalCatalogSource {
    endpoint: String,
    request: Option<Value>,
}

impl GlobalCatalogSource {
    pub fn new(endpoint: impl Into<String>, request: Option<Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request,
        }
    }

    pub fn from_settings(settings: &GlobalSettings) -> Result<Self> {
        let endpoint = settings
            .endpoint
            .clone()
            .ok_or_else(|| Error::config("global.endpoint is not set"))?;
        Ok(Self::new(endpoint, settings.request.clone()))
    }

    /// Fetch the catalog document
    pub fn catalog(&self, client: &JsonClient) -> Result<Value> {
        match &self.request {
            Some(body) => client.post_json(&self.endpoint, body),
            None => client.get_json(&self.endpoint),
        }
    }
}

/// `patch.resource_path` of a catalog document
pub fn resource_path(catalog: &Value) -> Result<&str> {
    catalog
        .pointer("/patch/resource_path")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_payload("catalog has no patch.resource_path"))
}

impl ConfigSource for GlobalCatalogSource {
    fn name(&self) -> &'static str {
        "global catalog"
    }

    fn resolve(&self, client: &JsonClient) -> Result<ResolvedConfig> {
        info!("Requesting catalog from {}", self.endpoint);
        let catalog = self.catalog(client)?;
        let url = resource_path(&catalog)?.to_string();
        Ok(ResolvedConfig {
            url,
            document: Some(catalog),
        })
    }

    fn fetch(&self, client: &JsonClient, resolved: &ResolvedConfig) -> Result<Vec<JsonDocument>> {
        let resources = client.get_json(&resolved.url)?;
        let catalog = resolved
            .document
            .clone()
            .ok_or_else(|| Error::invalid_payload("catalog document missing"))?;

        Ok(vec![
            JsonDocument {
                file_name: CONFIG_FILE,
                value: catalog,
            },
            JsonDocument {
                file_name: RESOURCES_FILE,
                value: resources,
            },
        ])
    }
}
