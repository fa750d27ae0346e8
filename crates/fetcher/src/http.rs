//! Blocking JSON over HTTP

use apkschema_core::config::HttpSettings;
use apkschema_core::{Error, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Thin blocking client that only speaks JSON
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: Client,
}

impl JsonClient {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| Error::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        Self::send(self.client.get(url), url)
    }

    pub fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!("POST {}", url);
        Self::send(self.client.post(url).json(body), url)
    }

    fn send(request: RequestBuilder, url: &str) -> Result<Value> {
        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::network(format!("{}: {}", url, e)))?;

        response
            .json::<Value>()
            .map_err(|e| Error::invalid_payload(format!("{} did not return JSON: {}", url, e)))
    }
}
