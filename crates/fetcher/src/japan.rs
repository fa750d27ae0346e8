//! Server info lookup for the Japan build
//!
//! The client ships an encrypted config blob whose plaintext is the server
//! info URL. Decryption is left to an external command.

use crate::http::JsonClient;
use crate::source::{ConfigSource, JsonDocument, ResolvedConfig, CONFIG_FILE};
use apkschema_core::config::JapanSettings;
use apkschema_core::{Error, Result};
use apkschema_dumper::ToolCommand;
use reqwest::Url;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const SERVER_INFO_KEY: &str = "ServerInfoDataUrl";

/// Locate the config blob named `config_name` below `search_dir`
pub fn find_game_config(search_dir: &Path, config_name: &str) -> Result<PathBuf> {
    if !search_dir.is_dir() {
        return Err(Error::missing_input("Game config search directory", search_dir));
    }

    let mut matches: Vec<PathBuf> = WalkDir::new(search_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == config_name)
        .map(|entry| entry.into_path())
        .collect();
    matches.sort();

    let found = matches.into_iter().next().ok_or_else(|| {
        Error::not_found(format!("{} under {}", config_name, search_dir.display()))
    })?;
    debug!("Found game config at {}", found.display());
    Ok(found)
}

/// External program turning the config blob into the server info URL
#[derive(Debug, Clone)]
pub struct ExternalDecryptor {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalDecryptor {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run `<program> <args..> <blob>` and read the URL from its stdout
    pub fn decrypt_game_config(&self, blob: &Path) -> Result<String> {
        let mut cmd = ToolCommand::new(&self.program);
        cmd.args(&self.args).arg(blob);
        let stdout = cmd.capture("Game config decryptor")?;
        parse_server_url(stdout.trim())
    }
}

fn parse_server_url(text: &str) -> Result<String> {
    let url = Url::parse(text)
        .map_err(|e| Error::invalid_payload(format!("not a server info URL {:?}: {}", text, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(text.to_string()),
        other => Err(Error::invalid_payload(format!("unsupported URL scheme {}", other))),
    }
}

/// `{"ServerInfoDataUrl": url}` updated with every key of `response`.
/// The URL key stays first even when the response carries its own value.
pub fn merge_server_info(url: &str, response: Value) -> Result<Value> {
    let Value::Object(fields) = response else {
        return Err(Error::invalid_payload("server info response is not a JSON object"));
    };

    let mut merged = Map::new();
    merged.insert(SERVER_INFO_KEY.to_string(), Value::String(url.to_string()));
    for (key, value) in fields {
        merged.insert(key, value);
    }
    Ok(Value::Object(merged))
}

#[derive(Debug, Clone)]
pub struct JapanConfigSource {
    search_dir: PathBuf,
    config_name: String,
    decryptor: Option<ExternalDecryptor>,
    server_info_url: Option<String>,
}

impl JapanConfigSource {
    pub fn new(search_dir: impl Into<PathBuf>, settings: &JapanSettings) -> Self {
        Self {
            search_dir: search_dir.into(),
            config_name: settings.config_name.clone(),
            decryptor: settings
                .decryptor
                .as_ref()
                .map(|program| ExternalDecryptor::new(program, settings.decryptor_args.clone())),
            server_info_url: settings.server_info_url.clone(),
        }
    }

    /// Use `url` directly instead of decrypting the shipped config
    pub fn with_server_info_url(mut self, url: impl Into<String>) -> Self {
        self.server_info_url = Some(url.into());
        self
    }

    pub fn server_info_url(&self) -> Result<String> {
        if let Some(url) = &self.server_info_url {
            return parse_server_url(url);
        }

        let decryptor = self
            .decryptor
            .as_ref()
            .ok_or_else(|| Error::config("japan.decryptor is not set and no server info URL was given"))?;
        let blob = find_game_config(&self.search_dir, &self.config_name)?;
        decryptor.decrypt_game_config(&blob)
    }
}

impl ConfigSource for JapanConfigSource {
    fn name(&self) -> &'static str {
        "japan server info"
    }

    fn resolve(&self, _client: &JsonClient) -> Result<ResolvedConfig> {
        let url = self.server_info_url()?;
        info!("Server info URL: {}", url);
        Ok(ResolvedConfig { url, document: None })
    }

    fn fetch(&self, client: &JsonClient, resolved: &ResolvedConfig) -> Result<Vec<JsonDocument>> {
        let response = client.get_json(&resolved.url)?;
        Ok(vec![JsonDocument {
            file_name: CONFIG_FILE,
            value: merge_server_info(&resolved.url, response)?,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use apkschema_core::config::HttpSettings;
    use serde_json::json;

    #[test]
    fn test_merge_puts_url_first() {
        let merged = merge_server_info(
            "https://yostar.example/info",
            json!({"ConnectionGroups": [], "DefaultConnectionGroup": "Prod"}),
        )
        .unwrap();

        let keys: Vec<_> = merged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["ServerInfoDataUrl", "ConnectionGroups", "DefaultConnectionGroup"]
        );
        assert_eq!(merged[SERVER_INFO_KEY], "https://yostar.example/info");
    }

    #[test]
    fn test_merge_response_value_wins() {
        let merged = merge_server_info(
            "https://a.example/",
            json!({"Other": 1, "ServerInfoDataUrl": "https://b.example/"}),
        )
        .unwrap();

        let keys: Vec<_> = merged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["ServerInfoDataUrl", "Other"]);
        assert_eq!(merged[SERVER_INFO_KEY], "https://b.example/");
    }

    #[test]
    fn test_merge_rejects_non_object() {
        assert!(merge_server_info("https://a.example/", json!([1, 2])).is_err());
    }

    #[test]
    fn test_find_game_config() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("GameMainConfig"), b"blob").unwrap();
        std::fs::write(dir.path().join("other"), b"x").unwrap();

        let found = find_game_config(dir.path(), "GameMainConfig").unwrap();
        assert_eq!(found, nested.join("GameMainConfig"));

        let err = find_game_config(dir.path(), "Missing").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = find_game_config(&dir.path().join("nope"), "GameMainConfig").unwrap_err();
        assert!(err.is_missing_input());
    }

    #[test]
    fn test_parse_server_url() {
        assert!(parse_server_url("https://example.com/info.json").is_ok());
        assert!(parse_server_url("garbage").is_err());
        assert!(parse_server_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_resolve_requires_decryptor_or_url() {
        let dir = tempfile::tempdir().unwrap();
        let client = JsonClient::new(&HttpSettings::default()).unwrap();
        let source = JapanConfigSource::new(dir.path(), &JapanSettings::default());

        let err = source.resolve(&client).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_external_decryptor() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("decrypt.sh");
        std::fs::write(&script, "#!/bin/sh\necho \"  https://yostar.example/$(cat \"$1\")\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let blob = dir.path().join("GameMainConfig");
        std::fs::write(&blob, "r77").unwrap();

        let decryptor = ExternalDecryptor::new(&script, Vec::new());
        assert_eq!(
            decryptor.decrypt_game_config(&blob).unwrap(),
            "https://yostar.example/r77"
        );

        let failing = dir.path().join("fail.sh");
        std::fs::write(&failing, "#!/bin/sh\necho bad key >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&failing, std::fs::Permissions::from_mode(0o755)).unwrap();
        let err = ExternalDecryptor::new(&failing, Vec::new())
            .decrypt_game_config(&blob)
            .unwrap_err();
        assert!(matches!(&err, Error::Process(msg) if msg.contains("bad key")));
    }

    #[test]
    fn test_fetch_writes_merged_config() {
        let server = serve_once(200, r#"{"ConnectionGroups": [{"Name": "Prod"}]}"#);
        let client = JsonClient::new(&HttpSettings::default()).unwrap();
        let url = server.url("/r77_info.json");

        let source = JapanConfigSource::new("/unused", &JapanSettings::default())
            .with_server_info_url(&url);
        let resolved = source.resolve(&client).unwrap();
        let documents = source.fetch(&client, &resolved).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, CONFIG_FILE);
        assert_eq!(
            documents[0].value,
            json!({"ServerInfoDataUrl": url, "ConnectionGroups": [{"Name": "Prod"}]})
        );
        drop(server.request());
    }
}
