//! Pipeline settings

use crate::types::Disassembler;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Pipeline settings, loaded from an optional JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the external tools, relative to the working directory
    pub tools_dir: PathBuf,
    /// IL2CPP inspector location inside the tools directory
    pub il2cpp_inspector: ToolSettings,
    /// Schema dumper location inside the tools directory
    pub fbs_dumper: FbsDumperSettings,
    /// Schema files generated after the inspector dump
    pub schemas: Vec<SchemaJob>,
    /// Options shared by every schema job
    pub schema_options: SchemaOptions,
    /// Extra inspector dumps in disassembler metadata mode
    pub disassemblers: Vec<Disassembler>,
    /// Copy the native library and metadata into the data directory
    pub copy_binaries: bool,
    pub http: HttpSettings,
    pub global: GlobalSettings,
    pub japan: JapanSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("dump_lib"),
            il2cpp_inspector: ToolSettings {
                dir: PathBuf::from("Il2CppInspector"),
                binary: "Il2CppInspector.Redux.CLI".to_string(),
            },
            fbs_dumper: FbsDumperSettings::default(),
            schemas: vec![
                SchemaJob {
                    file_name: "BlueArchiveV1.fbs".to_string(),
                    with_library: false,
                    dump_version: None,
                },
                SchemaJob {
                    file_name: "BlueArchiveV2.fbs".to_string(),
                    with_library: true,
                    dump_version: None,
                },
            ],
            schema_options: SchemaOptions::default(),
            disassemblers: Vec::new(),
            copy_binaries: false,
            http: HttpSettings::default(),
            global: GlobalSettings::default(),
            japan: JapanSettings::default(),
        }
    }
}

/// Location of an external tool inside the tools directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub dir: PathBuf,
    /// Binary name without the platform executable suffix
    pub binary: String,
}

/// Which release line of the schema dumper is installed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FbsDumperVariant {
    /// Takes the dummy DLL directory, native library optional
    #[default]
    Standard,
    /// Needs the native library and a dump version on every run
    Versioned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbsDumperSettings {
    pub dir: PathBuf,
    /// Binary name without the platform executable suffix
    pub binary: String,
    pub variant: FbsDumperVariant,
}

impl Default for FbsDumperSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("FbsDumper"),
            binary: "FbsDumper".to_string(),
            variant: FbsDumperVariant::Standard,
        }
    }
}

/// One `.fbs` file to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaJob {
    pub file_name: String,
    /// Pass the native library to the dumper
    #[serde(default)]
    pub with_library: bool,
    /// Value of the dumper's `-dv` flag
    #[serde(default)]
    pub dump_version: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    pub custom_namespace: Option<String>,
    pub force_snake_case: bool,
    pub namespace_to_look_for: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds, unlimited when absent
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Catalog lookup for the global flavor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Version-check endpoint returning the catalog document
    pub endpoint: Option<String>,
    /// JSON body; the endpoint is POSTed when set, fetched with GET otherwise
    pub request: Option<Value>,
}

/// Config blob lookup for the Japan flavor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JapanSettings {
    /// File name of the encrypted config blob
    pub config_name: String,
    /// External command that prints the decrypted server info URL
    pub decryptor: Option<PathBuf>,
    pub decryptor_args: Vec<String>,
    /// Skip discovery and decryption and use this URL directly
    pub server_info_url: Option<String>,
}

impl Default for JapanSettings {
    fn default() -> Self {
        Self {
            config_name: "GameMainConfig".to_string(),
            decryptor: None,
            decryptor_args: Vec::new(),
            server_info_url: None,
        }
    }
}

impl Settings {
    /// Load settings from file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| crate::Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Load settings from file when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
