//! Common types used throughout the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build flavor of the game client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildFlavor {
    Global,
    Japan,
}

impl BuildFlavor {
    /// Prefix used for the flavor's extract and data directories
    pub fn dir_prefix(&self) -> &'static str {
        match self {
            BuildFlavor::Global => "global",
            BuildFlavor::Japan => "jp",
        }
    }
}

impl std::fmt::Display for BuildFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildFlavor::Global => write!(f, "Global"),
            BuildFlavor::Japan => write!(f, "Japan"),
        }
    }
}

/// Host operating system, as far as executable naming is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostOs {
    Windows,
    Linux,
    MacOS,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOS,
            _ => HostOs::Other,
        }
    }

    pub fn exe_suffix(&self) -> &'static str {
        match self {
            HostOs::Windows => ".exe",
            _ => "",
        }
    }

    /// Append the platform executable suffix to a bare binary name
    pub fn executable_name(&self, name: &str) -> String {
        format!("{}{}", name, self.exe_suffix())
    }
}

/// Disassembler targets supported by the inspector's metadata output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disassembler {
    Ida,
    Ghidra,
    Binja,
}

impl Disassembler {
    /// Value passed to the inspector's `--disassembler` flag
    pub fn cli_value(&self) -> &'static str {
        match self {
            Disassembler::Ida => "IDA",
            Disassembler::Ghidra => "Ghidra",
            Disassembler::Binja => "BinaryNinja",
        }
    }

    /// Sub-directory name of the data dir receiving this dump
    pub fn output_dir_name(&self) -> String {
        format!("{}_disassembler", self.cli_value().to_lowercase())
    }
}

/// Outcome of a single pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Summary of a full pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub flavor: BuildFlavor,
    pub data_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepOutcome>,
}

impl PipelineReport {
    pub fn new(flavor: BuildFlavor, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            flavor,
            data_dir: data_dir.into(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, name: impl Into<String>, status: StepStatus) {
        self.steps.push(StepOutcome {
            name: name.into(),
            status,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed(_)))
    }

    pub fn status_of(&self, name: &str) -> Option<&StepStatus> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_name() {
        assert_eq!(HostOs::Windows.executable_name("FbsDumper"), "FbsDumper.exe");
        assert_eq!(HostOs::Linux.executable_name("FbsDumper"), "FbsDumper");
        assert_eq!(HostOs::MacOS.executable_name("FbsDumper"), "FbsDumper");
    }

    #[test]
    fn test_disassembler_dir_name() {
        assert_eq!(Disassembler::Ida.output_dir_name(), "ida_disassembler");
        assert_eq!(Disassembler::Binja.cli_value(), "BinaryNinja");
    }

    #[test]
    fn test_report_tracks_failures() {
        let mut report = PipelineReport::new(BuildFlavor::Japan, "jp_data");
        report.record("il2cpp", StepStatus::Succeeded);
        report.record("fetch", StepStatus::Failed("timed out".into()));
        report.finish();

        let failed: Vec<_> = report.failed_steps().map(|s| s.name.as_str()).collect();
        assert_eq!(failed, vec!["fetch"]);
        assert_eq!(report.status_of("il2cpp"), Some(&StepStatus::Succeeded));
        assert!(report.finished_at.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["flavor"], "japan");
        assert_eq!(json["steps"][1]["status"], "failed");
        assert_eq!(json["steps"][1]["detail"], "timed out");
    }
}
