//! FbsDumper command line wrapper

use crate::process::{prepare_output_dir, DumpOutcome, ToolCommand};
use apkschema_core::config::SchemaOptions;
use apkschema_core::error::require_exists;
use apkschema_core::Result;
use std::path::PathBuf;
use tracing::{error, info};

const TOOL_NAME: &str = "FbsDumper";

pub const DEFAULT_OUTPUT_FILE: &str = "BlueArchive.fbs";

/// Dump version passed by the versioned tool when a request names none
pub const DEFAULT_DUMP_VERSION: u32 = 2;

/// Parameters for one schema dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FbsDumpRequest {
    pub output_dir: PathBuf,
    pub output_file_name: String,
    pub library_file: Option<PathBuf>,
    pub custom_namespace: Option<String>,
    pub force_snake_case: bool,
    pub namespace_to_look_for: Option<String>,
    pub dump_version: Option<u32>,
}

impl FbsDumpRequest {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_file_name: DEFAULT_OUTPUT_FILE.to_string(),
            library_file: None,
            custom_namespace: None,
            force_snake_case: false,
            namespace_to_look_for: None,
            dump_version: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = name.into();
        self
    }

    pub fn library(mut self, library_file: impl Into<PathBuf>) -> Self {
        self.library_file = Some(library_file.into());
        self
    }

    pub fn dump_version(mut self, version: u32) -> Self {
        self.dump_version = Some(version);
        self
    }

    pub fn with_options(mut self, options: &SchemaOptions) -> Self {
        self.custom_namespace = options.custom_namespace.clone();
        self.force_snake_case = options.force_snake_case;
        self.namespace_to_look_for = options.namespace_to_look_for.clone();
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ToolLine {
    Standard,
    Versioned { library_file: PathBuf },
}

/// Drives the schema dumper over a directory of dummy DLLs
#[derive(Debug, Clone)]
pub struct FbsDumper {
    executable: PathBuf,
    dummy_dll_dir: PathBuf,
    line: ToolLine,
}

impl FbsDumper {
    /// Standard tool: the native library is optional per request
    pub fn new(executable: impl Into<PathBuf>, dummy_dll_dir: impl Into<PathBuf>) -> Result<Self> {
        let executable = executable.into();
        let dummy_dll_dir = dummy_dll_dir.into();

        require_exists("FbsDumper executable", &executable)?;
        require_exists("Dummy DLL directory", &dummy_dll_dir)?;

        Ok(Self {
            executable,
            dummy_dll_dir,
            line: ToolLine::Standard,
        })
    }

    /// Versioned tool: every run gets `-a <library>` and `-dv <version>`
    pub fn versioned(
        executable: impl Into<PathBuf>,
        dummy_dll_dir: impl Into<PathBuf>,
        library_file: impl Into<PathBuf>,
    ) -> Result<Self> {
        let library_file = library_file.into();
        require_exists("Library file", &library_file)?;

        let mut dumper = Self::new(executable, dummy_dll_dir)?;
        dumper.line = ToolLine::Versioned { library_file };
        Ok(dumper)
    }

    pub fn is_versioned(&self) -> bool {
        matches!(self.line, ToolLine::Versioned { .. })
    }

    pub fn command(&self, request: &FbsDumpRequest) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.executable);
        cmd.arg("-d").arg(&self.dummy_dll_dir);

        let (library, dump_version) = match &self.line {
            ToolLine::Standard => (request.library_file.as_deref(), request.dump_version),
            ToolLine::Versioned { library_file } => (
                Some(request.library_file.as_deref().unwrap_or(library_file.as_path())),
                Some(request.dump_version.unwrap_or(DEFAULT_DUMP_VERSION)),
            ),
        };

        if let Some(library) = library {
            cmd.arg("-a").arg(library);
        }
        if let Some(namespace) = &request.custom_namespace {
            cmd.arg("-n").arg(namespace);
        }
        if request.force_snake_case {
            cmd.arg("-s");
        }
        if let Some(namespace) = &request.namespace_to_look_for {
            cmd.arg("-nl").arg(namespace);
        }
        if let Some(version) = dump_version {
            cmd.arg("-dv").arg(version.to_string());
        }
        cmd.arg("-o").arg(request.output_path());
        cmd
    }

    /// Write one schema file. Never fails past this call.
    pub fn dump(&self, request: &FbsDumpRequest) -> DumpOutcome {
        if let Err(outcome) = prepare_output_dir(&request.output_dir) {
            return outcome;
        }

        let outcome = self.command(request).run(TOOL_NAME);
        if outcome.is_success() {
            info!("Successfully dumped to: {}", request.output_path().display());
        } else {
            error!("Dump of {} failed. Check the errors above.", request.output_file_name);
        }
        outcome
    }
}
