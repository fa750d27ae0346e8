//! Synchronous invocation of external tools

use apkschema_core::{Error, Result, StepStatus};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, error, info, warn};

/// Result of one external tool run. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DumpOutcome {
    Succeeded,
    /// The tool ran and exited unsuccessfully; `None` when killed by a signal
    ExitFailure { code: Option<i32> },
    /// The tool could not be started at all
    NotStarted(String),
}

impl DumpOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DumpOutcome::Succeeded)
    }

    pub fn to_step_status(&self) -> StepStatus {
        match self {
            DumpOutcome::Succeeded => StepStatus::Succeeded,
            DumpOutcome::ExitFailure { code: Some(code) } => {
                StepStatus::Failed(format!("exit code {}", code))
            }
            DumpOutcome::ExitFailure { code: None } => {
                StepStatus::Failed("terminated by signal".to_string())
            }
            DumpOutcome::NotStarted(reason) => StepStatus::Failed(reason.clone()),
        }
    }
}

/// Argument vector plus working directory for one tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Arguments as lossy UTF-8, for logs and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Space-joined command line as it would be typed
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn output(&self) -> std::io::Result<Output> {
        info!("Executing command: {}", self.display());

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command.output()
    }

    /// Run to completion, logging the captured streams under `tool` name
    pub fn run(&self, tool: &str) -> DumpOutcome {
        let output = match self.output() {
            Ok(output) => output,
            Err(e) => {
                error!(
                    "{} could not be started ({}): check {}",
                    tool,
                    e,
                    self.program.display()
                );
                return DumpOutcome::NotStarted(e.to_string());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            if !stdout.trim().is_empty() {
                info!("{} output (stdout):\n{}", tool, stdout.trim_end());
            }
            if !stderr.trim().is_empty() {
                warn!("{} errors (stderr):\n{}", tool, stderr.trim_end());
            }
            debug!("{} finished successfully", tool);
            return DumpOutcome::Succeeded;
        }

        let code = output.status.code();
        match code {
            Some(code) => error!("{} returned non-zero exit code {}", tool, code),
            None => error!("{} was terminated by a signal", tool),
        }
        if !stdout.trim().is_empty() {
            error!("{} stdout:\n{}", tool, stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            error!("{} stderr:\n{}", tool, stderr.trim_end());
        }
        DumpOutcome::ExitFailure { code }
    }

    /// Run to completion and return stdout. Unlike [`ToolCommand::run`] a
    /// launch failure or non-zero exit is an `Error::Process`.
    pub fn capture(&self, tool: &str) -> Result<String> {
        let output = self.output().map_err(|e| {
            Error::process(format!("cannot start {} ({}): {}", tool, self.program.display(), e))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::process(format!(
                "{} failed ({}): {}",
                tool,
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            warn!("{} errors (stderr):\n{}", tool, stderr.trim_end());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Create `dir` (and parents) ahead of a tool run
pub(crate) fn prepare_output_dir(dir: &Path) -> std::result::Result<(), DumpOutcome> {
    std::fs::create_dir_all(dir).map_err(|e| {
        error!("Cannot create output directory {}: {}", dir.display(), e);
        DumpOutcome::NotStarted(format!("cannot create {}: {}", dir.display(), e))
    })
}
