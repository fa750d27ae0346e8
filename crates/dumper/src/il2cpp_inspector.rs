//! Il2CppInspector Redux command line wrapper

use crate::process::{prepare_output_dir, DumpOutcome, ToolCommand};
use apkschema_core::error::require_exists;
use apkschema_core::{Disassembler, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TOOL_NAME: &str = "Il2CppInspectorRedux";

/// What the inspector should write next to its `--output` directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorOutput {
    /// C# stubs plus the dummy DLLs the schema dumper reads
    CSharpStubs,
    /// Metadata for a disassembler script
    Disassembler(Disassembler),
}

/// Drives the inspector against one native library / metadata pair
#[derive(Debug, Clone)]
pub struct Il2CppInspectorDumper {
    executable: PathBuf,
    library_file: PathBuf,
    global_metadata: PathBuf,
}

impl Il2CppInspectorDumper {
    /// Fails with `MissingInput` unless the executable and both inputs exist
    pub fn new(
        executable: impl Into<PathBuf>,
        library_file: impl Into<PathBuf>,
        global_metadata: impl Into<PathBuf>,
    ) -> Result<Self> {
        let executable = executable.into();
        let library_file = library_file.into();
        let global_metadata = global_metadata.into();

        require_exists("Il2CppInspectorRedux executable", &executable)?;
        require_exists("Library file", &library_file)?;
        require_exists("Global metadata file", &global_metadata)?;

        Ok(Self {
            executable,
            library_file,
            global_metadata,
        })
    }

    pub fn command(&self, output_dir: &Path, output: InspectorOutput) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.executable);
        cmd.arg("process")
            .arg(&self.library_file)
            .arg(&self.global_metadata)
            .arg("--output")
            .arg(output_dir);

        match output {
            InspectorOutput::CSharpStubs => {
                cmd.args(["--output-csharp-stub", "--output-dummy-dlls"]);
            }
            InspectorOutput::Disassembler(disassembler) => {
                cmd.args([
                    "--disassembler",
                    disassembler.cli_value(),
                    "--output-disassembler-metadata",
                ]);
            }
        }

        cmd.current_dir(output_dir);
        cmd
    }

    /// Dump into `output_dir`, creating it first. Never fails past this call.
    pub fn dump(&self, output_dir: &Path, output: InspectorOutput) -> DumpOutcome {
        if let Err(outcome) = prepare_output_dir(output_dir) {
            return outcome;
        }

        let outcome = self.command(output_dir, output).run(TOOL_NAME);
        if outcome.is_success() {
            info!("{} dumping process completed successfully", TOOL_NAME);
        } else {
            warn!(
                "{} likely encountered an issue. Common causes: incorrect Unity version, corrupted binary/metadata, invalid paths",
                TOOL_NAME
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        exe: PathBuf,
        lib: PathBuf,
        meta: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let exe = root.join("Il2CppInspector.Redux.CLI");
        let lib = root.join("libil2cpp.so");
        let meta = root.join("global-metadata.dat");
        for path in [&exe, &lib, &meta] {
            std::fs::write(path, b"").unwrap();
        }
        Fixture {
            _dir: dir,
            root,
            exe,
            lib,
            meta,
        }
    }

    #[test]
    fn test_construction_requires_every_input() {
        let f = fixture();
        assert!(Il2CppInspectorDumper::new(&f.exe, &f.lib, &f.meta).is_ok());

        let missing = f.root.join("missing");
        for (exe, lib, meta) in [
            (&missing, &f.lib, &f.meta),
            (&f.exe, &missing, &f.meta),
            (&f.exe, &f.lib, &missing),
        ] {
            let err = Il2CppInspectorDumper::new(exe, lib, meta).unwrap_err();
            assert!(err.is_missing_input(), "unexpected error: {}", err);
        }
    }

    #[test]
    fn test_stub_command() {
        let f = fixture();
        let dumper = Il2CppInspectorDumper::new(&f.exe, &f.lib, &f.meta).unwrap();
        let out = f.root.join("out");

        let cmd = dumper.command(&out, InspectorOutput::CSharpStubs);
        assert_eq!(cmd.program(), f.exe.as_path());
        assert_eq!(
            cmd.args_lossy(),
            vec![
                "process".to_string(),
                f.lib.display().to_string(),
                f.meta.display().to_string(),
                "--output".to_string(),
                out.display().to_string(),
                "--output-csharp-stub".to_string(),
                "--output-dummy-dlls".to_string(),
            ]
        );
        assert_eq!(cmd.get_current_dir(), Some(out.as_path()));
    }

    #[test]
    fn test_disassembler_command() {
        let f = fixture();
        let dumper = Il2CppInspectorDumper::new(&f.exe, &f.lib, &f.meta).unwrap();

        let cmd = dumper.command(
            &f.root.join("ghidra"),
            InspectorOutput::Disassembler(Disassembler::Ghidra),
        );
        let args = cmd.args_lossy();
        assert_eq!(
            &args[5..],
            &["--disassembler", "Ghidra", "--output-disassembler-metadata"]
        );
        assert!(!args.contains(&"--output-dummy-dlls".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_dump_creates_output_dir_and_swallows_failure() {
        let f = fixture();
        let exe = crate::process::test_support::fake_tool(&f.root, "inspector.sh", "exit 1");
        let dumper = Il2CppInspectorDumper::new(exe, &f.lib, &f.meta).unwrap();

        let out = f.root.join("nested").join("data");
        let outcome = dumper.dump(&out, InspectorOutput::CSharpStubs);

        assert!(out.is_dir());
        assert_eq!(outcome, DumpOutcome::ExitFailure { code: Some(1) });
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_hint_is_a_warning() {
        let f = fixture();
        let exe = crate::process::test_support::fake_tool(&f.root, "inspector.sh", "exit 1");
        let dumper = Il2CppInspectorDumper::new(exe, &f.lib, &f.meta).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            dumper.dump(&f.root.join("data"), InspectorOutput::CSharpStubs)
        });

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let hint = text
            .lines()
            .find(|line| line.contains("likely encountered an issue"))
            .expect("failure hint logged");
        assert!(hint.contains("WARN"), "unexpected level: {}", hint);
    }

    #[cfg(unix)]
    #[test]
    fn test_dump_success_produces_dummy_dlls() {
        let f = fixture();
        let exe = crate::process::test_support::fake_tool(
            &f.root,
            "inspector.sh",
            "mkdir -p dll && touch dll/Assembly-CSharp.dll",
        );
        let dumper = Il2CppInspectorDumper::new(exe, &f.lib, &f.meta).unwrap();

        let out = f.root.join("data");
        assert!(dumper.dump(&out, InspectorOutput::CSharpStubs).is_success());
        assert!(out.join("dll").join("Assembly-CSharp.dll").exists());
    }
}
