use crate::pipeline::{Pipeline, RunOptions};
use anyhow::{bail, Context, Result};
use apkschema_core::{BuildFlavor, Disassembler, PipelineReport, Settings, StepStatus};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "apkschema")]
#[command(
    version,
    about = "Dump IL2CPP type data and FlatBuffers schemas from an unpacked game client"
)]
#[command(long_about = "
apkschema drives Il2CppInspector Redux and FbsDumper against an unpacked
client, then fetches the flavor's remote config JSON.

Expected layout in the working directory:
    dump_lib/                  external tools
    <flavor>_extracted/        unpacked APK contents
    <flavor>_data/             output (created)

EXAMPLES:
    apkschema global
    apkschema japan --server-info-url https://example.com/r77_info.json
    apkschema --settings settings.json global --disassembler ida
    apkschema init-settings settings.json
")]
pub struct Cli {
    /// Working directory the layout is resolved against
    #[arg(short = 'C', long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dump and fetch for the global build
    Global(RunArgs),
    /// Dump and fetch for the Japan build
    Japan(JapanArgs),
    /// Write the default settings to a file for editing
    InitSettings {
        path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Skip the inspector and schema dumper
    #[arg(long)]
    pub skip_dump: bool,

    /// Skip config resolution and the HTTP fetch
    #[arg(long)]
    pub skip_fetch: bool,

    /// Copy libil2cpp.so and global-metadata.dat into the data directory
    #[arg(long)]
    pub copy_binaries: bool,

    /// Also dump disassembler metadata (repeatable)
    #[arg(long = "disassembler", value_enum)]
    pub disassemblers: Vec<DisassemblerArg>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct JapanArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Use this server info URL instead of decrypting the shipped config
    #[arg(long)]
    pub server_info_url: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisassemblerArg {
    Ida,
    Ghidra,
    Binja,
}

impl From<DisassemblerArg> for Disassembler {
    fn from(value: DisassemblerArg) -> Self {
        match value {
            DisassemblerArg::Ida => Disassembler::Ida,
            DisassemblerArg::Ghidra => Disassembler::Ghidra,
            DisassemblerArg::Binja => Disassembler::Binja,
        }
    }
}

impl RunArgs {
    fn options(&self, server_info_url: Option<String>) -> RunOptions {
        RunOptions {
            skip_dump: self.skip_dump,
            skip_fetch: self.skip_fetch,
            copy_binaries: self.copy_binaries,
            disassemblers: self.disassemblers.iter().map(|d| (*d).into()).collect(),
            server_info_url,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let (flavor, options) = match cli.command {
        Commands::InitSettings { path, force } => return init_settings(&path, force),
        Commands::Global(args) => (BuildFlavor::Global, args.options(None)),
        Commands::Japan(args) => (BuildFlavor::Japan, args.run.options(args.server_info_url)),
    };

    let settings = Settings::load_or_default(cli.settings.as_deref())
        .context("failed to load settings")?;
    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    info!("{} dump in {}", flavor, work_dir.display());
    let pipeline = Pipeline::new(&work_dir, flavor, settings, options)
        .with_context(|| format!("cannot resolve {}", work_dir.display()))?;
    let report = pipeline
        .run()
        .with_context(|| format!("{} dump aborted", flavor))?;
    log_summary(&report);
    Ok(())
}

fn init_settings(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    Settings::default()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Default settings written to {}", path.display());
    Ok(())
}

fn log_summary(report: &PipelineReport) {
    for step in &report.steps {
        match &step.status {
            StepStatus::Succeeded => info!("  {:<28} ok", step.name),
            StepStatus::Skipped => info!("  {:<28} skipped", step.name),
            StepStatus::Failed(reason) => warn!("  {:<28} FAILED: {}", step.name, reason),
        }
    }

    let failed = report.failed_steps().count();
    let elapsed = report
        .finished_at
        .map(|end| (end - report.started_at).num_milliseconds() as f64 / 1000.0)
        .unwrap_or_default();
    if failed == 0 {
        info!("Finished in {:.1}s", elapsed);
    } else {
        warn!("Finished in {:.1}s with {} failed step(s)", elapsed, failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_with_options() {
        let cli = Cli::try_parse_from([
            "apkschema",
            "-C",
            "/work",
            "global",
            "--skip-fetch",
            "--disassembler",
            "ida",
            "--disassembler",
            "ghidra",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.work_dir, Some(PathBuf::from("/work")));
        assert_eq!(cli.verbose, 2);
        let Commands::Global(args) = cli.command else {
            panic!("expected global subcommand");
        };
        let options = args.options(None);
        assert!(options.skip_fetch);
        assert!(!options.skip_dump);
        assert_eq!(options.disassemblers, vec![Disassembler::Ida, Disassembler::Ghidra]);
    }

    #[test]
    fn test_parse_japan_url() {
        let cli = Cli::try_parse_from([
            "apkschema",
            "japan",
            "--server-info-url",
            "https://example.com/info.json",
        ])
        .unwrap();

        let Commands::Japan(args) = cli.command else {
            panic!("expected japan subcommand");
        };
        assert_eq!(args.server_info_url.as_deref(), Some("https://example.com/info.json"));
    }

    #[test]
    fn test_unknown_disassembler_rejected() {
        assert!(Cli::try_parse_from(["apkschema", "global", "--disassembler", "radare"]).is_err());
    }

    #[test]
    fn test_init_settings_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        init_settings(&path, false).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
        assert!(init_settings(&path, false).is_err());
        assert!(init_settings(&path, true).is_ok());
    }
}
