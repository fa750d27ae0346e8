//! One dump run for a build flavor

use apkschema_core::config::FbsDumperVariant;
use apkschema_core::{
    BuildFlavor, Disassembler, HostOs, PipelineReport, Result, Settings, StepStatus,
    WorkspaceLayout,
};
use apkschema_dumper::{FbsDumpRequest, FbsDumper, Il2CppInspectorDumper, InspectorOutput};
use apkschema_fetcher::{
    write_json, ConfigSource, GlobalCatalogSource, JapanConfigSource, JsonClient,
};
use std::path::Path;
use tracing::{error, info, warn};

/// Per-run switches layered over the settings file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub skip_dump: bool,
    pub skip_fetch: bool,
    pub copy_binaries: bool,
    pub disassemblers: Vec<Disassembler>,
    pub server_info_url: Option<String>,
}

pub struct Pipeline {
    flavor: BuildFlavor,
    layout: WorkspaceLayout,
    settings: Settings,
    options: RunOptions,
}

impl Pipeline {
    /// Tools run from their output directories, so a relative `work_dir`
    /// is anchored to the current directory before the layout is built.
    pub fn new(
        work_dir: &Path,
        flavor: BuildFlavor,
        settings: Settings,
        options: RunOptions,
    ) -> Result<Self> {
        let work_dir = std::path::absolute(work_dir)?;
        let layout = WorkspaceLayout::resolve(&work_dir, flavor, &settings, HostOs::current());
        Ok(Self {
            flavor,
            layout,
            settings,
            options,
        })
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Run every step in order. Missing inputs and config resolution errors
    /// abort; tool failures and HTTP failures are logged and recorded.
    pub fn run(&self) -> Result<PipelineReport> {
        let mut report = PipelineReport::new(self.flavor, &self.layout.data_dir);
        std::fs::create_dir_all(&self.layout.data_dir)?;

        if self.options.skip_dump {
            report.record("il2cpp", StepStatus::Skipped);
        } else {
            self.dump(&mut report)?;
        }

        if self.options.copy_binaries || self.settings.copy_binaries {
            self.copy_binaries(&mut report);
        }

        if self.options.skip_fetch {
            report.record("fetch", StepStatus::Skipped);
        } else {
            self.fetch(&mut report)?;
        }

        report.finish();
        if let Err(e) = write_json(&self.layout.report_json(), &report) {
            warn!("Could not write run report: {}", e);
        }
        info!("Data has been moved to {}", self.layout.data_dir.display());
        Ok(report)
    }

    fn dump(&self, report: &mut PipelineReport) -> Result<()> {
        let layout = &self.layout;

        info!("Dumping il2cpp data...");
        let inspector = Il2CppInspectorDumper::new(
            &layout.il2cpp_executable,
            &layout.library_file,
            &layout.metadata_file,
        )?;
        let outcome = inspector.dump(&layout.data_dir, InspectorOutput::CSharpStubs);
        report.record("il2cpp", outcome.to_step_status());

        let mut disassemblers = self.settings.disassemblers.clone();
        for extra in &self.options.disassemblers {
            if !disassemblers.contains(extra) {
                disassemblers.push(*extra);
            }
        }
        for disassembler in disassemblers {
            let outcome = inspector.dump(
                &layout.disassembler_output_dir(disassembler),
                InspectorOutput::Disassembler(disassembler),
            );
            report.record(
                format!("il2cpp:{}", disassembler.cli_value()),
                outcome.to_step_status(),
            );
        }

        info!("Generating fbs...");
        let fbs = match self.settings.fbs_dumper.variant {
            FbsDumperVariant::Standard => {
                FbsDumper::new(&layout.fbs_executable, &layout.dummy_dll_dir)?
            }
            FbsDumperVariant::Versioned => FbsDumper::versioned(
                &layout.fbs_executable,
                &layout.dummy_dll_dir,
                &layout.library_file,
            )?,
        };

        for job in &self.settings.schemas {
            let mut request = FbsDumpRequest::new(&layout.data_dir)
                .file_name(&job.file_name)
                .with_options(&self.settings.schema_options);
            if job.with_library {
                request = request.library(&layout.library_file);
            }
            if let Some(version) = job.dump_version {
                request = request.dump_version(version);
            }

            let outcome = fbs.dump(&request);
            report.record(format!("fbs:{}", job.file_name), outcome.to_step_status());
        }
        Ok(())
    }

    fn copy_binaries(&self, report: &mut PipelineReport) {
        info!("Copying assembly & metadata...");
        let layout = &self.layout;
        let copies = [
            (&layout.library_file, layout.data_dir.join("libil2cpp.so")),
            (&layout.metadata_file, layout.data_dir.join("global-metadata.dat")),
        ];

        for (from, to) in copies {
            if let Err(e) = std::fs::copy(from, &to) {
                error!("Failed to copy {} to {}: {}", from.display(), to.display(), e);
                report.record("copy-binaries", StepStatus::Failed(e.to_string()));
                return;
            }
        }
        report.record("copy-binaries", StepStatus::Succeeded);
    }

    fn config_source(&self) -> Result<Box<dyn ConfigSource>> {
        let source: Box<dyn ConfigSource> = match self.flavor {
            BuildFlavor::Global => Box::new(GlobalCatalogSource::from_settings(&self.settings.global)?),
            BuildFlavor::Japan => {
                let mut source =
                    JapanConfigSource::new(self.layout.game_config_search_dir(), &self.settings.japan);
                if let Some(url) = &self.options.server_info_url {
                    source = source.with_server_info_url(url);
                }
                Box::new(source)
            }
        };
        Ok(source)
    }

    fn fetch(&self, report: &mut PipelineReport) -> Result<()> {
        let client = JsonClient::new(&self.settings.http)?;
        let source = self.config_source()?;
        let resolved = source.resolve(&client)?;

        let result = source.fetch(&client, &resolved).and_then(|documents| {
            for document in documents {
                let path = self.layout.data_dir.join(document.file_name);
                write_json(&path, &document.value)?;
                info!("{} has been written to {}", document.file_name, path.display());
            }
            Ok(())
        });

        match result {
            Ok(()) => report.record("fetch", StepStatus::Succeeded),
            Err(e) => {
                error!("Error fetching config data from {} ({}): {}", resolved.url, source.name(), e);
                report.record("fetch", StepStatus::Failed(e.to_string()));
            }
        }
        Ok(())
    }
}
