//! On-disk layout of a dump run

use crate::config::Settings;
use crate::types::{BuildFlavor, Disassembler, HostOs};
use std::path::{Path, PathBuf};

/// Every path a pipeline run touches, resolved against the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub tools_dir: PathBuf,
    pub extract_dir: PathBuf,
    pub data_dir: PathBuf,
    pub library_file: PathBuf,
    pub metadata_file: PathBuf,
    pub dummy_dll_dir: PathBuf,
    pub il2cpp_executable: PathBuf,
    pub fbs_executable: PathBuf,
}

impl WorkspaceLayout {
    pub fn resolve(work_dir: &Path, flavor: BuildFlavor, settings: &Settings, os: HostOs) -> Self {
        let prefix = flavor.dir_prefix();
        let tools_dir = work_dir.join(&settings.tools_dir);
        let extract_dir = work_dir.join(format!("{}_extracted", prefix));
        let data_dir = work_dir.join(format!("{}_data", prefix));

        let library_file = extract_dir
            .join("config_arm64_v8a")
            .join("lib")
            .join("arm64-v8a")
            .join("libil2cpp.so");
        let metadata_file = extract_dir
            .join("BlueArchive_apk")
            .join("assets")
            .join("bin")
            .join("Data")
            .join("Managed")
            .join("Metadata")
            .join("global-metadata.dat");
        let dummy_dll_dir = data_dir.join("dll");

        let inspector = &settings.il2cpp_inspector;
        let il2cpp_executable = tools_dir
            .join(&inspector.dir)
            .join(os.executable_name(&inspector.binary));
        let fbs = &settings.fbs_dumper;
        let fbs_executable = tools_dir.join(&fbs.dir).join(os.executable_name(&fbs.binary));

        Self {
            tools_dir,
            extract_dir,
            data_dir,
            library_file,
            metadata_file,
            dummy_dll_dir,
            il2cpp_executable,
            fbs_executable,
        }
    }

    /// Directory searched for the encrypted regional config blob
    pub fn game_config_search_dir(&self) -> PathBuf {
        self.extract_dir
            .join("UnityDataAssetPack")
            .join("assets")
            .join("bin")
            .join("Data")
    }

    pub fn disassembler_output_dir(&self, disassembler: Disassembler) -> PathBuf {
        self.data_dir.join(disassembler.output_dir_name())
    }

    pub fn config_json(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn resources_json(&self) -> PathBuf {
        self.data_dir.join("resources.json")
    }

    pub fn report_json(&self) -> PathBuf {
        self.data_dir.join("report.json")
    }
}
