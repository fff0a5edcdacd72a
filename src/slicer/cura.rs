//! Support for CuraEngine (https://github.com/Ultimaker/CuraEngine).

use std::path::{Path, PathBuf};

use super::{existing, extra_args, SliceInputs, Slicer};
use crate::{config::CuraEngineConfig, process::resolve_executable, CommandLine};

/// Handle to invoke CuraEngine with some specific config.
#[derive(Debug, Clone)]
pub struct CuraEngine {
    executable: PathBuf,
    config: PathBuf,
    extra_args: String,
}

impl CuraEngine {
    /// Create a new [CuraEngine] from its configuration.
    pub fn new(config: &CuraEngineConfig) -> Self {
        Self {
            executable: resolve_executable(&config.exec_dir, &config.exec_name),
            config: config.config_path.clone(),
            extra_args: config.extra_args.clone(),
        }
    }
}

impl Slicer for CuraEngine {
    fn slice_command(&self, inputs: SliceInputs<'_>, gcode: &Path) -> CommandLine {
        let mut command = CommandLine::new(&self.executable);
        if let Some(config) = existing(&self.config) {
            command.arg("-j").path(config);
        }
        command.args(extra_args(&self.extra_args));
        match inputs {
            SliceInputs::Single(stl) => {
                command.path(stl);
            }
            SliceInputs::Merge(stls) => {
                for stl in stls {
                    command.arg("-l").path(stl);
                }
            }
        }
        command.arg("-o").path(gcode);
        command
    }
}
