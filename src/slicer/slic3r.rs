//! Support for Slic3r (https://slic3r.org/), which both slices and repairs
//! meshes.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{existing, extra_args, SliceInputs, Slicer};
use crate::{
    config::Slic3rConfig,
    error::Error,
    naming,
    process::{self, resolve_executable, Runner},
    CommandLine, LogLevel,
};

/// Handle to invoke Slic3r with some specific config.
#[derive(Debug, Clone)]
pub struct Slic3r {
    executable: PathBuf,
    config: PathBuf,
    post_script: PathBuf,
    extra_args: String,
}

impl Slic3r {
    /// Create a new [Slic3r] from its configuration.
    pub fn new(config: &Slic3rConfig) -> Self {
        Self {
            executable: resolve_executable(&config.exec_dir, &config.exec_name),
            config: config.config_path.clone(),
            post_script: config.post_script.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// `slic3r --repair <stl>`.
    pub fn repair_command(&self, stl: &Path) -> CommandLine {
        let mut command = CommandLine::new(&self.executable);
        command.arg("--repair").path(stl);
        command
    }

    /// Repair `stl` in place. Slic3r writes the result next to the input as
    /// `<stem>_fixed.obj`; its path is returned.
    pub async fn repair<R: Runner>(&self, runner: &R, stl: &Path, level: LogLevel) -> Result<PathBuf> {
        if !stl.exists() {
            return Err(Error::MissingInput {
                what: "STL file to repair",
                path: stl.to_owned(),
            }
            .into());
        }

        process::check(runner, &self.repair_command(stl), level).await?;

        let parent = stl.parent().unwrap_or_else(|| Path::new(""));
        let fixed = naming::fixed_obj_path(parent, &naming::file_stem(stl));
        if !fixed.exists() {
            return Err(Error::MissingOutput {
                step: "slic3r --repair",
                path: fixed,
            }
            .into());
        }
        Ok(fixed)
    }
}

impl Slicer for Slic3r {
    fn slice_command(&self, inputs: SliceInputs<'_>, gcode: &Path) -> CommandLine {
        let mut command = CommandLine::new(&self.executable);
        if let Some(config) = existing(&self.config) {
            command.arg("--load").path(config);
        }
        command.arg("--output").path(gcode);
        if let Some(script) = existing(&self.post_script) {
            command.arg("--post-process").path(script);
        }
        command.args(extra_args(&self.extra_args));
        match inputs {
            SliceInputs::Single(stl) => {
                command.path(stl);
            }
            SliceInputs::Merge(stls) => {
                command.arg("--merge");
                for stl in stls {
                    command.path(stl);
                }
            }
        }
        command
    }
}
