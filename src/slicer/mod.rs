//! Local slicer backends. Each one turns exported STL files into a gcode
//! file by running an external program.

pub mod cura;
pub mod slic3r;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::{
    config::Config,
    error::Error,
    process::{self, Runner},
    CommandLine, LocalSlicer, LogLevel,
};

/// Meshes handed to one slicer run.
#[derive(Debug, Clone, Copy)]
pub enum SliceInputs<'a> {
    /// A single mesh, from Individual or Batch mode.
    Single(&'a Path),

    /// Several meshes arranged together on one bed, from Merge mode.
    Merge(&'a [PathBuf]),
}

/// A slicer that can be driven from the command line.
pub trait Slicer {
    /// Command that slices `inputs` into `gcode`.
    fn slice_command(&self, inputs: SliceInputs<'_>, gcode: &Path) -> CommandLine;
}

/// AnySlicer is any supported local slicer.
#[derive(Debug, Clone)]
pub enum AnySlicer {
    /// Slic3r
    Slic3r(slic3r::Slic3r),

    /// CuraEngine
    CuraEngine(cura::CuraEngine),
}

impl AnySlicer {
    /// Build the configured slicer of the given kind.
    pub fn load(config: &Config, kind: LocalSlicer) -> Self {
        match kind {
            LocalSlicer::Slic3r => slic3r::Slic3r::new(&config.slic3r).into(),
            LocalSlicer::CuraEngine => cura::CuraEngine::new(&config.curaengine).into(),
        }
    }
}

impl From<slic3r::Slic3r> for AnySlicer {
    fn from(slicer: slic3r::Slic3r) -> Self {
        Self::Slic3r(slicer)
    }
}

impl From<cura::CuraEngine> for AnySlicer {
    fn from(slicer: cura::CuraEngine) -> Self {
        Self::CuraEngine(slicer)
    }
}

impl Slicer for AnySlicer {
    fn slice_command(&self, inputs: SliceInputs<'_>, gcode: &Path) -> CommandLine {
        match self {
            Self::Slic3r(slicer) => slicer.slice_command(inputs, gcode),
            Self::CuraEngine(slicer) => slicer.slice_command(inputs, gcode),
        }
    }
}

/// Slice `inputs` into `gcode`, failing if the slicer exits non-zero or
/// leaves no gcode behind.
pub async fn slice<R: Runner, S: Slicer>(
    runner: &R,
    slicer: &S,
    inputs: SliceInputs<'_>,
    gcode: &Path,
    level: LogLevel,
) -> Result<PathBuf> {
    let inputs_path = match inputs {
        SliceInputs::Single(path) => vec![path],
        SliceInputs::Merge(paths) => paths.iter().map(PathBuf::as_path).collect(),
    };
    for path in &inputs_path {
        if !path.exists() {
            return Err(Error::MissingInput {
                what: "STL file",
                path: path.to_path_buf(),
            }
            .into());
        }
    }

    let command = slicer.slice_command(inputs, gcode);
    process::check(runner, &command, level).await?;

    // Make sure the G-code file was created.
    if !gcode.exists() {
        return Err(Error::MissingOutput {
            step: "slicing",
            path: gcode.to_owned(),
        }
        .into());
    }

    tracing::debug!(gcode = format!("{:?}", gcode), "sliced");
    Ok(gcode.to_owned())
}

/// Split free-form extra arguments on whitespace.
pub(crate) fn extra_args(extra: &str) -> impl Iterator<Item = &str> {
    extra.split_whitespace()
}

/// `path` when it names an existing file.
pub(crate) fn existing(path: &Path) -> Option<&Path> {
    (!path.as_os_str().is_empty() && path.exists()).then_some(path)
}
