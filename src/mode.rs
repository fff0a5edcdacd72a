//! Closed sets of choices that select a path through the pipeline.

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// How the selection is grouped through export, repair and slicing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// One file per object, each run through the whole pipeline on its own.
    #[default]
    #[serde(alias = "Individual")]
    Individual,

    /// The whole selection exported as one file and processed once.
    #[serde(alias = "Batch")]
    Batch,

    /// One file per object, all sliced together into a single gcode file.
    #[serde(alias = "Merge")]
    Merge,
}

/// Slicer run on this machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LocalSlicer {
    /// Slic3r, also used to repair meshes.
    #[default]
    #[serde(alias = "Slic3r")]
    Slic3r,

    /// CuraEngine.
    #[serde(alias = "CuraEngine")]
    CuraEngine,
}

/// Remote print server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PrintServerKind {
    /// OctoPrint.
    #[default]
    #[serde(alias = "OctoPrint")]
    OctoPrint,

    /// Repetier-Server.
    #[serde(alias = "Repetier")]
    Repetier,
}

/// How much of each external command is written to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Log commands with credentials, hosts and download paths replaced by
    /// placeholders.
    #[default]
    Scrubbed,

    /// Log nothing.
    #[serde(alias = "QUITE")]
    Quiet,

    /// Log commands exactly as run, secrets included.
    Verbose,
}

/// Axis used for the forward/up orientation of exported and imported meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
pub enum Axis {
    /// +X
    #[display("X")]
    #[serde(rename = "X")]
    X,
    /// +Y
    #[display("Y")]
    #[serde(rename = "Y")]
    Y,
    /// +Z
    #[display("Z")]
    #[serde(rename = "Z")]
    Z,
    /// -X
    #[display("-X")]
    #[serde(rename = "-X")]
    NegX,
    /// -Y
    #[display("-Y")]
    #[serde(rename = "-Y")]
    NegY,
    /// -Z
    #[display("-Z")]
    #[serde(rename = "-Z")]
    NegZ,
}

impl Axis {
    /// Unit vector along this axis.
    pub fn vector(self) -> [f32; 3] {
        match self {
            Self::X => [1.0, 0.0, 0.0],
            Self::Y => [0.0, 1.0, 0.0],
            Self::Z => [0.0, 0.0, 1.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }
}

/// Where the webcam preview plane sits relative to the world origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Placement {
    /// Centered on the origin.
    #[default]
    Center,
    /// Bottom edge on the origin.
    North,
    /// Left edge on the origin.
    East,
    /// Top edge on the origin.
    South,
    /// Right edge on the origin.
    West,
}

impl Placement {
    /// Offset of the plane's center for a plane of the given size.
    pub fn offset(self, width: f32, height: f32) -> (f32, f32) {
        match self {
            Self::Center => (0.0, 0.0),
            Self::North => (0.0, height / 2.0),
            Self::East => (width / 2.0, 0.0),
            Self::South => (0.0, -height / 2.0),
            Self::West => (-width / 2.0, 0.0),
        }
    }
}

/// Whether an imported OBJ is split into one object per `o`/`g` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr, Serialize, Deserialize)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitMode {
    /// Split by object and group records.
    #[default]
    On,
    /// Keep everything as one object.
    Off,
}
