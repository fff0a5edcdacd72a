#![allow(refining_impl_trait)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! This crate implements the 3D print shortcuts: take the selected objects
//! of a 3D scene, export them to STL, optionally repair them with Slic3r,
//! slice them with Slic3r or CuraEngine, and push the results to an
//! OctoPrint or Repetier print server. It can also show the server's
//! webcam inside the scene.
//!
//! Every external program (exporter, slicers, curl) is started through a
//! [Runner], and every scene operation goes through a [Host], both handed
//! to [pipeline::run] in a [pipeline::Context].

mod any_server;
mod axis;
pub mod config;
pub mod curl;
mod error;
mod file;
pub mod headless;
mod mode;
pub mod naming;
pub mod octoprint;
pub mod pipeline;
mod process;
pub mod repetier;
pub mod slicer;
mod traits;
pub mod webcam;

#[cfg(test)]
mod tests;

pub use any_server::{AnyPrintServer, PrintServer};
pub use axis::AxisConversion;
pub use config::Config;
pub use error::Error;
pub use file::{TemporaryFiles, TemporaryKind};
pub use mode::{Axis, ExportMode, LocalSlicer, LogLevel, Placement, PrintServerKind, SplitMode};
pub use process::{check, probe, resolve_executable, run, Arg, CommandLine, Completion, Runner, Sensitivity, SystemRunner};
pub use traits::{
    Actuator, ActuatorKind, ButtonSpec, Controller, ControllerKind, ExportOptions, Host, ImportOptions, LogicGraph,
    MouseEvent, PlaneSpec, Sensor, SensorKind, ViewportSpec,
};
