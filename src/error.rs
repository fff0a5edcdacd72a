//! Failures that abort an action.
//!
//! Library functions return [anyhow::Result]; these are the typed errors
//! they bail with, so callers can `downcast_ref` when they need to tell a
//! missing selection from a slicer crash.

use std::path::PathBuf;

/// Error raised by a pipeline step. Every one of these aborts the current
/// action; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The action needs at least one selected object.
    #[error("please select some objects first")]
    EmptySelection,

    /// A file the step consumes does not exist.
    #[error("{what} not found: {}", path.display())]
    MissingInput {
        /// What the file was supposed to be.
        what: &'static str,
        /// Where it was expected.
        path: PathBuf,
    },

    /// An external program exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "a signal".to_owned()))]
    Process {
        /// Program that was run.
        program: String,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// A step completed but the file it should have produced is absent.
    #[error("{step} did not produce {}", path.display())]
    MissingOutput {
        /// The step that should have written the file.
        step: &'static str,
        /// Where the file was expected.
        path: PathBuf,
    },

    /// The selected print server cannot perform this action.
    #[error("{action} is not supported by {server}")]
    Unsupported {
        /// Requested action.
        action: &'static str,
        /// Selected print server.
        server: String,
    },

    /// Forward and up axes must be perpendicular.
    #[error("axis forward ({forward}) and up ({up}) must be perpendicular")]
    InvalidAxes {
        /// Forward axis.
        forward: String,
        /// Up axis.
        up: String,
    },

    /// The webcam image has no usable size.
    #[error("invalid preview image {}: {reason}", path.display())]
    InvalidImage {
        /// Downloaded image.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },
}
