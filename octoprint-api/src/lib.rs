#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! This crate describes the parts of the OctoPrint REST api used to push
//! models and gcode to a print server: the endpoint paths, the folder
//! layout, the slice command body and the recursive file listing.
//!
//! It performs no i/o of its own.

mod files;
mod slice;

pub use files::{Dimensions, Filament, FileEntry, FileListing, Folder, GcodeAnalysis, MachineCode, Model, PrintingArea, Refs};
pub use slice::{parse_profile_overrides, Position, SliceCommand};

/// Files stored on the OctoPrint host itself.
pub const FILES_LOCAL: &str = "/api/files/local";

/// Files stored on the printer's SD card.
pub const FILES_SDCARD: &str = "/api/files/sdcard";

/// Root of the files api, used for listings.
pub const FILES: &str = "/api/files";

/// Url that returns every file and folder on the server, folders expanded.
pub fn listing_url(base_url: &str) -> String {
    format!("{}{}?recursive=true", base_url, FILES)
}

/// Join a files endpoint with a remote path, skipping empty path segments.
pub fn resource_url(base_url: &str, api_path: &str, remote_path: &str) -> String {
    let path = segments(remote_path).collect::<Vec<_>>().join("/");
    if path.is_empty() {
        format!("{}{}", base_url, api_path)
    } else {
        format!("{}{}/{}", base_url, api_path, path)
    }
}

/// A single folder along a remote path, from the root towards the leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderStep {
    /// Path of the folder holding this one, empty at the root.
    pub parent: String,

    /// Name of this folder.
    pub name: String,

    /// Full path of this folder.
    pub path: String,
}

/// Break a slash-delimited folder path into the folders that must exist,
/// shortest prefix first. Empty segments (`a//b`, leading or trailing
/// slashes) are dropped.
pub fn folder_steps(remote_path: &str) -> Vec<FolderStep> {
    let mut steps: Vec<FolderStep> = vec![];
    for name in segments(remote_path) {
        let parent = steps.last().map(|step| step.path.clone()).unwrap_or_default();
        let path = if parent.is_empty() {
            name.to_owned()
        } else {
            format!("{}/{}", parent, name)
        };
        steps.push(FolderStep {
            parent,
            name: name.to_owned(),
            path,
        });
    }
    steps
}

fn segments(remote_path: &str) -> impl Iterator<Item = &str> {
    remote_path.split('/').map(str::trim).filter(|segment| !segment.is_empty())
}
