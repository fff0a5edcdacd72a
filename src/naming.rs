//! Deterministic names for the files an action writes.
//!
//! Per object artifacts are named after the object; artifacts standing for
//! the whole selection are named after the document, or [UNTITLED] when the
//! document has never been saved. Object names are assumed unique.

use std::path::{Path, PathBuf};

/// Stem used when the document has no file name.
pub const UNTITLED: &str = "Untitled";

/// Turn an object name into a file stem by replacing path separators and
/// other characters that cannot appear in a file name.
pub fn object_stem(object: &str) -> String {
    let stem: String = object
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.trim_matches('.').is_empty() {
        "_".to_owned()
    } else {
        stem
    }
}

/// Stem for artifacts that stand for the whole selection.
pub fn document_stem(document: Option<&Path>) -> String {
    document
        .and_then(Path::file_stem)
        .map(|stem| object_stem(&stem.to_string_lossy()))
        .unwrap_or_else(|| UNTITLED.to_owned())
}

/// `<dir>/<stem>.stl`
pub fn stl_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.stl", stem))
}

/// `<dir>/<stem>_fixed.obj`, where Slic3r writes a repaired mesh.
pub fn fixed_obj_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}_fixed.obj", stem))
}

/// `<dir>/<stem>.gcode`
pub fn gcode_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.gcode", stem))
}

/// File name of `path` as a string, for remote uploads.
pub fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Stem of `path` as a string.
pub fn file_stem(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}
