use std::path::{Path, PathBuf};

/// Kind of temporary file, each removed under its own cleanup flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporaryKind {
    /// STL exported for slicing, repair or upload.
    Stl,
    /// OBJ written by `slic3r --repair`.
    Obj,
}

/// TemporaryFiles records the intermediate files written during one action
/// so they can be unlinked when it ends, whether it succeeded or not.
/// Sliced gcode is never tracked here; it is the product.
#[derive(Debug, Default)]
pub struct TemporaryFiles {
    files: Vec<(TemporaryKind, PathBuf)>,
}

impl TemporaryFiles {
    /// Start with nothing tracked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path`. Tracking the same path twice is a no-op.
    pub fn track(&mut self, kind: TemporaryKind, path: &Path) {
        if !self.files.iter().any(|(k, p)| *k == kind && p == path) {
            self.files.push((kind, path.to_owned()));
        }
    }

    /// Paths of the given kind, in the order they were tracked.
    pub fn paths(&self, kind: TemporaryKind) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, path)| path.as_path())
    }

    /// Unlink every tracked file of the given kind that still exists and
    /// stop tracking them. Returns how many were removed.
    pub async fn remove(&mut self, kind: TemporaryKind) -> usize {
        let mut removed = 0;
        let mut kept = vec![];
        for (k, path) in self.files.drain(..) {
            if k != kind {
                kept.push((k, path));
                continue;
            }
            tracing::trace!(path = format!("{:?}", path), "removing temporary file");
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = format!("{:?}", path), error = format!("{:?}", e), "failed to remove temporary file");
                }
            }
        }
        self.files = kept;
        removed
    }
}
