//! Running one action against the scene, from the selection through
//! export, repair, slicing and upload.
//!
//! [run] is the only entry point: it routes an [Action] to exactly one
//! driver through exhaustive matches on the export mode, the slicer and the
//! print server, then removes the temporary files the action left behind.

mod repair;
mod server;
mod slice;
mod upload;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use octoprint_api::FileListing;
use parse_display::Display;
use serde::Serialize;

use crate::{
    config::Config,
    error::Error,
    file::{TemporaryFiles, TemporaryKind},
    naming,
    process::Runner,
    traits::{ExportOptions, Host, PlaneSpec},
    ExportMode, LocalSlicer, PrintServerKind,
};

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "kebab-case")]
pub enum Action {
    /// Round trip the selection through `slic3r --repair`.
    Repair,

    /// Slice the selection locally.
    #[display("slice")]
    Slice(LocalSlicer),

    /// Upload the selection as STL.
    #[display("upload-stl")]
    UploadStl(PrintServerKind),

    /// Create the configured folder on the server.
    #[display("make-directory")]
    MakeDirectory(PrintServerKind),

    /// Download and parse the server's file listing.
    #[display("list-files")]
    ListFiles(PrintServerKind),

    /// Show a webcam snapshot in the viewport.
    #[display("preview-webcam")]
    PreviewWebcam(PrintServerKind),

    /// Stream the webcam in the viewport.
    #[display("stream-webcam")]
    StreamWebcam(PrintServerKind),

    /// Run curl with the configured test arguments.
    CurlTest,
}

/// What an action produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// STL files written, in order.
    pub exported: Vec<PathBuf>,
    /// Objects imported from repaired meshes.
    pub repaired: Vec<String>,
    /// Gcode files written by local slicers.
    pub gcode: Vec<PathBuf>,
    /// `<server>: <file>` for every upload.
    pub uploaded: Vec<String>,
    /// Uploaded models the server was asked to slice.
    pub sliced_on_server: Vec<String>,
    /// Remote folders created.
    pub folders_created: usize,
    /// Downloaded file listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<FileListing>,
    /// Webcam preview plane.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PlaneSpec>,
    /// Exit code and output of a curl test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curl_test: Option<(Option<i32>, String)>,
    /// Urls opened in the browser.
    pub opened_urls: Vec<String>,
    /// Temporary files removed at the end.
    pub removed_temporary: usize,
}

/// Everything an action runs against: the scene, the way programs are
/// started and the configuration.
#[derive(Debug)]
pub struct Context<H, R> {
    /// The scene.
    pub host: H,
    /// Starts external programs.
    pub runner: R,
    /// Read-only during an action.
    pub config: Config,
    temporary: TemporaryFiles,
}

impl<H: Host, R: Runner> Context<H, R> {
    /// Bundle a host, runner and configuration.
    pub fn new(host: H, runner: R, config: Config) -> Self {
        Self {
            host,
            runner,
            config,
            temporary: TemporaryFiles::new(),
        }
    }

    /// The selection, or [Error::EmptySelection].
    fn selection(&self) -> Result<Vec<String>> {
        let selection = self.host.selection();
        if selection.is_empty() {
            return Err(Error::EmptySelection.into());
        }
        Ok(selection)
    }

    /// Stem for artifacts standing for the whole selection.
    fn document_stem(&self) -> String {
        naming::document_stem(self.host.document_path().as_deref())
    }

    /// Export `objects` into `<temp_stl_directory>/<stem>.stl`.
    async fn export(&mut self, objects: &[String], stem: &str) -> Result<PathBuf> {
        let dir = self.config.export.temp_stl_directory.clone();
        create_dir(&dir).await?;

        let path = naming::stl_path(&dir, stem);
        self.temporary.track(TemporaryKind::Stl, &path);
        self.host
            .export_stl(objects, &path, &ExportOptions::from(&self.config.export))?;
        if !path.exists() {
            return Err(Error::MissingOutput {
                step: "STL export",
                path,
            }
            .into());
        }
        tracing::debug!(path = format!("{:?}", path), objects = format!("{:?}", objects), "exported");
        Ok(path)
    }

    fn hide_all(&mut self, objects: &[String]) -> Result<()> {
        for object in objects {
            self.host.hide(object)?;
        }
        Ok(())
    }

    /// Open each url once in the browser, when configured to.
    fn open_browser(&mut self, urls: Vec<String>, report: &mut Report) -> Result<()> {
        if !self.config.misc.open_browser_after_upload {
            return Ok(());
        }
        for url in urls {
            if report.opened_urls.contains(&url) {
                continue;
            }
            self.host.open_url(&url)?;
            report.opened_urls.push(url);
        }
        Ok(())
    }

    async fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        if self.config.export.clean_temp_stl_files {
            removed += self.temporary.remove(TemporaryKind::Stl).await;
        }
        if self.config.import.clean_temp_obj_files {
            removed += self.temporary.remove(TemporaryKind::Obj).await;
        }
        // Kinds whose clean flag is off stay on disk.
        self.temporary = TemporaryFiles::new();
        removed
    }
}

/// Objects grouped the way the export mode processes them: one group per
/// object, or the whole selection as one group named after the document.
fn groups(mode: ExportMode, selection: &[String], document_stem: &str) -> Vec<(String, Vec<String>)> {
    match mode {
        ExportMode::Individual | ExportMode::Merge => selection
            .iter()
            .map(|object| (naming::object_stem(object), vec![object.clone()]))
            .collect(),
        ExportMode::Batch => vec![(document_stem.to_owned(), selection.to_vec())],
    }
}

async fn create_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))
}

/// Run `action`. Temporary files are cleaned up according to the
/// configuration whether the action succeeded or not.
pub async fn run<H: Host, R: Runner>(ctx: &mut Context<H, R>, action: Action) -> Result<Report> {
    tracing::info!(
        action = action.to_string(),
        mode = ctx.config.export.mode.to_string(),
        "starting"
    );

    let result = match action {
        Action::Repair => repair::repair(ctx).await,
        Action::Slice(slicer) => slice::slice(ctx, slicer).await,
        Action::UploadStl(server) => upload::upload_stl(ctx, server).await,
        Action::MakeDirectory(server) => server::make_directory(ctx, server).await,
        Action::ListFiles(server) => server::list_files(ctx, server).await,
        Action::PreviewWebcam(server) => server::preview_webcam(ctx, server, false).await,
        Action::StreamWebcam(server) => server::preview_webcam(ctx, server, true).await,
        Action::CurlTest => server::curl_test(ctx).await,
    };

    let removed = ctx.cleanup().await;
    let mut report = result?;
    report.removed_temporary = removed;
    tracing::info!(action = action.to_string(), removed_temporary = removed, "done");
    Ok(report)
}
