//! This module contains support for uploading to OctoPrint servers.
//!
//! Every request is a curl invocation; the request bodies and the listing
//! model live in the [octoprint_api] crate.

use std::path::Path;

use anyhow::{Context, Result};
use octoprint_api::{FileListing, Position, SliceCommand};

use crate::{
    config::{CurlConfig, OctoPrintConfig, ServerEndpoint},
    curl::Curl,
    error::Error,
    naming,
    process::{self, Runner},
    LogLevel,
};

/// Name of the downloaded file listing.
pub const FILE_LIST_NAME: &str = "file_list.json";

/// Client is a connection to an OctoPrint instance.
#[derive(Debug, Clone, Copy)]
pub struct Client<'a> {
    config: &'a OctoPrintConfig,
    curl: &'a CurlConfig,
    level: LogLevel,
}

impl<'a> Client<'a> {
    /// Create a new client. Nothing is contacted until a request is made.
    pub fn new(config: &'a OctoPrintConfig, curl: &'a CurlConfig, level: LogLevel) -> Self {
        Self { config, curl, level }
    }

    /// Return the underlying [OctoPrintConfig].
    pub fn config(&self) -> &OctoPrintConfig {
        self.config
    }

    /// `host:port`.
    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    /// A curl command already carrying the api key and basic auth.
    fn request(&self) -> Curl {
        let mut curl = Curl::new(self.curl);
        curl.auth(&self.config.credentials(), "X-Api-Key");
        curl
    }

    /// Append `url`, logged with the host replaced by `HOST`.
    fn url(&self, curl: &mut Curl, url: String) {
        let placeholder = match url.strip_prefix(&self.base_url()) {
            Some(rest) => format!("HOST{}", rest),
            None => "URL".to_owned(),
        };
        curl.secret(url, placeholder);
    }

    /// Make sure every folder along `remote_path` exists, creating the
    /// missing ones from the root down. Each folder is probed at most once
    /// and created at most once; once one has been created its children
    /// cannot exist yet and are created without probing. Returns how many
    /// folders were created.
    pub async fn ensure_remote_directory<R: Runner>(&self, runner: &R, remote_path: &str) -> Result<usize> {
        let mut created = 0;
        for step in octoprint_api::folder_steps(remote_path) {
            if created == 0 {
                let mut probe = self.request();
                probe.arg("-G").arg("-f").arg("-s").arg("-o").arg(null_device());
                self.url(
                    &mut probe,
                    octoprint_api::resource_url(&self.base_url(), &self.config.api_path, &step.path),
                );
                if process::probe(runner, &probe.build(), self.level).await? {
                    tracing::debug!(folder = step.path, "remote folder exists");
                    continue;
                }
            }

            let mut create = self.request();
            create.arg("-f").form("foldername", &step.name);
            if !step.parent.is_empty() {
                create.form("path", &step.parent);
            }
            self.url(
                &mut create,
                octoprint_api::resource_url(&self.base_url(), &self.config.api_path, ""),
            );
            process::check(runner, &create.build(), self.level)
                .await
                .with_context(|| format!("creating remote folder {}", step.path))?;
            tracing::info!(folder = step.path, "created remote folder");
            created += 1;
        }
        Ok(created)
    }

    /// Upload `file` into `remote_dir`, creating the folder first.
    pub async fn upload<R: Runner>(&self, runner: &R, file: &Path, remote_dir: &str) -> Result<()> {
        if !file.exists() {
            return Err(Error::MissingInput {
                what: "file to upload",
                path: file.to_owned(),
            }
            .into());
        }
        self.ensure_remote_directory(runner, remote_dir).await?;

        let mut upload = self.request();
        upload
            .arg("-f")
            .form("path", remote_dir.trim_matches('/'))
            .form("file", &format!("@{}", file.display()));
        self.url(
            &mut upload,
            octoprint_api::resource_url(&self.base_url(), &self.config.api_path, ""),
        );
        process::check(runner, &upload.build(), self.level).await?;
        tracing::info!(file = naming::file_name(file), folder = remote_dir, "uploaded to OctoPrint");
        Ok(())
    }

    /// Upload sliced gcode into the configured gcode folder.
    pub async fn upload_gcode<R: Runner>(&self, runner: &R, gcode: &Path) -> Result<()> {
        self.upload(runner, gcode, &self.config.gcode_directory).await
    }

    /// Upload a model into the configured STL folder.
    pub async fn upload_stl<R: Runner>(&self, runner: &R, stl: &Path) -> Result<()> {
        self.upload(runner, stl, &self.config.stl_directory).await
    }

    /// The slice command for an uploaded model, from the configured
    /// slicer, profiles, overrides and position.
    pub fn slice_command(&self, stl_name: &str) -> SliceCommand {
        let stem = stl_name.strip_suffix(".stl").unwrap_or(stl_name);
        let mut command = SliceCommand::new(&self.config.slicer, &format!("{}.gcode", stem));
        command.printer_profile = non_empty(&self.config.printer_profile);
        command.profile = non_empty(&self.config.slice_profile);
        command.overrides = octoprint_api::parse_profile_overrides(&self.config.profile_overrides);
        command.position = Position {
            x: self.config.position_x,
            y: self.config.position_y,
        };
        command
    }

    /// Ask the server to slice a model uploaded into the STL folder. The
    /// server queues the job and answers at once; the job itself is not
    /// followed.
    pub async fn trigger_server_side_slice<R: Runner>(&self, runner: &R, stl_name: &str) -> Result<()> {
        let remote_path = format!("{}/{}", self.config.stl_directory, stl_name);
        let body = serde_json::to_string(&self.slice_command(stl_name))?;

        let mut slice = self.request();
        slice
            .arg("-f")
            .arg("-X")
            .arg("POST")
            .header("Content-Type: application/json")
            .arg("-d")
            .arg(body);
        self.url(
            &mut slice,
            octoprint_api::resource_url(&self.base_url(), &self.config.api_path, &remote_path),
        );

        process::check(runner, &slice.build(), self.level)
            .await
            .with_context(|| format!("asking the server to slice {}", stl_name))?;
        tracing::info!(model = stl_name, "server side slicing requested");
        Ok(())
    }

    /// Download the recursive file listing into `download_dir` and parse it.
    pub async fn list_files<R: Runner>(&self, runner: &R, download_dir: &Path) -> Result<FileListing> {
        let path = download_dir.join(FILE_LIST_NAME);

        let mut list = self.request();
        list.arg("-f").arg("-G");
        self.url(&mut list, octoprint_api::listing_url(&self.base_url()));
        list.arg("-o").secret(path.display().to_string(), "DOWNLOAD_PATH");
        process::check(runner, &list.build(), self.level).await?;

        read_listing(&path).await
    }
}

/// Parse a listing downloaded by [Client::list_files].
pub async fn read_listing(path: &Path) -> Result<FileListing> {
    if !path.exists() {
        return Err(Error::MissingOutput {
            step: "file listing",
            path: path.to_owned(),
        }
        .into());
    }
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn null_device() -> &'static str {
    if cfg!(windows) {
        "NUL"
    } else {
        "/dev/null"
    }
}
