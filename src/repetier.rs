//! This module contains support for uploading gcode to Repetier-Server.

use std::path::Path;

use anyhow::Result;

use crate::{
    config::{CurlConfig, RepetierConfig, ServerEndpoint},
    curl::Curl,
    error::Error,
    naming,
    process::{self, Runner},
    LogLevel,
};

/// Client is a connection to a Repetier-Server instance.
#[derive(Debug, Clone, Copy)]
pub struct Client<'a> {
    config: &'a RepetierConfig,
    curl: &'a CurlConfig,
    level: LogLevel,
}

impl<'a> Client<'a> {
    /// Create a new client. Nothing is contacted until a request is made.
    pub fn new(config: &'a RepetierConfig, curl: &'a CurlConfig, level: LogLevel) -> Self {
        Self { config, curl, level }
    }

    /// Return the underlying [RepetierConfig].
    pub fn config(&self) -> &RepetierConfig {
        self.config
    }

    /// `host:port`.
    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    /// `<host>:<port><api_path>/<printer slug>`, where models are uploaded.
    pub fn upload_url(&self) -> String {
        let slug = self.config.gcode_directory.trim_matches('/');
        format!("{}{}/{}", self.base_url(), self.config.api_path.trim_end_matches('/'), slug)
    }

    /// Upload `gcode` to the configured printer.
    pub async fn upload_gcode<R: Runner>(&self, runner: &R, gcode: &Path) -> Result<()> {
        if !gcode.exists() {
            return Err(Error::MissingInput {
                what: "file to upload",
                path: gcode.to_owned(),
            }
            .into());
        }

        let mut upload = Curl::new(self.curl);
        upload
            .arg("-f")
            .arg("-i")
            .arg("-X")
            .arg("POST")
            .auth(&self.config.credentials(), "x-api-key")
            .form("a", "upload")
            .form("filename", &format!("@{}", gcode.display()));
        let url = self.upload_url();
        let placeholder = format!("HOST{}", url.strip_prefix(&self.base_url()).unwrap_or_default());
        upload.secret(url, placeholder);

        process::check(runner, &upload.build(), self.level).await?;
        tracing::info!(
            file = naming::file_name(gcode),
            printer = self.config.gcode_directory,
            "uploaded to Repetier"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_upload_url() {
        let config = RepetierConfig {
            gcode_directory: "/prusa_mk3/".to_owned(),
            ..Default::default()
        };
        let curl = CurlConfig::default();
        let client = Client::new(&config, &curl, LogLevel::Scrubbed);
        assert_eq!(client.upload_url(), "http://localhost:3344/printer/model/prusa_mk3");
    }
}
