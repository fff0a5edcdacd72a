use std::{future::Future, path::Path};

use anyhow::Result;

use crate::{
    config::{Config, ServerEndpoint},
    error::Error,
    octoprint, repetier,
    process::Runner,
    PrintServerKind,
};

/// A print server that accepts sliced gcode.
pub trait PrintServer {
    /// Which server this is.
    fn kind(&self) -> PrintServerKind;

    /// Address of the server's web ui.
    fn web_url(&self) -> String;

    /// Upload sliced gcode to wherever this server keeps it.
    fn upload_gcode<R: Runner>(&self, runner: &R, gcode: &Path) -> impl Future<Output = Result<()>>;
}

/// AnyPrintServer is any supported print server.
#[derive(Debug, Clone, Copy)]
pub enum AnyPrintServer<'a> {
    /// OctoPrint
    OctoPrint(octoprint::Client<'a>),

    /// Repetier-Server
    Repetier(repetier::Client<'a>),
}

impl<'a> AnyPrintServer<'a> {
    /// Build a client for the given server from the configuration.
    pub fn load(config: &'a Config, kind: PrintServerKind) -> Self {
        let level = config.misc.log_level;
        match kind {
            PrintServerKind::OctoPrint => octoprint::Client::new(&config.octoprint, &config.curl, level).into(),
            PrintServerKind::Repetier => repetier::Client::new(&config.repetier, &config.curl, level).into(),
        }
    }

    /// Every server whose `auto_upload_from_slicers` flag is set, OctoPrint
    /// first.
    pub fn auto_upload_targets(config: &'a Config) -> Vec<Self> {
        let mut targets = vec![];
        if config.octoprint.auto_upload_from_slicers {
            targets.push(Self::load(config, PrintServerKind::OctoPrint));
        }
        if config.repetier.auto_upload_from_slicers {
            targets.push(Self::load(config, PrintServerKind::Repetier));
        }
        targets
    }

    /// The OctoPrint client, or [Error::Unsupported] naming `action`.
    pub fn octoprint(&self, action: &'static str) -> Result<&octoprint::Client<'a>> {
        match self {
            Self::OctoPrint(client) => Ok(client),
            Self::Repetier(_) => Err(Error::Unsupported {
                action,
                server: self.kind().to_string(),
            }
            .into()),
        }
    }
}

impl<'a> From<octoprint::Client<'a>> for AnyPrintServer<'a> {
    fn from(client: octoprint::Client<'a>) -> Self {
        Self::OctoPrint(client)
    }
}

impl<'a> From<repetier::Client<'a>> for AnyPrintServer<'a> {
    fn from(client: repetier::Client<'a>) -> Self {
        Self::Repetier(client)
    }
}

macro_rules! for_all {
    (|$slf:ident, $server:ident| $body:block) => {
        match $slf {
            Self::OctoPrint($server) => $body,
            Self::Repetier($server) => $body,
        }
    };
}

impl PrintServer for octoprint::Client<'_> {
    fn kind(&self) -> PrintServerKind {
        PrintServerKind::OctoPrint
    }

    fn web_url(&self) -> String {
        self.config().base_url()
    }

    async fn upload_gcode<R: Runner>(&self, runner: &R, gcode: &Path) -> Result<()> {
        octoprint::Client::upload_gcode(self, runner, gcode).await
    }
}

impl PrintServer for repetier::Client<'_> {
    fn kind(&self) -> PrintServerKind {
        PrintServerKind::Repetier
    }

    fn web_url(&self) -> String {
        self.config().base_url()
    }

    async fn upload_gcode<R: Runner>(&self, runner: &R, gcode: &Path) -> Result<()> {
        repetier::Client::upload_gcode(self, runner, gcode).await
    }
}

impl PrintServer for AnyPrintServer<'_> {
    fn kind(&self) -> PrintServerKind {
        for_all!(|self, server| { server.kind() })
    }

    fn web_url(&self) -> String {
        for_all!(|self, server| { server.web_url() })
    }

    async fn upload_gcode<R: Runner>(&self, runner: &R, gcode: &Path) -> Result<()> {
        for_all!(|self, server| { PrintServer::upload_gcode(server, runner, gcode).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_auto_upload_targets() {
        let mut config = Config::default();
        assert!(AnyPrintServer::auto_upload_targets(&config).is_empty());

        config.octoprint.auto_upload_from_slicers = true;
        config.repetier.auto_upload_from_slicers = true;
        let kinds: Vec<_> = AnyPrintServer::auto_upload_targets(&config)
            .iter()
            .map(|server| server.kind())
            .collect();
        assert_eq!(kinds, vec![PrintServerKind::OctoPrint, PrintServerKind::Repetier]);
    }

    #[test]
    fn test_repetier_cannot_make_folders() {
        let config = Config::default();
        let server = AnyPrintServer::load(&config, PrintServerKind::Repetier);
        let err = server.octoprint("mkdir").unwrap_err();
        assert_eq!(err.to_string(), "mkdir is not supported by repetier");
    }
}
