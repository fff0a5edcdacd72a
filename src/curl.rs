//! curl command lines. Every network call goes through [Curl], which starts
//! each command with `-k --connect-timeout 15`.

use crate::{config::CurlConfig, process::resolve_executable, CommandLine};

/// Seconds curl waits for a connection before giving up.
pub const CONNECT_TIMEOUT_SECS: u32 = 15;

/// Credentials for a print server. Either, both or neither may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Api key sent as a header.
    pub api_key: Option<String>,
    /// Basic auth user and password, for servers behind a reverse proxy.
    pub basic: Option<(String, String)>,
}

impl Credentials {
    /// Build from config strings, where empty means unset. Basic auth needs
    /// both a user and a password.
    pub fn new(api_key: &str, user: &str, password: &str) -> Self {
        Self {
            api_key: (!api_key.is_empty()).then(|| api_key.to_owned()),
            basic: (!user.is_empty() && !password.is_empty()).then(|| (user.to_owned(), password.to_owned())),
        }
    }
}

/// Builder for a curl [CommandLine].
#[derive(Debug, Clone)]
pub struct Curl {
    command: CommandLine,
}

impl Curl {
    /// Start a command with the configured executable and the shared
    /// TLS and timeout flags.
    pub fn new(config: &CurlConfig) -> Self {
        let mut command = CommandLine::new(resolve_executable(&config.exec_dir, &config.exec_name));
        command
            .arg("-k")
            .arg("--connect-timeout")
            .arg(CONNECT_TIMEOUT_SECS.to_string());
        Self { command }
    }

    /// Append a loggable argument.
    pub fn arg(&mut self, value: impl Into<String>) -> &mut Self {
        self.command.arg(value);
        self
    }

    /// Append an argument replaced by `placeholder` in scrubbed logs.
    pub fn secret(&mut self, value: impl Into<String>, placeholder: impl Into<String>) -> &mut Self {
        self.command.secret(value, placeholder);
        self
    }

    /// `-H <header>`.
    pub fn header(&mut self, header: &str) -> &mut Self {
        self.arg("-H").arg(header)
    }

    /// `-F <field>=<value>`.
    pub fn form(&mut self, field: &str, value: &str) -> &mut Self {
        self.arg("-F").arg(format!("{}={}", field, value))
    }

    /// Attach the api key as `<header_name>: <key>` and basic auth as
    /// `-u user:password`, whichever are set.
    pub fn auth(&mut self, credentials: &Credentials, header_name: &str) -> &mut Self {
        if let Some(api_key) = &credentials.api_key {
            self.arg("-H").secret(
                format!("{}: {}", header_name, api_key),
                format!("{}: X-API-KEY", header_name),
            );
        }
        self.basic_auth(credentials)
    }

    /// Attach only `-u user:password`, if set.
    pub fn basic_auth(&mut self, credentials: &Credentials) -> &mut Self {
        if let Some((user, password)) = &credentials.basic {
            self.arg("-u").secret(format!("{}:{}", user, password), "USER:PASS");
        }
        self
    }

    /// Finish the command.
    pub fn build(&self) -> CommandLine {
        self.command.clone()
    }
}
