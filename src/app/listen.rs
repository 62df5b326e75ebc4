//! Listener bootstrap.
//!
//! # Responsibilities
//! - Build a configuration for one listening address
//! - Turn a built configuration into an httpd invocation
//!
//! # Design Decisions
//! - `Listen` is written before the main file so the main file may add more
//! - The process is spawned in the foreground and killed on drop

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::app::server::Server;
use crate::conf::{Conf, DirectiveSink};
use crate::dispatch::Outcome;
use crate::error::{Error, Result};

/// One listening address plus an optional main configuration file.
#[derive(Debug, Clone)]
pub struct Listener {
    bind_address: String,
    file: Option<PathBuf>,
}

impl Listener {
    pub fn new(bind_address: impl Into<String>) -> Self {
        Self {
            bind_address: bind_address.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    /// Run `server` against a fresh configuration for this listener.
    pub async fn bootstrap(&self, server: &Server) -> Result<Conf> {
        if self.bind_address.trim().is_empty() {
            return Err(Error::invalid_argument("Listen", "bind address is empty"));
        }

        let mut conf = match &self.file {
            Some(file) => Conf::new().with_file(file),
            None => Conf::new(),
        };
        conf.prepend_directive(&format!("Listen {}", self.bind_address));

        let outcome = server.handle(&mut conf).await?;
        if outcome == Outcome::Halted {
            tracing::debug!(address = %self.bind_address, "Build halted before end of stack");
        }
        tracing::info!(
            address = %self.bind_address,
            arguments = conf.to_args().len(),
            "Configuration built"
        );
        Ok(conf)
    }

    /// httpd command line for a built configuration.
    pub fn command(&self, httpd: &Path, conf: &Conf) -> Command {
        let mut command = Command::new(httpd);
        command.arg("-DFOREGROUND").args(conf.to_args()).kill_on_drop(true);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{handler_fn, Flow};

    #[tokio::test]
    async fn test_bootstrap_writes_listen_first() {
        let server = Server::new();
        server
            .mount(
                "/status",
                handler_fn(|cx| {
                    cx.append("SetHandler server-status");
                    Ok(Flow::Next)
                }),
            )
            .unwrap();

        let conf = Listener::new("127.0.0.1:8080")
            .with_file("/etc/httpd/httpd.conf")
            .bootstrap(&server)
            .await
            .unwrap();

        assert_eq!(conf.prepended()[0], "Listen 127.0.0.1:8080");
        assert_eq!(
            conf.appended(),
            ["<Location \"/status\">", "SetHandler server-status", "</Location>"]
        );
        assert!(conf.is_ended());
    }

    #[tokio::test]
    async fn test_empty_bind_address_rejected() {
        let err = Listener::new(" ").bootstrap(&Server::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_command_line() {
        let mut conf = Conf::new().with_file("/etc/httpd.conf");
        conf.define("DEV").unwrap();
        let command = Listener::new(":80").command(Path::new("/usr/sbin/httpd"), &conf);
        let args: Vec<_> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-DFOREGROUND", "-f", "/etc/httpd.conf", "-D", "DEV"]);
    }
}
