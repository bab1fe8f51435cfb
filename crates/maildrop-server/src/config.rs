//! Server configuration.
//!
//! The listening port comes from a `port.info` file beside the binary — a
//! single line holding the port number. The host and the per-connection
//! read timeout have defaults and are overridden programmatically.

use std::{fs, io, path::Path, time::Duration};

use thiserror::Error;

/// Default file the port is read from
pub const PORT_FILE: &str = "port.info";

/// Errors loading the server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The port file could not be read
    #[error("unable to read port file {path:?}: {source}")]
    PortFileUnreadable {
        /// Path that was attempted
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The port file contents are not a valid TCP port
    #[error("invalid port in {path:?}: {contents:?}")]
    InvalidPort {
        /// Path that was read
        path: String,
        /// Offending file contents
        contents: String,
    },
}

/// Configuration for one server instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind (defaults to loopback)
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
    /// Per-connection timeout applied to each read and to the response
    /// write; bounds how long an idle or trickling peer can pin a task
    pub read_timeout: Duration,
}

impl ServerConfig {
    /// Default per-connection read timeout (30 seconds)
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration for the given port with default host and
    /// timeout.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
        }
    }

    /// Load the port from a port file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, or does
    /// not contain a single valid port number.
    pub fn from_port_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|source| {
            ConfigError::PortFileUnreadable { path: display.clone(), source }
        })?;

        let port = contents.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
            path: display,
            contents: contents.trim().to_string(),
        })?;

        Ok(Self::new(port))
    }

    /// The `host:port` string to bind
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
