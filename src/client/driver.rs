//! SQL Server driver.
//!
//! This module provides the `Driver` type, a [`Connector`] that opens
//! connections through the tiberius TDS client.

use crate::client::{ConnectionHandle, Connector};
use crate::descriptor::{ConnectionDescriptor, DescriptorFields};
use crate::error::{ConfigurationError, ConnectionError};
use std::time::Duration;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;

/// SQL Server error number for a rejected login.
const LOGIN_FAILED: u32 = 18456;

/// Upper bound for [`DriverOptions::connect_timeout`].
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Transport encryption requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encryption {
    /// Encrypt the whole session
    #[default]
    Required,
    /// Encrypt the login packet only
    Off,
    /// No encryption at all
    NotSupported,
}

impl From<Encryption> for EncryptionLevel {
    fn from(value: Encryption) -> Self {
        match value {
            Encryption::Required => EncryptionLevel::Required,
            Encryption::Off => EncryptionLevel::Off,
            Encryption::NotSupported => EncryptionLevel::NotSupported,
        }
    }
}

/// Transport settings that are not part of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Accept self-signed server certificates (default: true)
    pub trust_server_certificate: bool,

    /// Transport encryption (default: required)
    pub encryption: Encryption,

    /// Application name reported to the server
    pub application_name: String,

    /// TCP connect plus login timeout (default: 30s, max: 300s)
    pub connect_timeout: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            trust_server_certificate: true,
            encryption: Encryption::default(),
            application_name: "sqlcred-rs".to_string(),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Opens SQL Server connections from connection descriptors.
///
/// The `DRIVER` field of a descriptor names an ODBC driver and has no
/// meaning for the native TDS client; it is ignored.
///
/// # Example
///
/// ```no_run
/// use sqlcred_rs::client::{Connector, Driver};
/// use sqlcred_rs::descriptor::ConnectionDescriptor;
///
/// # fn example(descriptor: ConnectionDescriptor) -> Result<(), Box<dyn std::error::Error>> {
/// let driver = Driver::new();
/// let mut connection = driver.open(&descriptor)?;
/// let results = connection.query("SELECT 1 AS one")?;
/// connection.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Driver {
    name: String,
    version: String,
    options: DriverOptions,
}

impl Driver {
    /// Create a driver with default options.
    pub fn new() -> Self {
        Self {
            name: "sqlcred-rs".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            options: DriverOptions::default(),
        }
    }

    /// Create a driver with custom options.
    pub fn with_options(options: DriverOptions) -> Result<Self, ConfigurationError> {
        if options.connect_timeout.is_zero() || options.connect_timeout > MAX_CONNECT_TIMEOUT {
            return Err(ConfigurationError::InvalidParameter {
                parameter: "connect_timeout".to_string(),
                message: "Connection timeout must be between 1ms and 300 seconds".to_string(),
            });
        }

        Ok(Self {
            options,
            ..Self::new()
        })
    }

    /// Get the driver name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the driver version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the driver options.
    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Map descriptor fields onto a tiberius configuration.
    ///
    /// `SERVER` may use the ODBC forms `tcp:host` and `host,port`; a port
    /// given there takes precedence over `PORT`.
    pub fn config_for(&self, fields: &DescriptorFields) -> Config {
        let (host, port) = split_server(&fields.server, fields.port);

        let mut config = Config::new();
        config.host(host);
        config.port(port);
        config.database(&fields.database);
        config.authentication(AuthMethod::sql_server(&fields.uid, fields.pwd.expose()));
        config.application_name(&self.options.application_name);
        config.encryption(self.options.encryption.into());
        if self.options.trust_server_certificate {
            config.trust_cert();
        }
        config
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

impl Connector for Driver {
    type Handle = ConnectionHandle;

    fn open(&self, descriptor: &ConnectionDescriptor) -> Result<ConnectionHandle, ConnectionError> {
        let fields = descriptor.fields()?;
        let config = self.config_for(&fields);
        let (host, port) = split_server(&fields.server, fields.port);
        let host = host.to_string();
        let database = fields.database.clone();
        drop(fields);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(|e| ConnectionError::ConnectionFailed {
                host: host.clone(),
                port,
                message: format!("failed to start runtime: {}", e),
            })?;

        let timeout = self.options.connect_timeout;
        let connecting = async {
            match connect(config.clone()).await {
                Err(tiberius::error::Error::Routing { host, port }) => {
                    tracing::debug!(%host, port, "following server redirect");
                    let mut config = config;
                    config.host(host);
                    config.port(port);
                    connect(config).await
                }
                result => result,
            }
        };

        let client = runtime
            .block_on(async { tokio::time::timeout(timeout, connecting).await })
            .map_err(|_| ConnectionError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| connect_error(e, &host, port))?;

        tracing::info!(%host, port, %database, "connection opened");
        Ok(ConnectionHandle::new(runtime, client, host, port, database))
    }
}

async fn connect(
    config: Config,
) -> Result<Client<tokio_util::compat::Compat<TcpStream>>, tiberius::error::Error> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    Client::connect(config, tcp.compat_write()).await
}

fn connect_error(err: tiberius::error::Error, host: &str, port: u16) -> ConnectionError {
    match &err {
        tiberius::error::Error::Server(token) if token.code() == LOGIN_FAILED => {
            ConnectionError::AuthenticationFailed(token.message().to_string())
        }
        _ => ConnectionError::ConnectionFailed {
            host: host.to_string(),
            port,
            message: err.to_string(),
        },
    }
}

/// Split an ODBC `SERVER` value into host and port.
fn split_server(server: &str, default_port: u16) -> (&str, u16) {
    let server = server.strip_prefix("tcp:").unwrap_or(server);
    match server.rsplit_once(',') {
        Some((host, port)) => match port.trim().parse() {
            Ok(port) => (host, port),
            Err(_) => (server, default_port),
        },
        None => (server, default_port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionParameters, Credentials};

    fn descriptor(host: &str, port: u16) -> ConnectionDescriptor {
        let params = ConnectionParameters::builder()
            .driver("{ODBC Driver 17 for SQL Server}")
            .host(host)
            .port(port)
            .database("nb-database")
            .build()
            .unwrap();
        ConnectionDescriptor::build(&params, Credentials::new("nb-user", "nb-password"))
    }

    #[test]
    fn test_driver_creation() {
        let driver = Driver::new();
        assert_eq!(driver.name(), "sqlcred-rs");
        assert!(!driver.version().is_empty());
        assert!(driver.options().trust_server_certificate);
        assert!(driver.to_string().starts_with("sqlcred-rs v"));
    }

    #[test]
    fn test_driver_options_validation() {
        let options = DriverOptions {
            connect_timeout: Duration::from_secs(400),
            ..Default::default()
        };
        assert!(Driver::with_options(options).is_err());

        let options = DriverOptions {
            connect_timeout: Duration::from_secs(5),
            encryption: Encryption::Off,
            ..Default::default()
        };
        let driver = Driver::with_options(options).unwrap();
        assert_eq!(driver.options().encryption, Encryption::Off);
    }

    #[test]
    fn test_config_for_maps_fields() {
        let driver = Driver::new();
        let fields = descriptor("db.example.com", 14330).fields().unwrap();

        let config = driver.config_for(&fields);
        assert_eq!(config.get_addr(), "db.example.com:14330");
    }

    #[test]
    fn test_split_server() {
        assert_eq!(split_server("localhost", 1433), ("localhost", 1433));
        assert_eq!(split_server("tcp:localhost,14330", 1433), ("localhost", 14330));
        assert_eq!(split_server("localhost,abc", 1433), ("localhost,abc", 1433));
    }

    #[test]
    fn test_open_invalid_descriptor() {
        let driver = Driver::new();
        let err = driver
            .open(&ConnectionDescriptor::from_encoded("SERVER%3Dlocalhost%3B"))
            .unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_open_unreachable_server() {
        let options = DriverOptions {
            connect_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let driver = Driver::with_options(options).unwrap();

        // Port 1 on loopback refuses connections.
        let err = driver.open(&descriptor("127.0.0.1", 1)).unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::ConnectionFailed { port: 1, .. } | ConnectionError::Timeout { .. }
        ));
        assert!(!err.to_string().contains("nb-password"));
    }
}
