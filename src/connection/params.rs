//! Connection parameter parsing and validation.
//!
//! This module handles the non-secret half of a connection: driver, host,
//! port and database. Parameters come from a builder, an `mssql://` URL, or a
//! JSON parameter file.

use crate::error::ConfigurationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Default ODBC driver name, braces included.
pub const DEFAULT_DRIVER: &str = "{ODBC Driver 17 for SQL Server}";

/// Non-secret connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// ODBC driver name, e.g. `{ODBC Driver 17 for SQL Server}`
    pub driver: String,

    /// Database host address
    pub host: String,

    /// Database port (default: 1433)
    pub port: u16,

    /// Database name
    pub database: String,
}

impl ConnectionParameters {
    /// Create a new ConnectionParametersBuilder.
    pub fn builder() -> ConnectionParametersBuilder {
        ConnectionParametersBuilder::new()
    }

    /// Load parameters from a JSON parameter file.
    ///
    /// The file holds an object with keys `driver`, `server`, `port` and
    /// `database`. `driver` and `port` are optional; any other key (such as
    /// `user` or `passwd`) is ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::from_io(path, e))?;
        let settings: ParameterSettings = crate::config::parse_object(path, &contents)?;

        for (field, present) in [
            ("server", settings.server.is_some()),
            ("database", settings.database.is_some()),
        ] {
            if !present {
                return Err(ConfigurationError::MissingField {
                    path: path.to_path_buf(),
                    field: field.to_string(),
                });
            }
        }

        tracing::debug!(path = %path.display(), "loaded connection parameters from file");
        settings.into_parameters()
    }
}

impl FromStr for ConnectionParameters {
    type Err = ConfigurationError;

    /// Parse a connection URL in the format:
    /// `mssql://host[:port]/database[?driver=...]`
    ///
    /// The `sqlserver://` scheme is accepted as well. Credentials are never
    /// part of the URL.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sqlcred_rs::connection::ConnectionParameters;
    /// # use std::str::FromStr;
    /// let params = ConnectionParameters::from_str("mssql://localhost:1433/nb-database")?;
    /// assert_eq!(params.database, "nb-database");
    ///
    /// let params = ConnectionParameters::from_str(
    ///     "mssql://db.example.com/sales?driver=%7BODBC%20Driver%2018%20for%20SQL%20Server%7D",
    /// )?;
    /// assert_eq!(params.driver, "{ODBC Driver 18 for SQL Server}");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = s.trim();

        let rest = url
            .strip_prefix("mssql://")
            .or_else(|| url.strip_prefix("sqlserver://"))
            .ok_or_else(|| {
                ConfigurationError::ParseError(
                    "Connection URL must start with 'mssql://' or 'sqlserver://'".to_string(),
                )
            })?;

        let (main_part, query_string) = match rest.split_once('?') {
            Some((main, query)) => (main, Some(query)),
            None => (rest, None),
        };

        if main_part.contains('@') {
            return Err(ConfigurationError::ParseError(
                "Credentials must not be embedded in the connection URL".to_string(),
            ));
        }

        let params = parse_query_params(query_string)?;

        let (host_port, database) = match main_part.split_once('/') {
            Some((host, database)) => (host, database),
            None => (main_part, ""),
        };

        let database = urlencoding::decode(database)
            .map_err(|e| ConfigurationError::ParseError(format!("Failed to decode database: {}", e)))?
            .into_owned();

        let (host, port) = parse_host_port(host_port)?;

        let builder = ConnectionParametersBuilder::new()
            .host(&host)
            .port(port)
            .database(&database);

        apply_query_params(builder, params)?.build()
    }
}

impl fmt::Display for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mssql://{}:{}/{} ({})",
            self.host, self.port, self.database, self.driver
        )
    }
}

/// Builder for constructing ConnectionParameters with validation.
#[derive(Debug, Clone, Default)]
pub struct ConnectionParametersBuilder {
    driver: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
}

impl ConnectionParametersBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ODBC driver name.
    pub fn driver(mut self, driver: &str) -> Self {
        self.driver = Some(driver.to_string());
        self
    }

    /// Set the database host.
    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Set the database port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Build the ConnectionParameters with validation.
    pub fn build(self) -> Result<ConnectionParameters, ConfigurationError> {
        let host = required("host", self.host)?;
        let database = required("database", self.database)?;

        let driver = self.driver.unwrap_or_else(|| DEFAULT_DRIVER.to_string());
        if driver.is_empty() {
            return Err(ConfigurationError::InvalidParameter {
                parameter: "driver".to_string(),
                message: "Driver cannot be empty".to_string(),
            });
        }

        let port = self.port.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(ConfigurationError::InvalidParameter {
                parameter: "port".to_string(),
                message: "Port must be greater than 0".to_string(),
            });
        }

        Ok(ConnectionParameters {
            driver,
            host,
            port,
            database,
        })
    }
}

fn required(parameter: &str, value: Option<String>) -> Result<String, ConfigurationError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(ConfigurationError::InvalidParameter {
            parameter: parameter.to_string(),
            message: format!("{} cannot be empty", capitalize(parameter)),
        }),
        None => Err(ConfigurationError::InvalidParameter {
            parameter: parameter.to_string(),
            message: format!("{} is required", capitalize(parameter)),
        }),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Serialized form of connection parameters, shared by parameter files and
/// inline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterSettings {
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub port: Option<PortValue>,
    #[serde(default)]
    pub database: Option<String>,
}

impl ParameterSettings {
    /// Validate and convert into ConnectionParameters.
    pub fn into_parameters(self) -> Result<ConnectionParameters, ConfigurationError> {
        let mut builder = ConnectionParametersBuilder::new();
        if let Some(driver) = &self.driver {
            builder = builder.driver(driver);
        }
        if let Some(server) = &self.server {
            builder = builder.host(server);
        }
        if let Some(port) = &self.port {
            builder = builder.port(port.to_port()?);
        }
        if let Some(database) = &self.database {
            builder = builder.database(database);
        }
        builder.build()
    }
}

/// A port given either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

impl PortValue {
    fn to_port(&self) -> Result<u16, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidParameter {
            parameter: "port".to_string(),
            message: format!("Invalid port: {}", self),
        };
        match self {
            PortValue::Number(n) => u16::try_from(*n).map_err(|_| invalid()),
            PortValue::Text(s) => s.trim().parse().map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortValue::Number(n) => write!(f, "{}", n),
            PortValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parse query parameters from URL query string.
fn parse_query_params(query: Option<&str>) -> Result<HashMap<String, String>, ConfigurationError> {
    let mut params = HashMap::new();

    if let Some(query) = query {
        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ConfigurationError::ParseError(format!("Invalid query parameter format: {}", pair))
            })?;

            let key = urlencoding::decode(key)
                .map_err(|e| ConfigurationError::ParseError(format!("Failed to decode key: {}", e)))?
                .into_owned();
            let value = urlencoding::decode(value)
                .map_err(|e| {
                    ConfigurationError::ParseError(format!("Failed to decode value: {}", e))
                })?
                .into_owned();

            params.insert(key, value);
        }
    }

    Ok(params)
}

/// Parse host and port.
fn parse_host_port(host_port: &str) -> Result<(String, u16), ConfigurationError> {
    // IPv6 address format [host]:port
    if host_port.starts_with('[') {
        if let Some(close_bracket) = host_port.find(']') {
            let host = host_port[1..close_bracket].to_string();
            let port_part = &host_port[close_bracket + 1..];

            let port = match port_part.strip_prefix(':') {
                Some(stripped) => stripped.parse().map_err(|_| {
                    ConfigurationError::ParseError(format!("Invalid port: {}", port_part))
                })?,
                None => DEFAULT_PORT,
            };

            return Ok((host, port));
        }
    }

    match host_port.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str.parse().map_err(|_| {
                ConfigurationError::ParseError(format!("Invalid port: {}", port_str))
            })?;
            Ok((host.to_string(), port))
        }
        None => Ok((host_port.to_string(), DEFAULT_PORT)),
    }
}

/// Apply query parameters to builder.
fn apply_query_params(
    mut builder: ConnectionParametersBuilder,
    params: HashMap<String, String>,
) -> Result<ConnectionParametersBuilder, ConfigurationError> {
    for (key, value) in params {
        match key.as_str() {
            "driver" => builder = builder.driver(&value),
            "database" => builder = builder.database(&value),
            _ => {
                return Err(ConfigurationError::InvalidParameter {
                    parameter: key,
                    message: "Unknown connection parameter".to_string(),
                });
            }
        }
    }

    Ok(builder)
}
