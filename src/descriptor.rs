//! Connection descriptor construction.
//!
//! A descriptor is an ODBC connection string
//! (`DRIVER={...};SERVER=...;PORT=...;DATABASE=...;UID=...;PWD=...;`)
//! percent-encoded as a single URI query value. Space is encoded as `+`,
//! the unreserved characters `A-Z a-z 0-9 - _ . ~` are kept and every other
//! byte becomes an uppercase `%XX` escape.
//!
//! # Example
//!
//! ```
//! # use sqlcred_rs::connection::{ConnectionParameters, Credentials};
//! # use sqlcred_rs::descriptor::ConnectionDescriptor;
//! let params = ConnectionParameters::builder()
//!     .driver("{ODBC Driver 13 for SQL Server}")
//!     .host("localhost")
//!     .port(1433)
//!     .database("nb-database")
//!     .build()?;
//! let creds = Credentials::new("nb-user", "nb-password");
//!
//! let descriptor = ConnectionDescriptor::build(&params, creds);
//! assert!(descriptor.expose().starts_with("DRIVER%3D%7BODBC+Driver+13"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::connection::auth::{Credentials, SecretString};
use crate::connection::params::{ConnectionParameters, DEFAULT_PORT};
use crate::error::ConnectionError;
use std::fmt;
use zeroize::Zeroizing;

/// Percent-encoded connection string.
///
/// Holds the password in encoded form, so `Debug` and `Display` never show
/// the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor(SecretString);

impl ConnectionDescriptor {
    /// Merge parameters and credentials into a descriptor.
    ///
    /// Fields are written in the order `DRIVER`, `SERVER`, `PORT`,
    /// `DATABASE`, `UID`, `PWD`. Values are not quoted: a value containing
    /// `;` or `=` is passed through unchanged and will not survive
    /// [`fields`](Self::fields). The credentials are consumed and scrubbed
    /// before this returns.
    pub fn build(params: &ConnectionParameters, creds: Credentials) -> Self {
        let port = params.port.to_string();
        let fields: [(&str, &str); 6] = [
            ("DRIVER", params.driver.as_str()),
            ("SERVER", params.host.as_str()),
            ("PORT", port.as_str()),
            ("DATABASE", params.database.as_str()),
            ("UID", creds.username()),
            ("PWD", creds.password().expose()),
        ];

        let mut raw = Zeroizing::new(String::new());
        for (key, value) in fields {
            if value.contains([';', '=']) {
                tracing::warn!(field = key, "connection field contains a ';' or '=' delimiter");
            }
            raw.push_str(key);
            raw.push('=');
            raw.push_str(value);
            raw.push(';');
        }

        Self(SecretString::new(encode_query_value(&raw)))
    }

    /// Wrap an already encoded descriptor.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(SecretString::new(encoded))
    }

    /// Provide read-only access to the encoded descriptor.
    ///
    /// Callers must not log, store, or otherwise persist the returned slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose()
    }

    /// Decode back to the raw `KEY=value;` connection string.
    pub fn decode(&self) -> Result<SecretString, ConnectionError> {
        decode_query_value(self.expose()).map(SecretString::new)
    }

    /// Decode and split into typed fields.
    pub fn fields(&self) -> Result<DescriptorFields, ConnectionError> {
        let raw = self.decode()?;
        DescriptorFields::parse(raw.expose())
    }

    /// Render `<scheme>:///?odbc_connect=<descriptor>`.
    pub fn odbc_connect_uri(&self, scheme: &str) -> SecretString {
        SecretString::new(format!("{}:///?odbc_connect={}", scheme, self.expose()))
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConnectionDescriptor([REDACTED])")
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Fields recovered from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFields {
    pub driver: Option<String>,
    pub server: String,
    pub port: u16,
    pub database: String,
    pub uid: String,
    pub pwd: SecretString,
}

impl DescriptorFields {
    /// Parse a raw `KEY=value;` connection string. Keys are case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, ConnectionError> {
        let mut driver = None;
        let mut server = None;
        let mut port = None;
        let mut database = None;
        let mut uid = None;
        let mut pwd = None;

        for pair in raw.split(';') {
            if pair.trim().is_empty() {
                continue;
            }

            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ConnectionError::InvalidDescriptor("field without '=' separator".to_string())
            })?;

            match key.trim().to_ascii_uppercase().as_str() {
                "DRIVER" => driver = Some(value.to_string()),
                "SERVER" => server = Some(value.to_string()),
                "PORT" => {
                    port = Some(value.trim().parse::<u16>().map_err(|_| {
                        ConnectionError::InvalidDescriptor(format!("invalid PORT: {}", value))
                    })?)
                }
                "DATABASE" => database = Some(value.to_string()),
                "UID" => uid = Some(value.to_string()),
                "PWD" => pwd = Some(SecretString::new(value)),
                other => tracing::debug!(key = other, "ignoring unknown descriptor field"),
            }
        }

        let missing = |key: &str| ConnectionError::InvalidDescriptor(format!("missing {}", key));

        Ok(Self {
            driver,
            server: server.ok_or_else(|| missing("SERVER"))?,
            port: port.unwrap_or(DEFAULT_PORT),
            database: database.ok_or_else(|| missing("DATABASE"))?,
            uid: uid.ok_or_else(|| missing("UID"))?,
            pwd: pwd.ok_or_else(|| missing("PWD"))?,
        })
    }
}

/// Percent-encode a string as a URI query value, space as `+`.
fn encode_query_value(raw: &str) -> String {
    let encoded = Zeroizing::new(urlencoding::encode(raw).into_owned());
    encoded.replace("%20", "+")
}

/// Reverse of [`encode_query_value`].
fn decode_query_value(encoded: &str) -> Result<String, ConnectionError> {
    let spaced = Zeroizing::new(encoded.replace('+', " "));
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ConnectionError::InvalidDescriptor("not valid UTF-8 after decoding".to_string()))
}
