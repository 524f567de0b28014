//! # sqlcred-rs
//!
//! Credential resolution and ODBC connection strings for SQL Server sessions.
//!
//! Connection parameters (driver, host, port, database) and credentials
//! (username, password) are resolved separately, merged into a percent-encoded
//! connection descriptor and handed to a [`Connector`](client::Connector) that
//! opens the connection. Credentials come from one of four strategies: a
//! literal pair, a credential file, an interactive prompt or the process
//! environment.
//!
//! ## Example
//!
//! ```no_run
//! # use sqlcred_rs::*;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParameters::from_file("connection.json")?;
//! let resolver = CredentialResolver::new(params, Box::new(EnvCredentialProvider::default()));
//!
//! // Resolve credentials, build the descriptor and connect
//! let mut connection = resolver.connect(&Driver::new())?;
//!
//! let results = connection.query("SELECT name FROM sys.databases")?;
//! for row in results.rows() {
//!     println!("{:?}", row);
//! }
//!
//! connection.close()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod provider;
pub mod resolver;

// Re-export public API
pub use client::{ConnectionHandle, Connector, Driver, DriverOptions, ResultSet, SqlValue};
pub use config::{CredentialStrategy, ResolverConfig};
pub use connection::{ConnectionParameters, Credentials, SecretString};
pub use descriptor::ConnectionDescriptor;
pub use error::{ConfigurationError, ConnectionError, InputError, QueryError, SqlCredError};
pub use provider::{
    CredentialProvider, EnvCredentialProvider, FileCredentialProvider,
    InteractiveCredentialProvider, LiteralCredentialProvider,
};
pub use resolver::CredentialResolver;
