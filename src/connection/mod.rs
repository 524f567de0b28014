//! Connection parameters and credentials.
//!
//! This module provides the two halves a connection descriptor is built from:
//! non-secret [`ConnectionParameters`] and secret [`Credentials`].
//!
//! # Example
//!
//! ```
//! # use sqlcred_rs::connection::{ConnectionParameters, Credentials};
//! # use std::str::FromStr;
//! // Using the builder
//! let params = ConnectionParameters::builder()
//!     .host("localhost")
//!     .port(1433)
//!     .database("nb-database")
//!     .build()?;
//!
//! // Or parse from a connection URL
//! let params = ConnectionParameters::from_str("mssql://localhost:1433/nb-database")?;
//!
//! let creds = Credentials::new("nb-user", "nb-password");
//! assert_eq!(format!("{}", creds.password()), "[REDACTED]");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod params;

pub use auth::{Credentials, SecretString};
pub use params::{ConnectionParameters, ConnectionParametersBuilder, ParameterSettings, PortValue};
