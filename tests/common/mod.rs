//! Common test utilities for sqlcred-rs integration tests.
//!
//! # Integration Test Prerequisites
//!
//! Live tests require a running SQL Server instance, e.g.:
//!
//! ```bash
//! docker run -d --name mssql-test \
//!   -e ACCEPT_EULA=Y -e MSSQL_SA_PASSWORD='Sqlcred-Test-1' \
//!   -p 1433:1433 \
//!   mcr.microsoft.com/mssql/server:2022-latest
//! ```
//!
//! # Configuration
//!
//! | Default Constant   | Environment Variable | Default Value    |
//! |--------------------|----------------------|------------------|
//! | `DEFAULT_HOST`     | `MSSQL_HOST`         | "localhost"      |
//! | `DEFAULT_PORT`     | `MSSQL_PORT`         | 1433             |
//! | `DEFAULT_DATABASE` | `MSSQL_DATABASE`     | "master"         |
//! | `DEFAULT_USER`     | `MSSQL_USER`         | "sa"             |
//! | `DEFAULT_PASSWORD` | `MSSQL_PASSWORD`     | "Sqlcred-Test-1" |
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration_tests -- --ignored
//! MSSQL_HOST=myhost MSSQL_PORT=14330 cargo test --test integration_tests -- --ignored
//! ```

#![allow(dead_code)]

use sqlcred_rs::{ConnectionParameters, LiteralCredentialProvider, CredentialResolver};
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

// ============================================================================
// Connection Constants with Default Values
// ============================================================================

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_DATABASE: &str = "master";
pub const DEFAULT_USER: &str = "sa";
pub const DEFAULT_PASSWORD: &str = "Sqlcred-Test-1";

const ENV_MSSQL_HOST: &str = "MSSQL_HOST";
const ENV_MSSQL_PORT: &str = "MSSQL_PORT";
const ENV_MSSQL_DATABASE: &str = "MSSQL_DATABASE";
const ENV_MSSQL_USER: &str = "MSSQL_USER";
const ENV_MSSQL_PASSWORD: &str = "MSSQL_PASSWORD";

// ============================================================================
// Configuration Helpers
// ============================================================================

pub fn get_host() -> String {
    env::var(ENV_MSSQL_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string())
}

/// Falls back to the default when `MSSQL_PORT` is unset or not a port number.
pub fn get_port() -> u16 {
    env::var(ENV_MSSQL_PORT)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn get_database() -> String {
    env::var(ENV_MSSQL_DATABASE).unwrap_or_else(|_| DEFAULT_DATABASE.to_string())
}

pub fn get_user() -> String {
    env::var(ENV_MSSQL_USER).unwrap_or_else(|_| DEFAULT_USER.to_string())
}

pub fn get_password() -> String {
    env::var(ENV_MSSQL_PASSWORD).unwrap_or_else(|_| DEFAULT_PASSWORD.to_string())
}

pub fn get_test_parameters() -> ConnectionParameters {
    ConnectionParameters::builder()
        .host(&get_host())
        .port(get_port())
        .database(&get_database())
        .build()
        .expect("test parameters are valid")
}

/// Resolver with the configured test credentials.
pub fn get_test_resolver() -> CredentialResolver {
    CredentialResolver::new(
        get_test_parameters(),
        Box::new(LiteralCredentialProvider::new(get_user(), get_password())),
    )
}

// ============================================================================
// Server Availability Check
// ============================================================================

/// TCP reachability only; does not verify login.
pub fn is_mssql_available() -> bool {
    let addr = format!("{}:{}", get_host(), get_port());

    let socket_addrs: Vec<_> = match addr.to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(_) => return false,
    };

    socket_addrs
        .iter()
        .any(|socket_addr| TcpStream::connect_timeout(socket_addr, Duration::from_secs(2)).is_ok())
}

#[macro_export]
macro_rules! skip_if_no_mssql {
    () => {
        if !$crate::common::is_mssql_available() {
            eprintln!(
                "Skipping test: SQL Server not available at {}:{}",
                $crate::common::get_host(),
                $crate::common::get_port()
            );
            return;
        }
    };
}

/// Unique table name for tests that create objects.
pub fn generate_test_table_name() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis();

    format!("sqlcred_test_{}", timestamp)
}
