//! Basic usage example for sqlcred-rs.
//!
//! Reads connection parameters from `connection.json` and credentials from
//! the strategy given as the first argument, then runs a query.
//!
//! ```bash
//! username=nb-user password=nb-password cargo run --example basic_usage -- environment
//! cargo run --example basic_usage -- interactive
//! cargo run --example basic_usage -- file
//! RUST_LOG=sqlcred_rs=debug cargo run --example basic_usage -- environment
//! ```

use sqlcred_rs::{
    ConnectionHandle, ConnectionParameters, CredentialProvider, CredentialResolver, Driver,
    EnvCredentialProvider, FileCredentialProvider, InteractiveCredentialProvider,
};
use std::error::Error;
use tracing_subscriber::EnvFilter;

const PARAMETER_FILE: &str = "connection.json";

fn provider_for(strategy: &str) -> Result<Box<dyn CredentialProvider>, Box<dyn Error>> {
    match strategy {
        "environment" => Ok(Box::new(EnvCredentialProvider::default())),
        "interactive" => Ok(Box::new(InteractiveCredentialProvider::terminal())),
        "file" => Ok(Box::new(FileCredentialProvider::new(PARAMETER_FILE))),
        other => Err(format!("unknown strategy '{}'", other).into()),
    }
}

/// Lists the databases visible to the login.
fn example_list_databases(conn: &mut ConnectionHandle) -> Result<usize, Box<dyn Error>> {
    let results = conn.query("SELECT name FROM sys.databases ORDER BY name")?;
    for row in results.rows() {
        println!("  {:?}", row[0]);
    }
    Ok(results.len())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let strategy = std::env::args().nth(1).unwrap_or_else(|| "environment".to_string());

    let params = ConnectionParameters::from_file(PARAMETER_FILE)?;
    println!("Connecting to {}", params);

    let resolver = CredentialResolver::new(params, provider_for(&strategy)?);
    let mut connection = resolver.connect(&Driver::new())?;

    let count = example_list_databases(&mut connection)?;
    println!("{} databases", count);

    connection.close()?;
    Ok(())
}
