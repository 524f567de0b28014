//! Open SQL Server connections.

use crate::client::results::ResultSet;
use crate::error::{ConnectionError, QueryError};
use tiberius::Client;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::Compat;

/// An open connection owned by the caller.
///
/// Every call blocks the current thread; the connection drives its own
/// single-threaded runtime and must not be used from inside another tokio
/// runtime.
pub struct ConnectionHandle {
    runtime: Runtime,
    client: Option<Client<Compat<TcpStream>>>,
    host: String,
    port: u16,
    database: String,
}

impl ConnectionHandle {
    pub(crate) fn new(
        runtime: Runtime,
        client: Client<Compat<TcpStream>>,
        host: String,
        port: u16,
        database: String,
    ) -> Self {
        Self {
            runtime,
            client: Some(client),
            host,
            port,
            database,
        }
    }

    /// Get the server host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the server port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Check whether the connection has not been closed.
    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Run `sql` and return the last result set it produced.
    pub fn query(&mut self, sql: &str) -> Result<ResultSet, QueryError> {
        let client = self.client.as_mut().ok_or(QueryError::ConnectionClosed)?;

        let mut results = self
            .runtime
            .block_on(async { client.simple_query(sql).await?.into_results().await })?;

        match results.pop() {
            Some(rows) => Ok(ResultSet::from_rows(rows)?),
            None => Ok(ResultSet::default()),
        }
    }

    /// Run `sql` and return the number of affected rows.
    pub fn execute(&mut self, sql: &str) -> Result<u64, QueryError> {
        let client = self.client.as_mut().ok_or(QueryError::ConnectionClosed)?;

        let result = self
            .runtime
            .block_on(async { client.execute(sql, &[]).await })?;
        Ok(result.total())
    }

    /// Close the connection.
    pub fn close(mut self) -> Result<(), ConnectionError> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };

        self.runtime
            .block_on(client.close())
            .map_err(|e| ConnectionError::ConnectionFailed {
                host: self.host.clone(),
                port: self.port,
                message: format!("failed to close connection: {}", e),
            })?;

        tracing::info!(host = %self.host, port = self.port, "connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("open", &self.is_open())
            .finish()
    }
}
