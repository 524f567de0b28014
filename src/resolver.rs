//! Session orchestration.
//!
//! A [`CredentialResolver`] ties one set of connection parameters to one
//! credential provider: resolve credentials, build the descriptor, open the
//! connection. Credentials are consumed by the descriptor builder and the
//! descriptor is dropped as soon as the connector returns.

use crate::client::Connector;
use crate::connection::ConnectionParameters;
use crate::descriptor::ConnectionDescriptor;
use crate::error::SqlCredError;
use crate::provider::CredentialProvider;

/// Resolves credentials and opens connections for one set of parameters.
pub struct CredentialResolver {
    params: ConnectionParameters,
    provider: Box<dyn CredentialProvider>,
}

impl CredentialResolver {
    /// Create a resolver for `params` using `provider`.
    pub fn new(params: ConnectionParameters, provider: Box<dyn CredentialProvider>) -> Self {
        Self { params, provider }
    }

    /// Get the connection parameters.
    pub fn params(&self) -> &ConnectionParameters {
        &self.params
    }

    /// Name of the configured credential strategy.
    pub fn strategy(&self) -> &'static str {
        self.provider.strategy()
    }

    /// Resolve credentials and build the connection descriptor.
    pub fn descriptor(&self) -> Result<ConnectionDescriptor, SqlCredError> {
        let credentials = self.provider.resolve()?;
        Ok(ConnectionDescriptor::build(&self.params, credentials))
    }

    /// Resolve credentials and open a connection through `connector`.
    pub fn connect<C: Connector>(&self, connector: &C) -> Result<C::Handle, SqlCredError> {
        tracing::debug!(
            strategy = self.strategy(),
            host = %self.params.host,
            port = self.params.port,
            database = %self.params.database,
            "opening connection"
        );

        let descriptor = self.descriptor()?;
        let handle = connector.open(&descriptor);
        drop(descriptor);
        Ok(handle?)
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("params", &self.params)
            .field("strategy", &self.strategy())
            .finish()
    }
}
