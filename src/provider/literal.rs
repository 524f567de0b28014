use crate::connection::Credentials;
use crate::error::SqlCredError;
use crate::provider::CredentialProvider;

/// Returns a fixed username/password pair.
///
/// Only suitable for local, disposable databases: the password lives in
/// the program that constructs the provider.
#[derive(Debug, Clone)]
pub struct LiteralCredentialProvider {
    credentials: Credentials,
}

impl LiteralCredentialProvider {
    /// Create a provider that always returns this pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(username, password),
        }
    }
}

impl CredentialProvider for LiteralCredentialProvider {
    fn resolve(&self) -> Result<Credentials, SqlCredError> {
        tracing::debug!(strategy = self.strategy(), "resolved credentials");
        Ok(self.credentials.clone())
    }

    fn strategy(&self) -> &'static str {
        "literal"
    }
}
