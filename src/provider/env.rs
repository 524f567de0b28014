use crate::connection::Credentials;
use crate::error::{ConfigurationError, SqlCredError};
use crate::provider::CredentialProvider;
use std::env::{self, VarError};
use zeroize::Zeroizing;

/// Default variable holding the username.
pub const DEFAULT_USERNAME_VAR: &str = "username";

/// Default variable holding the password.
pub const DEFAULT_PASSWORD_VAR: &str = "password";

/// Reads credentials from two process environment variables.
///
/// The variable names are chosen by the caller; nothing about their
/// presence is checked until [`resolve`](CredentialProvider::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvCredentialProvider {
    username_var: String,
    password_var: String,
}

impl EnvCredentialProvider {
    /// Create a provider reading the two named variables.
    pub fn new(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    /// Name of the username variable.
    pub fn username_var(&self) -> &str {
        &self.username_var
    }

    /// Name of the password variable.
    pub fn password_var(&self) -> &str {
        &self.password_var
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME_VAR, DEFAULT_PASSWORD_VAR)
    }
}

fn read_var(name: &str) -> Result<String, ConfigurationError> {
    env::var(name).map_err(|e| match e {
        VarError::NotPresent => ConfigurationError::MissingVariable {
            name: name.to_string(),
        },
        VarError::NotUnicode(_) => ConfigurationError::NotUnicode {
            name: name.to_string(),
        },
    })
}

impl CredentialProvider for EnvCredentialProvider {
    fn resolve(&self) -> Result<Credentials, SqlCredError> {
        let username = read_var(&self.username_var)?;
        let password = Zeroizing::new(read_var(&self.password_var)?);

        tracing::debug!(
            strategy = self.strategy(),
            username_var = %self.username_var,
            password_var = %self.password_var,
            "resolved credentials"
        );
        Ok(Credentials::new(username, password.as_str()))
    }

    fn strategy(&self) -> &'static str {
        "environment"
    }
}
