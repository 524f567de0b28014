//! Resolver configuration.
//!
//! A JSON document naming the connection parameters and the credential
//! strategy:
//!
//! ```json
//! {
//!   "parameters": { "server": "localhost", "port": 1433, "database": "nb-database" },
//!   "credentials": { "strategy": "environment" }
//! }
//! ```
//!
//! `parameters` may instead point at a parameter file with
//! `{ "file": "connection.json" }`. Relative paths are resolved against the
//! directory of the configuration file.

use crate::connection::{ConnectionParameters, ParameterSettings};
use crate::error::ConfigurationError;
use crate::provider::env::{DEFAULT_PASSWORD_VAR, DEFAULT_USERNAME_VAR};
use crate::provider::{
    CredentialProvider, EnvCredentialProvider, FileCredentialProvider,
    InteractiveCredentialProvider,
};
use crate::resolver::CredentialResolver;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    pub parameters: ParameterSource,
    pub credentials: CredentialStrategy,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Where the connection parameters come from.
///
/// An object with a `file` key names a parameter file; any other object is
/// read as inline settings.
#[derive(Debug, Clone)]
pub enum ParameterSource {
    File(ParameterFile),
    Inline(ParameterSettings),
}

/// Reference to a parameter file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterFile {
    pub file: PathBuf,
}

impl<'de> Deserialize<'de> for ParameterSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::Object(Map::deserialize(deserializer)?);
        let source = if value.get("file").is_some() {
            ParameterFile::deserialize(value).map(ParameterSource::File)
        } else {
            ParameterSettings::deserialize(value).map(ParameterSource::Inline)
        };
        source.map_err(de::Error::custom)
    }
}

/// Parse `contents` as a JSON object into `T`.
///
/// Derived struct deserializers also accept arrays by position; anything but
/// an object is rejected here.
pub(crate) fn parse_object<T: DeserializeOwned>(
    path: &Path,
    contents: &str,
) -> Result<T, ConfigurationError> {
    let value: Value =
        serde_json::from_str(contents).map_err(|e| ConfigurationError::from_json(path, e))?;
    if !value.is_object() {
        return Err(ConfigurationError::Malformed {
            path: path.to_path_buf(),
            message: "expected a JSON object".to_string(),
        });
    }
    T::deserialize(value).map_err(|e| ConfigurationError::from_json(path, e))
}

/// Which credential provider to build. The literal strategy is only
/// available in code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case", deny_unknown_fields)]
pub enum CredentialStrategy {
    File {
        path: PathBuf,
    },
    Interactive,
    Environment {
        #[serde(default = "default_username_var")]
        username_var: String,
        #[serde(default = "default_password_var")]
        password_var: String,
    },
}

fn default_username_var() -> String {
    DEFAULT_USERNAME_VAR.to_string()
}

fn default_password_var() -> String {
    DEFAULT_PASSWORD_VAR.to_string()
}

impl ResolverConfig {
    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::from_io(path, e))?;
        let mut config: Self = parse_object(path, &contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        tracing::debug!(path = %path.display(), "loaded resolver configuration");
        Ok(config)
    }

    /// Parse a configuration document. Relative paths stay relative to the
    /// working directory.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        parse_object(Path::new("<inline>"), json)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load or validate the connection parameters.
    pub fn parameters(&self) -> Result<ConnectionParameters, ConfigurationError> {
        match &self.parameters {
            ParameterSource::File(source) => {
                ConnectionParameters::from_file(self.resolve_path(&source.file))
            }
            ParameterSource::Inline(settings) => settings.clone().into_parameters(),
        }
    }

    /// Build the configured credential provider.
    pub fn provider(&self) -> Box<dyn CredentialProvider> {
        match &self.credentials {
            CredentialStrategy::File { path } => {
                Box::new(FileCredentialProvider::new(self.resolve_path(path)))
            }
            CredentialStrategy::Interactive => Box::new(InteractiveCredentialProvider::terminal()),
            CredentialStrategy::Environment {
                username_var,
                password_var,
            } => Box::new(EnvCredentialProvider::new(username_var, password_var)),
        }
    }

    /// Build a resolver from this configuration.
    pub fn into_resolver(self) -> Result<CredentialResolver, ConfigurationError> {
        let params = self.parameters()?;
        Ok(CredentialResolver::new(params, self.provider()))
    }
}
