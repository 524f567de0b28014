//! File-backed credentials.
//!
//! The credential file is a JSON object:
//!
//! ```json
//! { "driver": "{ODBC Driver 13 for SQL Server}", "server": "localhost",
//!   "port": 1433, "database": "nb-database",
//!   "user": "nb-user", "passwd": "nb-password" }
//! ```
//!
//! Only `user` and `passwd` are read here; the same file can feed
//! [`ConnectionParameters::from_file`](crate::connection::ConnectionParameters::from_file).

use crate::config::parse_object;
use crate::connection::Credentials;
use crate::error::{ConfigurationError, SqlCredError};
use crate::provider::CredentialProvider;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Reads credentials from a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    path: PathBuf,
}

#[derive(Deserialize)]
struct CredentialFile {
    user: Option<String>,
    passwd: Option<String>,
}

impl FileCredentialProvider {
    /// Create a provider reading the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn missing(&self, field: &str) -> ConfigurationError {
        ConfigurationError::MissingField {
            path: self.path.clone(),
            field: field.to_string(),
        }
    }
}

impl CredentialProvider for FileCredentialProvider {
    fn resolve(&self) -> Result<Credentials, SqlCredError> {
        let contents = Zeroizing::new(
            std::fs::read_to_string(&self.path)
                .map_err(|e| ConfigurationError::from_io(&self.path, e))?,
        );

        let file: CredentialFile = parse_object(&self.path, &contents)?;

        let user = file.user.ok_or_else(|| self.missing("user"))?;
        let passwd = Zeroizing::new(file.passwd.ok_or_else(|| self.missing("passwd"))?);

        tracing::debug!(
            strategy = self.strategy(),
            path = %self.path.display(),
            "resolved credentials"
        );
        Ok(Credentials::new(user, passwd.as_str()))
    }

    fn strategy(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_resolves_matching_credentials() {
        let file = write_file(
            r#"{"driver": "{ODBC Driver 13 for SQL Server}", "server": "localhost",
                "port": 1433, "database": "nb-database",
                "user": "nb-user", "passwd": "nb-password"}"#,
        );

        let creds = FileCredentialProvider::new(file.path()).resolve().unwrap();
        assert_eq!(creds, Credentials::new("nb-user", "nb-password"));
    }

    #[test]
    fn test_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCredentialProvider::new(dir.path().join("credentials.json"))
            .resolve()
            .unwrap_err();

        assert!(matches!(
            err,
            SqlCredError::Configuration(ConfigurationError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_file_malformed() {
        let file = write_file("{'user': 'nb-user'}");
        let err = FileCredentialProvider::new(file.path()).resolve().unwrap_err();

        assert!(matches!(
            err,
            SqlCredError::Configuration(ConfigurationError::Malformed { .. })
        ));
    }

    #[test]
    fn test_file_not_an_object() {
        let file = write_file(r#"["nb-user", "nb-password"]"#);
        let err = FileCredentialProvider::new(file.path()).resolve().unwrap_err();

        assert!(matches!(
            err,
            SqlCredError::Configuration(ConfigurationError::Malformed { .. })
        ));
        assert!(!err.to_string().contains("nb-password"));
    }

    #[test]
    fn test_file_missing_passwd() {
        let file = write_file(r#"{"user": "nb-user"}"#);
        let err = FileCredentialProvider::new(file.path()).resolve().unwrap_err();

        assert!(matches!(
            err,
            SqlCredError::Configuration(ConfigurationError::MissingField { field, .. })
                if field == "passwd"
        ));
    }

    #[test]
    fn test_file_error_does_not_leak_password() {
        let file = write_file(r#"{"user": "nb-user", "passwd": 987654321}"#);
        let err = FileCredentialProvider::new(file.path()).resolve().unwrap_err();

        let message = err.to_string();
        assert!(message.contains(&file.path().display().to_string()));
        assert!(!message.contains("987654321"));
    }
}
