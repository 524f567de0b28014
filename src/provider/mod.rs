//! Credential providers.
//!
//! A [`CredentialProvider`] supplies the username/password pair for one
//! session. Four strategies are available:
//!
//! - [`LiteralCredentialProvider`] - a fixed pair, for disposable local setups
//! - [`FileCredentialProvider`] - a JSON file kept out of version control
//! - [`InteractiveCredentialProvider`] - a terminal prompt with masked password
//! - [`EnvCredentialProvider`] - two process environment variables
//!
//! # Example
//!
//! ```
//! use sqlcred_rs::provider::{CredentialProvider, LiteralCredentialProvider};
//!
//! let provider: Box<dyn CredentialProvider> =
//!     Box::new(LiteralCredentialProvider::new("nb-user", "nb-password"));
//! let creds = provider.resolve()?;
//! assert_eq!(creds.username(), "nb-user");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::connection::Credentials;
use crate::error::SqlCredError;

pub mod env;
pub mod file;
pub mod interactive;
pub mod literal;

pub use env::EnvCredentialProvider;
pub use file::FileCredentialProvider;
pub use interactive::{InteractiveCredentialProvider, Prompt, ReaderPrompt, TerminalPrompt};
pub use literal::LiteralCredentialProvider;

/// Source of the secret half of a connection.
pub trait CredentialProvider: Send + Sync {
    /// Resolve the username/password pair.
    fn resolve(&self) -> Result<Credentials, SqlCredError>;

    /// Short strategy name used in log events.
    fn strategy(&self) -> &'static str;
}
