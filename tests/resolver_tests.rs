//! End-to-end credential resolution without a database.
//!
//! Each strategy resolves credentials, builds the descriptor and hands it to
//! a connector that records what it received.

use mockall::mock;
use sqlcred_rs::client::Connector;
use sqlcred_rs::descriptor::DescriptorFields;
use sqlcred_rs::provider::{InteractiveCredentialProvider, ReaderPrompt};
use sqlcred_rs::{
    ConfigurationError, ConnectionDescriptor, ConnectionError, ConnectionParameters,
    CredentialResolver, EnvCredentialProvider, FileCredentialProvider, LiteralCredentialProvider,
    ResolverConfig, SqlCredError,
};
use std::io::Cursor;

const NOTEBOOK_DESCRIPTOR: &str = "DRIVER%3D%7BODBC+Driver+13+for+SQL+Server%7D%3B\
    SERVER%3Dlocalhost%3BPORT%3D1433%3BDATABASE%3Dnb-database%3B\
    UID%3Dnb-user%3BPWD%3Dnb-password%3B";

mock! {
    pub Connector {}

    impl Connector for Connector {
        type Handle = DescriptorFields;
        fn open(&self, descriptor: &ConnectionDescriptor) -> Result<DescriptorFields, ConnectionError>;
    }
}

/// A connector that decodes the descriptor it is given instead of connecting.
fn decoding_connector() -> MockConnector {
    let mut connector = MockConnector::new();
    connector
        .expect_open()
        .times(1)
        .returning(|descriptor| descriptor.fields());
    connector
}

fn notebook_params() -> ConnectionParameters {
    ConnectionParameters::builder()
        .driver("{ODBC Driver 13 for SQL Server}")
        .host("localhost")
        .port(1433)
        .database("nb-database")
        .build()
        .unwrap()
}

#[test]
fn test_literal_strategy_produces_known_descriptor() {
    let resolver = CredentialResolver::new(
        notebook_params(),
        Box::new(LiteralCredentialProvider::new("nb-user", "nb-password")),
    );

    assert_eq!(resolver.descriptor().unwrap().expose(), NOTEBOOK_DESCRIPTOR);
}

#[test]
fn test_file_strategy_shares_parameter_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(
        &path,
        r#"{"driver": "{ODBC Driver 13 for SQL Server}", "server": "localhost",
            "port": 1433, "database": "nb-database",
            "user": "nb-user", "passwd": "nb-password"}"#,
    )
    .unwrap();

    let params = ConnectionParameters::from_file(&path).unwrap();
    assert_eq!(params, notebook_params());

    let resolver = CredentialResolver::new(params, Box::new(FileCredentialProvider::new(&path)));
    assert_eq!(resolver.descriptor().unwrap().expose(), NOTEBOOK_DESCRIPTOR);
}

#[test]
fn test_hybrid_parameter_file_with_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("connection.json");
    std::fs::write(
        &path,
        r#"{"driver": "{ODBC Driver 13 for SQL Server}", "server": "localhost",
            "port": "1433", "database": "nb-database"}"#,
    )
    .unwrap();

    let prompt = ReaderPrompt::new(Cursor::new(b"bob\nhunter2\n".to_vec()), Vec::new());
    let resolver = CredentialResolver::new(
        ConnectionParameters::from_file(&path).unwrap(),
        Box::new(InteractiveCredentialProvider::new(prompt)),
    );

    let fields = resolver.connect(&decoding_connector()).unwrap();
    assert_eq!(fields.server, "localhost");
    assert_eq!(fields.database, "nb-database");
    assert_eq!(fields.uid, "bob");
    assert_eq!(fields.pwd.expose(), "hunter2");
}

#[test]
fn test_environment_strategy() {
    std::env::set_var("SQLCRED_IT_ENV_USER", "alice");
    std::env::set_var("SQLCRED_IT_ENV_PASS", "s3cr3t");

    let resolver = CredentialResolver::new(
        notebook_params(),
        Box::new(EnvCredentialProvider::new(
            "SQLCRED_IT_ENV_USER",
            "SQLCRED_IT_ENV_PASS",
        )),
    );

    let fields = resolver.connect(&decoding_connector()).unwrap();
    assert_eq!(fields.uid, "alice");
    assert_eq!(fields.pwd.expose(), "s3cr3t");
}

#[test]
fn test_environment_strategy_missing_variable() {
    std::env::remove_var("SQLCRED_IT_MISSING_USER");
    std::env::remove_var("SQLCRED_IT_MISSING_PASS");

    let resolver = CredentialResolver::new(
        notebook_params(),
        Box::new(EnvCredentialProvider::new(
            "SQLCRED_IT_MISSING_USER",
            "SQLCRED_IT_MISSING_PASS",
        )),
    );

    let mut connector = MockConnector::new();
    connector.expect_open().never();

    let err = resolver.connect(&connector).unwrap_err();
    assert!(matches!(
        err,
        SqlCredError::Configuration(ConfigurationError::MissingVariable { .. })
    ));
}

#[test]
fn test_config_file_environment_strategy() {
    std::env::set_var("SQLCRED_IT_CFG_USER", "nb-user");
    std::env::set_var("SQLCRED_IT_CFG_PASS", "nb-password");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sqlcred.json");
    std::fs::write(
        &path,
        r#"{
            "parameters": {"driver": "{ODBC Driver 13 for SQL Server}", "server": "localhost",
                           "port": 1433, "database": "nb-database"},
            "credentials": {"strategy": "environment",
                            "username_var": "SQLCRED_IT_CFG_USER",
                            "password_var": "SQLCRED_IT_CFG_PASS"}
        }"#,
    )
    .unwrap();

    let resolver = ResolverConfig::from_file(&path)
        .unwrap()
        .into_resolver()
        .unwrap();

    assert_eq!(resolver.strategy(), "environment");
    assert_eq!(resolver.descriptor().unwrap().expose(), NOTEBOOK_DESCRIPTOR);
}

#[test]
fn test_same_inputs_same_descriptor_across_strategies() {
    let literal = CredentialResolver::new(
        notebook_params(),
        Box::new(LiteralCredentialProvider::new("bob", "hunter2")),
    );
    let prompt = ReaderPrompt::new(Cursor::new(b"bob\nhunter2\n".to_vec()), Vec::new());
    let interactive = CredentialResolver::new(
        notebook_params(),
        Box::new(InteractiveCredentialProvider::new(prompt)),
    );

    assert_eq!(
        literal.descriptor().unwrap().expose(),
        interactive.descriptor().unwrap().expose()
    );
}
