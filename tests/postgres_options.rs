#![cfg(feature = "postgres")]

use std::io::Write;

use sql_repository::prelude::*;

#[tokio::test]
async fn connector_from_json_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{"host": "db.internal", "port": 5433, "user": "music", "password": "secret", "provider": "postgres", "db": "chinook"}}"#
    )?;

    let raw = std::fs::read_to_string(file.path())?;
    let opts: PostgresOptions = serde_json::from_str(&raw)?;
    assert_eq!(opts.port, Some(5433));
    assert_eq!(opts.dbname.as_deref(), Some("chinook"));

    let connector = PostgresConnector::new(&opts)?;
    let repo = Repository::from_connector(&connector).await?;
    assert_eq!(repo.executor().placeholder_style(), PlaceholderStyle::Postgres);
    Ok(())
}

#[test]
fn incomplete_config_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let opts: PostgresOptions = serde_json::from_str(r#"{"host": "db.internal", "db": "chinook"}"#)?;
    match PostgresConnector::new(&opts) {
        Err(SqlRepositoryError::ConfigError(msg)) => assert_eq!(msg, "port is required"),
        other => panic!("expected a config error, got {other:?}"),
    }
    Ok(())
}
