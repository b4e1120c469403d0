#![cfg(feature = "sqlite")]

use sql_repository::prelude::*;
use tempfile::TempDir;

#[derive(Debug, PartialEq)]
struct Artist {
    id: i64,
    name: String,
}

fn artist(r: &mut RowMap) -> Result<Artist, SqlRepositoryError> {
    let a = Artist {
        id: r.int64("ArtistId"),
        name: r.string("Name"),
    };
    r.err()?;
    Ok(a)
}

/// Seed a small music catalogue in a fresh file and return its directory and path.
fn seeded_db() -> Result<(TempDir, String), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("music.sqlite");
    let conn = rusqlite::Connection::open(&path)?;
    conn.execute_batch(
        "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT NOT NULL);
         CREATE TABLE Album (
             AlbumId INTEGER PRIMARY KEY AUTOINCREMENT,
             Title TEXT NOT NULL,
             ArtistId INTEGER NOT NULL REFERENCES Artist(ArtistId),
             Released TEXT,
             Rating REAL,
             Explicit INTEGER NOT NULL DEFAULT 0
         );
         INSERT INTO Artist (ArtistId, Name) VALUES
             (1, 'AC/DC'), (2, 'Accept'), (3, 'Aerosmith'), (4, 'Alanis Morissette');
         INSERT INTO Album (Title, ArtistId, Released, Rating, Explicit) VALUES
             ('For Those About To Rock', 1, '1981-11-23 00:00:00', 4.5, 0),
             ('Balls to the Wall', 2, '1983-12-05 00:00:00', 3.75, 1),
             ('Restless and Wild', 2, NULL, NULL, 0);",
    )?;
    Ok((dir, path.to_string_lossy().into_owned()))
}

async fn repo_for(path: &str) -> Result<Repository<SqliteHandle>, SqlRepositoryError> {
    let connector = SqliteOptions::builder(path.to_owned())
        .pool_size(2)
        .build()
        .await?;
    Repository::from_connector(&connector).await
}

#[tokio::test]
async fn map_rows_returns_every_row_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let artists = repo
        .map_rows("select ArtistId, Name from Artist order by ArtistId", &[], artist)
        .await?;

    assert_eq!(artists.len(), 4);
    assert_eq!(
        artists[0],
        Artist {
            id: 1,
            name: "AC/DC".into()
        }
    );
    assert_eq!(artists[3].name, "Alanis Morissette");
    Ok(())
}

#[tokio::test]
async fn map_rows_with_no_matches_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let artists = repo
        .map_rows(
            "select ArtistId, Name from Artist where ArtistId > ?1",
            &[RowValues::Int64(100)],
            artist,
        )
        .await?;
    assert!(artists.is_empty());
    Ok(())
}

#[tokio::test]
async fn named_list_expands_for_in_clause() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let params = NamedParams::new()
        .bind("ids", vec![1_i64, 3, 4])
        .bind("prefix", "A%");
    let names: Vec<String> = repo
        .map_rows_named(
            "select ArtistId, Name from Artist where ArtistId in (:ids) and Name like :prefix order by Name desc",
            &params,
            |r| Ok(artist(r)?.name),
        )
        .await?;

    assert_eq!(names, vec!["Alanis Morissette", "Aerosmith", "AC/DC"]);
    Ok(())
}

#[tokio::test]
async fn map_row_distinguishes_zero_one_and_many() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let none = repo
        .map_row_named(
            "select ArtistId, Name from Artist where ArtistId = :id",
            &NamedParams::new().bind("id", 99_i64),
            artist,
        )
        .await?;
    assert!(none.is_none());

    let one = repo
        .map_row_named(
            "select ArtistId, Name from Artist where ArtistId = :id",
            &NamedParams::new().bind("id", 2_i64),
            artist,
        )
        .await?;
    assert_eq!(one.map(|a| a.name).as_deref(), Some("Accept"));

    let many = repo
        .map_row("select ArtistId, Name from Artist", &[], artist)
        .await;
    assert!(matches!(many, Err(SqlRepositoryError::TooManyRows(4))));
    Ok(())
}

#[tokio::test]
async fn row_accessors_read_mixed_columns() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let rows = repo
        .map_rows(
            "select Title, Released, Rating, Explicit from Album where Released is not null order by AlbumId",
            &[],
            |r| {
                let row = (
                    r.string("Title"),
                    r.timestamp("Released"),
                    r.float64("Rating"),
                    r.bool("Explicit"),
                );
                r.err()?;
                Ok(row)
            },
        )
        .await?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "For Those About To Rock");
    assert_eq!(rows[0].1.format("%Y-%m-%d").to_string(), "1981-11-23");
    assert!((rows[1].2 - 3.75).abs() < f64::EPSILON);
    assert!(!rows[0].3);
    assert!(rows[1].3);
    Ok(())
}

#[tokio::test]
async fn null_columns_are_detectable() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let nulls = repo
        .map_row(
            "select Released, Rating from Album where Title = ?1",
            &[RowValues::from("Restless and Wild")],
            |r| {
                let flags = (r.is_null("Released"), r.is_null("Rating"));
                r.err()?;
                Ok(flags)
            },
        )
        .await?;
    assert_eq!(nulls, Some((true, true)));
    Ok(())
}

#[tokio::test]
async fn mapping_errors_abort_with_every_column_problem() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let result = repo
        .map_rows("select Name from Artist", &[], |r| {
            let _ = r.int64("Name");
            let _ = r.string("Missing");
            r.err()?;
            Ok(())
        })
        .await;

    match result {
        Err(SqlRepositoryError::ColumnRead(err)) => {
            assert_eq!(err.0.len(), 2);
            let text = err.to_string();
            assert!(text.contains("key 'Name'"));
            assert!(text.contains("key 'Missing' does not exist in row map"));
        }
        other => panic!("expected a column read error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn execute_reports_rows_and_insert_id() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let outcome = repo
        .execute_named(
            "insert into Artist (Name) values (:name)",
            &NamedParams::new().bind("name", "Apocalyptica"),
        )
        .await?;
    assert_eq!(outcome.rows_affected, 1);
    assert_eq!(outcome.last_insert_id, 5);

    let outcome = repo
        .execute(
            "update Album set Rating = ?1 where ArtistId = ?2",
            &[RowValues::Float64(4.0), RowValues::Int64(2)],
        )
        .await?;
    assert_eq!(outcome.rows_affected, 2);

    let stored = repo
        .map_row(
            "select ArtistId, Name from Artist where Name = ?1",
            &[RowValues::from("Apocalyptica")],
            artist,
        )
        .await?;
    assert_eq!(stored.map(|a| a.id), Some(5));
    Ok(())
}

#[tokio::test]
async fn failed_execute_leaves_no_changes() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let result = repo
        .execute(
            "insert into Artist (ArtistId, Name) values (?1, ?2)",
            &[RowValues::Int64(1), "Duplicate".into()],
        )
        .await;
    assert!(matches!(result, Err(SqlRepositoryError::ExecutionError(msg)) if msg.starts_with("execute failed on exec")));

    let count = repo
        .map_row("select count(*) as n from Artist", &[], |r| {
            let n = r.int64("n");
            r.err()?;
            Ok(n)
        })
        .await?;
    assert_eq!(count, Some(4));
    Ok(())
}

#[tokio::test]
async fn abandoned_transaction_is_not_reused() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let connector = SqliteOptions::builder(path).pool_size(1).build().await?;
    let handle = connector.get_connection().await?;

    let mut tx = handle.begin_transaction().await?;
    tx.execute_dml(
        "insert into Artist (Name) values (?1)",
        &[RowValues::from("Uncommitted")],
    )
    .await?;
    drop(tx);

    let repo = Repository::new(handle);
    let names = repo
        .map_rows("select ArtistId, Name from Artist where Name = 'Uncommitted'", &[], artist)
        .await?;
    assert!(names.is_empty());
    Ok(())
}

#[tokio::test]
async fn parameter_errors_surface_before_execution() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = seeded_db()?;
    let repo = repo_for(&path).await?;

    let missing = repo
        .map_rows_named(
            "select ArtistId, Name from Artist where ArtistId = :id",
            &NamedParams::new().bind("other", 1_i64),
            artist,
        )
        .await;
    assert!(matches!(
        missing,
        Err(SqlRepositoryError::UnresolvedParameter { name }) if name == "id"
    ));

    let empty = repo
        .execute_named(
            "delete from Artist where ArtistId in (:ids)",
            &NamedParams::new().bind("ids", Vec::<i64>::new()),
        )
        .await;
    assert!(matches!(empty, Err(SqlRepositoryError::EmptyListParameter(_))));
    Ok(())
}

#[tokio::test]
async fn missing_database_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.sqlite").to_string_lossy().into_owned();

    let refused = SqliteConnector::new(SqliteOptions::new(path.clone())).await;
    assert!(matches!(refused, Err(SqlRepositoryError::ConfigError(_))));

    let created = SqliteOptions::builder(path.clone())
        .require_existing(false)
        .build()
        .await;
    assert!(created.is_ok());
    assert!(std::path::Path::new(&path).exists());
    Ok(())
}
