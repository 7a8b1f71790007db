//! End-to-end tests against an in-memory SQLite database

#![cfg(feature = "sqlite")]

use rust_database_helper::prelude::*;

async fn setup() -> Result<DatabaseHelper<SqliteConnector>> {
    let config = ConnectionConfig::builder(DatabaseType::Sqlite).build()?;
    let mut db = DatabaseHelper::new(SqliteConnector::new(), config);

    assert!(
        db.multi_execute(
            "CREATE TABLE characters (
                 id TEXT NOT NULL,
                 first_name TEXT NOT NULL,
                 last_name TEXT NOT NULL,
                 age INTEGER
             );
             INSERT INTO characters VALUES ('mmouse', 'Mickey', 'Mouse', 95);
             INSERT INTO characters VALUES ('dduck', 'Donald', 'Duck', 90);
             INSERT INTO characters VALUES ('mmouse', 'Mickey', 'Mouse', 96);
             INSERT INTO characters VALUES ('ggoof', 'Goofy', 'Goof', NULL);"
        )
        .await?
    );
    Ok(db)
}

const ALL: &str = "SELECT id, first_name, last_name, age FROM characters ORDER BY rowid";

#[tokio::test]
async fn test_fetch_one_returns_first_row() -> Result<()> {
    let mut db = setup().await?;

    let row = db.fetch_one(ALL).await?.expect("first row");
    assert_eq!(row["first_name"].as_str(), Some("Mickey"));
    assert_eq!(row["age"].as_long(), Some(95));

    let none = db
        .fetch_one("SELECT * FROM characters WHERE id = 'pluto'")
        .await?;
    assert!(none.is_none());

    let failed = db.fetch_one("SELECT * FROM villains").await?;
    assert!(failed.is_none());
    assert_ne!(db.last_error_code(), 0);
    Ok(())
}

#[tokio::test]
async fn test_fetch_each_counts_callback_results() -> Result<()> {
    let mut db = setup().await?;

    let count = db
        .fetch_each(ALL, |row| row["id"].as_str() == Some("mmouse"))
        .await?;
    assert_eq!((count.processed, count.succeeded), (4, 2));

    let count = db
        .fetch_each("SELECT * FROM characters WHERE age > 100", |_| true)
        .await?;
    assert_eq!((count.processed, count.succeeded), (0, 0));
    Ok(())
}

#[tokio::test]
async fn test_fetch_all_keyed_by_id() -> Result<()> {
    let mut db = setup().await?;

    let shaped = db.fetch_all(ALL, "id", FieldSpec::None).await?;
    let by_id = shaped.as_keyed().expect("keyed");
    assert_eq!(by_id.len(), 3);
    // the later Mickey row wins
    assert_eq!(
        by_id["mmouse"].get("age").and_then(DatabaseValue::as_long),
        Some(96)
    );
    assert!(by_id["ggoof"].get("age").is_some_and(DatabaseValue::is_null));

    let shaped = db.fetch_all(ALL, "id", "last_name").await?;
    let names: Vec<(String, String)> = shaped
        .into_keyed()
        .expect("keyed")
        .into_iter()
        .map(|(k, v)| (k, v.as_scalar().map(DatabaseValue::as_string).unwrap_or_default()))
        .collect();
    assert_eq!(
        names,
        [
            ("mmouse".to_string(), "Mouse".to_string()),
            ("dduck".to_string(), "Duck".to_string()),
            ("ggoof".to_string(), "Goof".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_fetch_all_composite_key_with_numbers() -> Result<()> {
    let mut db = setup().await?;

    let shaped = db.fetch_all(ALL, ["id", "age"], ["first_name"]).await?;
    let keys: Vec<&str> = shaped
        .as_keyed()
        .expect("keyed")
        .keys()
        .map(String::as_str)
        .collect();
    // NULL contributes an empty fragment
    assert_eq!(keys, ["mmouse95", "dduck90", "mmouse96", "ggoof"]);
    Ok(())
}

#[tokio::test]
async fn test_fetch_all_unkeyed_lists() -> Result<()> {
    let mut db = setup().await?;

    let shaped = db.fetch_all(ALL, FieldSpec::None, FieldSpec::None).await?;
    assert_eq!(shaped.len(), 4);

    let shaped = db.fetch_all(ALL, FieldSpec::None, "first_name").await?;
    let firsts: Vec<String> = shaped
        .as_list()
        .expect("list")
        .iter()
        .filter_map(ShapedRecord::as_scalar)
        .map(DatabaseValue::as_string)
        .collect();
    assert_eq!(firsts, ["Mickey", "Donald", "Mickey", "Goofy"]);
    Ok(())
}

#[tokio::test]
async fn test_fetch_all_rejected_query_is_an_error() -> Result<()> {
    let mut db = setup().await?;
    let err = db
        .fetch_all("SELECT * FROM villains", "id", FieldSpec::None)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::QueryError { .. }));
    assert!(err.to_string().contains("villains"));
    Ok(())
}

#[tokio::test]
async fn test_execute_and_bookkeeping() -> Result<()> {
    let mut db = setup().await?;

    assert!(
        db.execute("UPDATE characters SET age = age + 1 WHERE id = 'mmouse'")
            .await?
    );
    assert_eq!(db.affected_rows(), 2);

    assert!(
        db.execute("INSERT INTO characters VALUES ('pluto', 'Pluto', 'Dog', 94)")
            .await?
    );
    assert_eq!(db.last_insert_id(), Some(5));

    assert!(!db.execute("INSERT INTO nowhere VALUES (1)").await?);
    assert!(db
        .last_error_message()
        .is_some_and(|m| m.contains("nowhere")));

    let name = db.escape("O'Hara").await?;
    assert_eq!(name, "O''Hara");
    Ok(())
}

#[tokio::test]
async fn test_forced_reconnect_opens_fresh_session() -> Result<()> {
    let mut db = setup().await?;
    assert_eq!(db.state(), ConnectionState::Connected);

    // a new in-memory database has no tables
    db.connect().await?;
    assert!(!db.execute("DELETE FROM characters").await?);
    Ok(())
}
