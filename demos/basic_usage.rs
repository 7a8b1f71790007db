//! Basic helper usage example
//!
//! Runs against an in-memory SQLite database and shows:
//! - Lazy connection on first statement
//! - Single row fetch
//! - Row callbacks with counts
//! - Keyed and unkeyed result shaping
//!
//! Run with: RUST_LOG=debug cargo run --example basic_usage --features sqlite

use rust_database_helper::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Rust Database Helper - Basic Usage Example ===\n");

    let config = ConnectionConfig::builder(DatabaseType::Sqlite).build()?;
    let mut db = DatabaseHelper::new(SqliteConnector::new(), config);
    println!("1. State before first use: {:?}\n", db.state());

    println!("2. Creating and filling table...");
    let ok = db
        .multi_execute(
            "CREATE TABLE characters (id TEXT, first_name TEXT, last_name TEXT);
             INSERT INTO characters VALUES ('mmouse', 'Mickey', 'Mouse');
             INSERT INTO characters VALUES ('dduck', 'Donald', 'Duck');
             INSERT INTO characters VALUES ('mmouse', 'Mickey', 'Mouse');
             INSERT INTO characters VALUES ('ggoof', 'Goofy', 'Goof');",
        )
        .await?;
    println!("   ✓ Batch succeeded: {}\n", ok);

    println!("3. Rejected statements are not errors...");
    if !db.execute("INSERT INTO villains VALUES ('pete')").await? {
        println!(
            "   ✓ Server said ({}): {}\n",
            db.last_error_code(),
            db.last_error_message().unwrap_or_default()
        );
    }

    println!("4. First row...");
    if let Some(row) = db.fetch_one("SELECT * FROM characters").await? {
        println!("   {} {}\n", row["first_name"].as_string(), row["last_name"].as_string());
    }

    println!("5. Counting Mickeys with a callback...");
    let count = db
        .fetch_each("SELECT * FROM characters", |row| {
            row["id"].as_str() == Some("mmouse")
        })
        .await?;
    println!(
        "   ✓ {} of {} rows matched\n",
        count.succeeded, count.processed
    );

    println!("6. Shaping results...");
    let list = db
        .fetch_all("SELECT * FROM characters", FieldSpec::None, "first_name")
        .await?;
    println!("   first names: {}", serde_json::to_string(&list).unwrap_or_default());

    let by_id = db
        .fetch_all("SELECT * FROM characters", "id", FieldSpec::None)
        .await?;
    println!("   keyed by id: {}", serde_json::to_string(&by_id).unwrap_or_default());

    let composite = db
        .fetch_all(
            "SELECT * FROM characters",
            ["id", "first_name"],
            ["last_name"],
        )
        .await?;
    println!(
        "   composite key: {}\n",
        serde_json::to_string(&composite).unwrap_or_default()
    );

    db.close().await;
    println!("=== Example completed successfully ===");
    Ok(())
}
