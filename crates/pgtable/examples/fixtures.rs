//! CRUD cycle against a `fixtures` table
//!
//! Run with: RUST_LOG=pgtable=trace cargo run --example fixtures -p pgtable
//!
//! Set PGHOST, PGUSER, PGPASSWORD, PGDATABASE in a .env file or the environment.
//! The example creates `fixtures(col1 int, col2 text, col3 int)` if missing and
//! empties it first.

use pgtable::{ConnConfig, Descriptor, Table, TableError, Value};
use tokio_postgres::NoTls;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<(), TableError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pgtable=debug")))
        .init();

    let config = ConnConfig::from_env();
    println!("connecting with {config}");
    let conn = config.to_conn_string();

    // The table API only speaks DML; DDL goes through the driver directly.
    let (client, connection) = tokio_postgres::connect(&conn, NoTls)
        .await
        .map_err(|e| TableError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    client
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS fixtures (col1 int, col2 text, col3 int);
             DELETE FROM fixtures;",
        )
        .await
        .map_err(TableError::from_db_error)?;
    drop(client);

    let fixtures = Table::new("fixtures", conn)?;

    // ============================================
    // Insert
    // ============================================
    for (col1, col2, col3) in [(1, "One", 10), (2, "Two", 20), (3, "Three", 30)] {
        fixtures
            .insert(&Descriptor::new().values([
                Value::from(col1),
                Value::from(col2),
                Value::from(col3),
            ]))
            .await?;
    }
    println!("inserted 3 rows");

    // ============================================
    // Update
    // ============================================
    let n = fixtures
        .update(
            &Descriptor::new()
                .key("col1", 2)
                .set("col2", "Two++")
                .set("col3", 21),
        )
        .await?;
    println!("updated {n} row(s)");

    // ============================================
    // Read
    // ============================================
    let records = fixtures
        .read(&Descriptor::new().order_by("col3").descending(true))
        .await?;
    for record in &records {
        println!("{}", record.to_json());
    }

    let position = fixtures
        .get_position(&Descriptor::new().key("col1", 2).order_by("col3"))
        .await?;
    println!("col1=2 is row {position} by col3");

    // ============================================
    // Delete
    // ============================================
    let n = fixtures.delete(&Descriptor::new().key("col1", 2)).await?;
    println!("deleted {n} row(s)");

    match fixtures
        .get_position(&Descriptor::new().key("col1", 2).order_by("col3"))
        .await
    {
        Err(e) if e.is_not_found() => println!("col1=2 is gone"),
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
