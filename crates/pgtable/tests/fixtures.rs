use pgtable::{ConnConfig, Descriptor, Table, TableError, TableResult, Value};
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::NoTls;

/// Connection string from the environment, or `None` to skip.
fn conn_string(test: &str) -> Option<String> {
    dotenvy::dotenv().ok();
    if std::env::var("PGHOST").is_err() {
        eprintln!("PGHOST is not set; skipping {test}");
        return None;
    }
    Some(ConnConfig::from_env().to_conn_string())
}

async fn admin(conn: &str, sql: &str) -> TableResult<()> {
    let (client, connection) = tokio_postgres::connect(conn, NoTls)
        .await
        .map_err(|e| TableError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    client
        .batch_execute(sql)
        .await
        .map_err(TableError::from_db_error)
}

const FIXTURES_COLUMNS: &str = "col1 int, col2 text, col3 int";
const FIXTURES_ROWS: &str = "(1, 'One', 10), (2, 'Two', 20), (3, 'Three', 30)";

/// A uniquely named scratch table.
struct Fixtures {
    conn: String,
    table: Table,
}

impl Fixtures {
    async fn create(conn: String, columns: &str, rows: &str) -> TableResult<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX_EPOCH")
            .as_nanos();
        let name = format!("pgtable_fixtures_{}_{}", std::process::id(), nanos);

        admin(
            &conn,
            &format!("CREATE TABLE {name} ({columns}); INSERT INTO {name} VALUES {rows};"),
        )
        .await?;

        let table = Table::new(name, conn.as_str())?;
        Ok(Self { conn, table })
    }

    async fn teardown(self) -> TableResult<()> {
        admin(&self.conn, &format!("DROP TABLE {}", self.table.name())).await
    }
}

/// Run `body` against a fresh table and drop it afterwards, even when `body`
/// fails or panics.
async fn with_table<F, Fut>(test: &str, columns: &str, rows: &str, body: F) -> TableResult<()>
where
    F: FnOnce(Table) -> Fut,
    Fut: Future<Output = TableResult<()>> + Send + 'static,
{
    let Some(conn) = conn_string(test) else {
        return Ok(());
    };
    let fx = Fixtures::create(conn, columns, rows).await?;
    let outcome = tokio::spawn(body(fx.table.clone())).await;
    fx.teardown().await?;
    match outcome {
        Ok(result) => result,
        Err(err) => std::panic::resume_unwind(err.into_panic()),
    }
}

/// [`with_table`] over `fixtures(col1 int, col2 text, col3 int)` seeded with rows 1..=3.
async fn with_fixtures<F, Fut>(test: &str, body: F) -> TableResult<()>
where
    F: FnOnce(Table) -> Fut,
    Fut: Future<Output = TableResult<()>> + Send + 'static,
{
    with_table(test, FIXTURES_COLUMNS, FIXTURES_ROWS, body).await
}

fn row(col1: i64, col2: &str, col3: i64) -> Descriptor {
    Descriptor::new().values([Value::Int(col1), Value::from(col2), Value::Int(col3)])
}

#[tokio::test]
async fn insert_then_read_round_trips() -> TableResult<()> {
    with_fixtures("insert_then_read_round_trips", |table| async move {
        assert_eq!(table.insert(&row(4, "Four", 40)).await?, 1);

        let records = table
            .read(&Descriptor::new().key("col1", 4).columns(["col2", "col3"]))
            .await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].columns().collect::<Vec<_>>(), ["col2", "col3"]);
        assert_eq!(records[0]["col2"], Value::from("Four"));
        assert_eq!(records[0]["col3"], Value::Int(40));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn insert_with_named_columns_leaves_others_null() -> TableResult<()> {
    with_fixtures("insert_with_named_columns_leaves_others_null", |table| async move {
        table
            .insert(&Descriptor::new().set("col1", 5).set("col2", "Five"))
            .await?;
        let records = table.read(&Descriptor::new().key("col1", 5)).await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["col3"], Value::Null);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn update_changes_only_the_keyed_row() -> TableResult<()> {
    with_fixtures("update_changes_only_the_keyed_row", |table| async move {
        let affected = table
            .update(
                &Descriptor::new()
                    .key("col1", 2)
                    .set("col2", "Two++")
                    .set("col3", 21),
            )
            .await?;
        assert_eq!(affected, 1);

        let records = table.read(&Descriptor::new().order_by("col1")).await?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["col2"], Value::from("One"));
        assert_eq!(records[1]["col2"], Value::from("Two++"));
        assert_eq!(records[1]["col3"], Value::Int(21));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn delete_then_read_finds_nothing() -> TableResult<()> {
    with_fixtures("delete_then_read_finds_nothing", |table| async move {
        assert_eq!(table.delete(&Descriptor::new().key("col1", 2)).await?, 1);
        let records = table.read(&Descriptor::new().key("col1", 2)).await?;
        assert!(records.is_empty());

        assert_eq!(table.delete(&Descriptor::new().key("col1", 2)).await?, 0);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn read_orders_and_limits() -> TableResult<()> {
    with_fixtures("read_orders_and_limits", |table| async move {
        let records = table
            .read(
                &Descriptor::new()
                    .columns(["col1"])
                    .order_by("col3")
                    .descending(true)
                    .limit(2),
            )
            .await?;
        let ids: Vec<_> = records.iter().map(|r| r["col1"].clone()).collect();
        assert_eq!(ids, [Value::Int(3), Value::Int(2)]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn text_key_binds_to_int_column() -> TableResult<()> {
    with_fixtures("text_key_binds_to_int_column", |table| async move {
        let records = table
            .read(&Descriptor::new().key("col1", "2").columns(["col2", "col3"]))
            .await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["col2"], Value::from("Two"));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn position_follows_order_direction() -> TableResult<()> {
    with_fixtures("position_follows_order_direction", |table| async move {
        let by_col3 = Descriptor::new().order_by("col3");
        for (key, want) in [(1, 1), (2, 2), (3, 3)] {
            let pos = table.get_position(&by_col3.clone().key("col1", key)).await?;
            assert_eq!(pos, want);
        }

        let pos = table
            .get_position(&by_col3.clone().descending(true).key("col1", 1))
            .await?;
        assert_eq!(pos, 3);

        let err = table
            .get_position(&by_col3.key("col1", 99))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn rejected_statement_is_a_query_error() -> TableResult<()> {
    with_fixtures("rejected_statement_is_a_query_error", |table| async move {
        let err = table
            .read(&Descriptor::new().columns(["no_such_column"]))
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::Query(_)));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn widened_columns_read_back_and_write_back() -> TableResult<()> {
    with_table(
        "widened_columns_read_back_and_write_back",
        "id int, amount numeric(10,2), due date, seen timestamptz, span interval",
        "(1, 12.50, '2024-01-31', '2024-01-31 08:00:00+00', '1 day')",
        |table| async move {
            let records = table.read(&Descriptor::new().key("id", 1)).await?;
            assert_eq!(records.len(), 1);
            let record = &records[0];
            assert_eq!(record["amount"], Value::from("12.50"));
            assert_eq!(record["due"], Value::from("2024-01-31"));
            assert_eq!(record["seen"], Value::from("2024-01-31T08:00:00+00:00"));
            assert!(record["span"].as_bytes().is_some());

            let affected = table
                .update(
                    &Descriptor::new()
                        .key("id", 1)
                        .set("amount", record["amount"].clone())
                        .set("due", record["due"].clone())
                        .set("seen", record["seen"].clone()),
                )
                .await?;
            assert_eq!(affected, 1);

            table
                .insert(
                    &Descriptor::new()
                        .set("id", 2)
                        .set("amount", 7)
                        .set("due", "2024-02-29"),
                )
                .await?;
            let records = table.read(&Descriptor::new().key("id", 2)).await?;
            assert_eq!(records[0]["amount"], Value::from("7.00"));
            assert_eq!(records[0]["due"], Value::from("2024-02-29"));

            Ok(())
        },
    )
    .await
}

#[tokio::test]
async fn missing_table_fails_without_leaking() -> TableResult<()> {
    let Some(conn) = conn_string("missing_table_fails_without_leaking") else {
        return Ok(());
    };
    let table = Table::new("pgtable_no_such_table", conn)?;

    for _ in 0..3 {
        let err = table.read(&Descriptor::new()).await.unwrap_err();
        assert!(matches!(err, TableError::Query(_)));
    }
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let table = Table::new(
        "fixtures",
        "host=127.0.0.1 port=1 user=nobody connect_timeout=1",
    )
    .unwrap();
    let err = table.insert(&row(1, "x", 1)).await.unwrap_err();
    assert!(matches!(err, TableError::Connection(_)));
}
