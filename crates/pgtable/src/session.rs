//! Per-call database sessions.
//!
//! A [`Session`] is one `tokio-postgres` connection opened for a single
//! operation: connect, ping, run one statement, close. There is no pooling and
//! no statement cache; each call prepares its statement on a fresh connection.

use crate::builder::Statement;
use crate::error::{TableError, TableResult};
use crate::materialize::Cursor;
use crate::trace;
use crate::value::Value;
use futures_util::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, Row, RowStream};

/// An open connection plus the task driving it.
pub struct Session {
    client: Client,
    driver: JoinHandle<()>,
    timeout: Option<Duration>,
}

impl Session {
    /// Parse `config`, connect, and ping.
    ///
    /// `config` is handed to `tokio_postgres::Config` as-is: either libpq
    /// `key=value` pairs or a `postgres://` URL. With a timeout, connecting and
    /// pinging are each bounded by it.
    pub async fn open(config: &str, timeout: Option<Duration>) -> TableResult<Self> {
        let pg_config: tokio_postgres::Config =
            config.parse().map_err(TableError::connection)?;
        let (client, connection) = bounded(timeout, async {
            pg_config
                .connect(NoTls)
                .await
                .map_err(TableError::connection)
        })
        .await?;

        let driver = tokio::spawn(async move {
            if let Err(err) = connection.await {
                trace::driver_error(&err);
            }
        });

        let session = Self {
            client,
            driver,
            timeout,
        };
        let ping = bounded(timeout, async {
            session
                .client
                .batch_execute("SELECT 1")
                .await
                .map_err(TableError::connection)
        })
        .await;
        if let Err(err) = ping {
            session.close().await;
            return Err(err);
        }

        trace::session_opened();
        Ok(session)
    }

    /// Close the connection and wait for the driver task to finish.
    ///
    /// With a timeout, a driver still running after that long is aborted.
    pub async fn close(self) {
        let Self {
            client,
            mut driver,
            timeout,
        } = self;
        drop(client);
        match timeout {
            Some(timeout) => {
                if tokio::time::timeout(timeout, &mut driver).await.is_err() {
                    driver.abort();
                }
            }
            None => {
                let _ = driver.await;
            }
        }
        trace::session_closed();
    }

    /// Run `future` under the session's statement timeout, if any.
    ///
    /// On expiry a cancel request is sent for whatever the server is running.
    pub async fn guard<T, F>(&self, future: F) -> TableResult<T>
    where
        F: Future<Output = TableResult<T>>,
    {
        let result = bounded(self.timeout, future).await;
        if result.as_ref().is_err_and(TableError::is_timeout) {
            let cancel_token = self.client.cancel_token();
            tokio::spawn(async move {
                let _ = cancel_token.cancel_query(NoTls).await;
            });
        }
        result
    }

    /// Execute a statement with no result set and return the affected row count.
    pub async fn execute(&self, stmt: &Statement) -> TableResult<u64> {
        let params = stmt.params_ref();
        self.client
            .execute(stmt.sql(), &params)
            .await
            .map_err(TableError::from_db_error)
    }

    /// Prepare a statement and open a cursor over its rows.
    pub async fn query(&self, stmt: &Statement) -> TableResult<PgCursor> {
        let prepared = self
            .client
            .prepare(stmt.sql())
            .await
            .map_err(TableError::from_db_error)?;
        let columns = prepared
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let params = stmt.params_ref();
        let rows = self
            .client
            .query_raw(&prepared, params.iter().copied())
            .await
            .map_err(TableError::from_db_error)?;

        Ok(PgCursor {
            columns,
            rows: Box::pin(rows),
        })
    }

    /// Run a statement and return its first row, if any.
    pub async fn query_first(&self, stmt: &Statement) -> TableResult<Option<Row>> {
        let params = stmt.params_ref();
        let rows = self
            .client
            .query(stmt.sql(), &params)
            .await
            .map_err(TableError::from_db_error)?;
        Ok(rows.into_iter().next())
    }
}

/// Await `future`, failing with [`TableError::Timeout`] once `timeout` elapses.
async fn bounded<T, F>(timeout: Option<Duration>, future: F) -> TableResult<T>
where
    F: Future<Output = TableResult<T>>,
{
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, future)
            .await
            .map_err(|_| TableError::Timeout(timeout))?,
        None => future.await,
    }
}

/// Cursor over a `tokio-postgres` row stream.
pub struct PgCursor {
    columns: Vec<String>,
    rows: Pin<Box<RowStream>>,
}

impl Cursor for PgCursor {
    fn column_names(&self) -> TableResult<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn next_row(&mut self) -> Option<TableResult<Vec<Value>>> {
        let row = match self.rows.next().await? {
            Ok(row) => row,
            Err(err) => return Some(Err(TableError::from_db_error(err))),
        };
        Some(decode_row(&row, &self.columns))
    }
}

fn decode_row(row: &Row, columns: &[String]) -> TableResult<Vec<Value>> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            row.try_get::<_, Value>(idx)
                .map_err(|e| TableError::decode(name.as_str(), e.to_string()))
        })
        .collect()
}
