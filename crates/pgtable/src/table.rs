//! The [`Table`] handle and its operations.

use crate::builder::{
    Descriptor, Statement, render_delete, render_insert, render_position, render_read,
    render_update,
};
use crate::error::{TableError, TableResult};
use crate::ident::{Ident, IntoIdent};
use crate::materialize::{Materialized, materialize};
use crate::record::Record;
use crate::session::Session;
use crate::trace;
use std::time::Duration;

/// A named table plus the connection configuration used to reach it.
///
/// Every operation opens its own connection, runs exactly one statement and
/// closes the connection before returning, on success and on error alike.
/// A `Table` holds no connection state, so it can be cloned and shared freely.
///
/// ```no_run
/// use pgtable::{Descriptor, Table, Value};
///
/// # async fn demo() -> pgtable::TableResult<()> {
/// let table = Table::new("fixtures", "host=localhost user=postgres dbname=test")?;
/// table
///     .insert(&Descriptor::new().values([Value::from(4), Value::from("Four"), Value::from(40)]))
///     .await?;
///
/// let rows = table
///     .read(&Descriptor::new().key("col1", 4).columns(["col2", "col3"]))
///     .await?;
/// assert_eq!(rows[0]["col2"], Value::from("Four"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    name: Ident,
    config: String,
    timeout: Option<Duration>,
}

impl Table {
    /// Create a handle for `name`, reached through `config`.
    ///
    /// `config` is not checked until the first operation.
    pub fn new(name: impl IntoIdent, config: impl Into<String>) -> TableResult<Self> {
        Ok(Self {
            name: name.into_ident()?,
            config: config.into(),
            timeout: None,
        })
    }

    /// Bound each step of every operation (connect, ping, statement, close)
    /// by `timeout`. A statement that overruns fails with
    /// [`TableError::Timeout`] and is cancelled on the server.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn open(&self, stmt: &Statement) -> TableResult<Session> {
        trace::statement(&self.name, stmt);
        Session::open(&self.config, self.timeout).await
    }

    async fn execute(&self, stmt: Statement) -> TableResult<u64> {
        let session = self.open(&stmt).await?;
        let result = session.guard(session.execute(&stmt)).await;
        session.close().await;
        result
    }

    /// Insert one row from the descriptor's values (and columns, if any).
    pub async fn insert(&self, d: &Descriptor) -> TableResult<u64> {
        d.validate_insert()?;
        self.execute(render_insert(&self.name, d)).await
    }

    /// Update the rows whose key column equals the key value.
    pub async fn update(&self, d: &Descriptor) -> TableResult<u64> {
        d.validate_update()?;
        self.execute(render_update(&self.name, d)).await
    }

    /// Delete the rows whose key column equals the key value.
    pub async fn delete(&self, d: &Descriptor) -> TableResult<u64> {
        d.validate_keyed()?;
        self.execute(render_delete(&self.name, d)).await
    }

    /// Read matching rows. Any row that fails to decode fails the whole call.
    pub async fn read(&self, d: &Descriptor) -> TableResult<Vec<Record>> {
        self.read_partial(d).await?.into_result()
    }

    /// Read matching rows, keeping those decoded before a failing row.
    ///
    /// `Err` means nothing was read (bad descriptor, connection or statement
    /// failure, timeout). A row-level failure is reported in
    /// [`Materialized::error`] alongside the records that preceded it.
    pub async fn read_partial(&self, d: &Descriptor) -> TableResult<Materialized> {
        d.validate()?;
        let stmt = render_read(&self.name, d);
        let session = self.open(&stmt).await?;
        let result = session
            .guard(async {
                let mut cursor = session.query(&stmt).await?;
                materialize(&mut cursor).await
            })
            .await;
        session.close().await;
        result
    }

    /// 1-based rank of the row whose key equals the key value, with the table
    /// ordered by `order_by` (descending if set).
    ///
    /// Returns [`TableError::NotFound`] when no row has that key.
    pub async fn get_position(&self, d: &Descriptor) -> TableResult<i64> {
        d.validate_position()?;
        let stmt = render_position(&self.name, d);
        let session = self.open(&stmt).await?;
        let row = session.guard(session.query_first(&stmt)).await;
        session.close().await;

        let row = row?.ok_or_else(|| {
            TableError::not_found(format!("no row in {} matches the key", self.name))
        })?;
        row.try_get::<_, i64>(0)
            .map_err(|e| TableError::decode("row_position", e.to_string()))
    }
}
