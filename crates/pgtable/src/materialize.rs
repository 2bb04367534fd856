//! Row materializer.
//!
//! Turns any [`Cursor`] into [`Record`]s without knowing the schema. The policy
//! on a bad row is best-effort-then-stop: records decoded before the failure are
//! kept, the failure is stored in [`Materialized::error`], and no further rows
//! are read.

use crate::error::{TableError, TableResult};
use crate::record::Record;
use crate::value::Value;
use std::future::Future;

/// A forward-only result cursor.
pub trait Cursor: Send {
    /// Ordered column names of the result set.
    fn column_names(&self) -> TableResult<Vec<String>>;

    /// Fetch the next row, aligned with [`Cursor::column_names`].
    ///
    /// `None` means the cursor is exhausted.
    fn next_row(&mut self) -> impl Future<Output = Option<TableResult<Vec<Value>>>> + Send;
}

/// Records read from a cursor, plus the error that stopped reading, if any.
#[derive(Debug, Default)]
pub struct Materialized {
    pub records: Vec<Record>,
    pub error: Option<TableError>,
}

impl Materialized {
    /// Whether every row was read.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Fail if reading stopped early, dropping the partial records.
    pub fn into_result(self) -> TableResult<Vec<Record>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

/// Drain `cursor` into records.
///
/// Returns `Err` only when the column names cannot be listed; row-level
/// failures end up in [`Materialized::error`].
pub async fn materialize<C: Cursor>(cursor: &mut C) -> TableResult<Materialized> {
    let columns = cursor.column_names()?;
    let mut out = Materialized::default();

    while let Some(row) = cursor.next_row().await {
        let values = match row {
            Ok(values) => values,
            Err(err) => {
                out.error = Some(err);
                break;
            }
        };
        if values.len() != columns.len() {
            out.error = Some(TableError::decode(
                "<row>",
                format!(
                    "row {} has {} values for {} columns",
                    out.records.len() + 1,
                    values.len(),
                    columns.len()
                ),
            ));
            break;
        }

        let mut record = Record::with_capacity(columns.len());
        for (column, value) in columns.iter().zip(values) {
            record.insert(column.clone(), value);
        }
        out.records.push(record);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct MemCursor {
        columns: Result<Vec<String>, String>,
        rows: VecDeque<TableResult<Vec<Value>>>,
    }

    impl MemCursor {
        fn new(columns: &[&str], rows: Vec<TableResult<Vec<Value>>>) -> Self {
            Self {
                columns: Ok(columns.iter().map(|c| c.to_string()).collect()),
                rows: rows.into(),
            }
        }
    }

    impl Cursor for MemCursor {
        fn column_names(&self) -> TableResult<Vec<String>> {
            self.columns.clone().map_err(TableError::Connection)
        }

        async fn next_row(&mut self) -> Option<TableResult<Vec<Value>>> {
            self.rows.pop_front()
        }
    }

    fn fixture_rows() -> Vec<TableResult<Vec<Value>>> {
        vec![
            Ok(vec![Value::Int(1), Value::from("One"), Value::Int(10)]),
            Ok(vec![Value::Int(2), Value::from("Two"), Value::Int(20)]),
            Ok(vec![Value::Int(3), Value::Null, Value::Float(30.5)]),
        ]
    }

    #[tokio::test]
    async fn reads_rows_in_cursor_order() {
        let mut cursor = MemCursor::new(&["col1", "col2", "col3"], fixture_rows());
        let out = materialize(&mut cursor).await.unwrap();
        assert!(out.is_complete());

        let records = out.into_result().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["col2"], Value::from("Two"));
        assert_eq!(records[2]["col2"], Value::Null);
        assert_eq!(records[2]["col3"], Value::Float(30.5));
        assert_eq!(
            records[0].columns().collect::<Vec<_>>(),
            ["col1", "col2", "col3"]
        );
    }

    #[tokio::test]
    async fn empty_cursor_yields_no_records() {
        let mut cursor = MemCursor::new(&["col1"], Vec::new());
        let out = materialize(&mut cursor).await.unwrap();
        assert!(out.is_complete());
        assert!(out.records.is_empty());
    }

    #[tokio::test]
    async fn column_listing_failure_fails_whole_read() {
        let mut cursor = MemCursor {
            columns: Err("gone".to_string()),
            rows: fixture_rows().into(),
        };
        assert!(materialize(&mut cursor).await.is_err());
    }

    #[tokio::test]
    async fn decode_failure_keeps_earlier_records() {
        let mut rows = fixture_rows();
        rows.insert(1, Err(TableError::decode("col3", "unsupported column type money")));
        let mut cursor = MemCursor::new(&["col1", "col2", "col3"], rows);

        let out = materialize(&mut cursor).await.unwrap();
        assert!(!out.is_complete());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0]["col1"], Value::Int(1));
        assert!(out.error.as_ref().is_some_and(TableError::is_decode));
        assert!(out.into_result().is_err());
    }

    #[tokio::test]
    async fn short_row_is_reported() {
        let rows = vec![Ok(vec![Value::Int(1)])];
        let mut cursor = MemCursor::new(&["col1", "col2"], rows);
        let out = materialize(&mut cursor).await.unwrap();
        assert!(out.records.is_empty());
        assert!(out.error.is_some());
    }
}
