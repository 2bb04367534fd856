//! `tracing` events for statements and sessions.
//!
//! Statements are emitted at DEBUG on target `pgtable.sql` before they run;
//! session lifecycle at TRACE on `pgtable.session`. Without the `tracing`
//! feature every function here is a no-op.

use crate::builder::Statement;
use crate::ident::Ident;

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
const MAX_SQL_LEN: usize = 200;

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(feature = "tracing")]
pub(crate) fn statement(table: &Ident, stmt: &Statement) {
    let sql = stmt.sql();
    let shown = truncate_sql_bytes(sql, MAX_SQL_LEN);
    let ellipsis = if shown.len() < sql.len() { "..." } else { "" };
    tracing::debug!(
        target: "pgtable.sql",
        kind = stmt.kind().as_str(),
        table = %table,
        param_count = stmt.params().len(),
        sql = %format_args!("{shown}{ellipsis}"),
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn statement(_table: &Ident, _stmt: &Statement) {}

#[cfg(feature = "tracing")]
pub(crate) fn session_opened() {
    tracing::trace!(target: "pgtable.session", "connection opened");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn session_opened() {}

#[cfg(feature = "tracing")]
pub(crate) fn session_closed() {
    tracing::trace!(target: "pgtable.session", "connection closed");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn session_closed() {}

// The driver task has no caller to return to; this is its only outlet.
#[cfg(feature = "tracing")]
pub(crate) fn driver_error(err: &tokio_postgres::Error) {
    tracing::trace!(target: "pgtable.session", error = %err, "connection driver exited");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn driver_error(_err: &tokio_postgres::Error) {}

#[cfg(test)]
mod tests {
    use super::truncate_sql_bytes;

    #[test]
    fn truncate_keeps_short_sql() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 200), "SELECT 1");
    }

    #[test]
    fn truncate_backs_off_to_char_boundary() {
        // 'é' occupies bytes 8..10; a cut at 9 would split it.
        let sql = "SELECT 'é'";
        assert_eq!(truncate_sql_bytes(sql, 9), "SELECT '");
        assert_eq!(truncate_sql_bytes(sql, 10), "SELECT 'é");
    }
}
