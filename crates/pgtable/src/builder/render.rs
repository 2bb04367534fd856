use super::descriptor::Descriptor;
use super::statement::{Statement, StatementKind};
use crate::ident::Ident;
use crate::value::Value;
use std::fmt::Write;

fn push_idents(out: &mut String, idents: &[Ident]) {
    for (i, ident) in idents.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        ident.write_sql(out);
    }
}

fn push_placeholders(out: &mut String, count: usize) {
    for i in 1..=count {
        if i > 1 {
            out.push(',');
        }
        let _ = write!(out, "${i}");
    }
}

// An absent key renders as nothing, which the server rejects as a syntax error.
fn push_key(out: &mut String, d: &Descriptor) {
    if let Some(key) = d.key_ident() {
        key.write_sql(out);
    }
}

fn key_param(d: &Descriptor) -> Value {
    d.key_value_ref().cloned().unwrap_or(Value::Null)
}

/// `INSERT INTO <table> [(<cols>)] VALUES ($1,...,$n)`, one placeholder per value.
pub fn render_insert(table: &Ident, d: &Descriptor) -> Statement {
    let mut sql = String::from("INSERT INTO ");
    table.write_sql(&mut sql);
    if !d.column_idents().is_empty() {
        sql.push_str(" (");
        push_idents(&mut sql, d.column_idents());
        sql.push(')');
    }
    sql.push_str(" VALUES (");
    push_placeholders(&mut sql, d.column_values().len());
    sql.push(')');

    Statement::new(StatementKind::Insert, sql, d.column_values().to_vec())
}

/// `UPDATE <table> SET c1=$1,...,cN=$N WHERE <key>=$(N+1)`.
///
/// The key value is bound last, after the column values.
pub fn render_update(table: &Ident, d: &Descriptor) -> Statement {
    let mut sql = String::from("UPDATE ");
    table.write_sql(&mut sql);
    sql.push_str(" SET ");
    let mut idx = 0;
    for (i, column) in d.column_idents().iter().enumerate() {
        if i > 0 {
            sql.push(',');
        }
        idx += 1;
        column.write_sql(&mut sql);
        let _ = write!(sql, "=${idx}");
    }
    sql.push_str(" WHERE ");
    push_key(&mut sql, d);
    let _ = write!(sql, "=${}", idx + 1);

    let mut params = Vec::with_capacity(d.column_values().len() + 1);
    params.extend_from_slice(d.column_values());
    params.push(key_param(d));

    Statement::new(StatementKind::Update, sql, params)
}

/// `DELETE FROM <table> WHERE <key>=$1`.
pub fn render_delete(table: &Ident, d: &Descriptor) -> Statement {
    let mut sql = String::from("DELETE FROM ");
    table.write_sql(&mut sql);
    sql.push_str(" WHERE ");
    push_key(&mut sql, d);
    sql.push_str("=$1");

    Statement::new(StatementKind::Delete, sql, vec![key_param(d)])
}

/// `SELECT <cols|*> FROM <table> [WHERE <key>=$1] [ORDER BY <col> [DESC]] [LIMIT <n>]`.
///
/// With a key column, its value (NULL if unset) is the only bind. Without one
/// there is no WHERE clause and no bind, whatever the key value.
pub fn render_read(table: &Ident, d: &Descriptor) -> Statement {
    let mut sql = String::from("SELECT ");
    if d.column_idents().is_empty() {
        sql.push('*');
    } else {
        push_idents(&mut sql, d.column_idents());
    }
    sql.push_str(" FROM ");
    table.write_sql(&mut sql);

    if let Some(key) = d.key_ident() {
        sql.push_str(" WHERE ");
        key.write_sql(&mut sql);
        sql.push_str("=$1");
    }

    if let Some(order) = d.order_ident() {
        sql.push_str(" ORDER BY ");
        order.write_sql(&mut sql);
        if d.is_descending() {
            sql.push_str(" DESC");
        }
    }

    if d.row_limit() != 0 {
        let _ = write!(sql, " LIMIT {}", d.row_limit());
    }

    let params = match d.key_ident() {
        Some(_) => vec![key_param(d)],
        None => Vec::new(),
    };
    Statement::new(StatementKind::Select, sql, params)
}

/// 1-based rank of the row matching `<key>=$1` when the table is ordered by `order_by`.
///
/// `SELECT row_position FROM (SELECT ROW_NUMBER() OVER (ORDER BY <col> [DESC]) AS row_position,
/// <key> FROM <table>) AS ranked WHERE <key>=$1`
pub fn render_position(table: &Ident, d: &Descriptor) -> Statement {
    let mut sql = String::from("SELECT row_position FROM (SELECT ROW_NUMBER() OVER (ORDER BY ");
    if let Some(order) = d.order_ident() {
        order.write_sql(&mut sql);
    }
    if d.is_descending() {
        sql.push_str(" DESC");
    }
    sql.push_str(") AS row_position, ");
    push_key(&mut sql, d);
    sql.push_str(" FROM ");
    table.write_sql(&mut sql);
    sql.push_str(") AS ranked WHERE ");
    push_key(&mut sql, d);
    sql.push_str("=$1");

    Statement::new(StatementKind::Position, sql, vec![key_param(d)])
}
