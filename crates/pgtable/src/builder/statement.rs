use crate::value::Value;
use tokio_postgres::types::ToSql;

/// What a rendered statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
    Position,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Select => "select",
            StatementKind::Position => "position",
        }
    }

    /// Whether the statement returns rows.
    pub fn returns_rows(&self) -> bool {
        matches!(self, StatementKind::Select | StatementKind::Position)
    }
}

/// Rendered SQL text plus its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, sql: String, params: Vec<Value>) -> Self {
        Self { kind, sql, params }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind values; `params()[i]` binds `$(i+1)`.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Parameters as references compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}
