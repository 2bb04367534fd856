use crate::error::{TableError, TableResult};
use crate::ident::{Ident, IntoIdent};
use crate::value::Value;

/// Query descriptor: everything a single-table statement needs besides the table.
///
/// Identifiers are parsed as they are added; the first parse failure is kept and
/// reported by [`Descriptor::validate`], so chains stay infallible.
///
/// ```
/// use pgtable::Descriptor;
///
/// let d = Descriptor::new()
///     .key("col1", 2)
///     .set("col2", "Two++")
///     .set("col3", 21);
/// assert_eq!(d.column_idents().len(), 2);
/// assert!(d.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    key: Option<Ident>,
    key_value: Option<Value>,
    columns: Vec<Ident>,
    values: Vec<Value>,
    order_by: Option<Ident>,
    descending: bool,
    limit: u64,
    build_error: Option<String>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    fn ident(&mut self, column: impl IntoIdent) -> Option<Ident> {
        match column.into_ident() {
            Ok(ident) => Some(ident),
            Err(err) => {
                if self.build_error.is_none() {
                    self.build_error = Some(err.to_string());
                }
                None
            }
        }
    }

    fn optional_ident(&mut self, column: impl IntoIdent) -> Option<Ident> {
        match column.into_optional_ident() {
            Ok(ident) => ident,
            Err(err) => {
                if self.build_error.is_none() {
                    self.build_error = Some(err.to_string());
                }
                None
            }
        }
    }

    /// Set the key column and the value it must equal.
    pub fn key(self, column: impl IntoIdent, value: impl Into<Value>) -> Self {
        self.key_column(column).key_value(value)
    }

    /// Set only the key column. An empty name clears it.
    pub fn key_column(mut self, column: impl IntoIdent) -> Self {
        self.key = self.optional_ident(column);
        self
    }

    /// Set only the key value.
    pub fn key_value(mut self, value: impl Into<Value>) -> Self {
        self.key_value = Some(value.into());
        self
    }

    /// Replace the column list.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIdent,
    {
        self.columns.clear();
        for column in columns {
            if let Some(ident) = self.ident(column) {
                self.columns.push(ident);
            }
        }
        self
    }

    /// Append one column.
    pub fn column(mut self, column: impl IntoIdent) -> Self {
        if let Some(ident) = self.ident(column) {
            self.columns.push(ident);
        }
        self
    }

    /// Replace the value list.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Append one value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Append a column together with its value.
    pub fn set(self, column: impl IntoIdent, value: impl Into<Value>) -> Self {
        self.column(column).value(value)
    }

    /// Set the ORDER BY column. An empty name clears it.
    pub fn order_by(mut self, column: impl IntoIdent) -> Self {
        self.order_by = self.optional_ident(column);
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Maximum row count; `0` means unbounded.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn key_ident(&self) -> Option<&Ident> {
        self.key.as_ref()
    }

    pub fn key_value_ref(&self) -> Option<&Value> {
        self.key_value.as_ref()
    }

    pub fn column_idents(&self) -> &[Ident] {
        &self.columns
    }

    pub fn column_values(&self) -> &[Value] {
        &self.values
    }

    pub fn order_ident(&self) -> Option<&Ident> {
        self.order_by.as_ref()
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn row_limit(&self) -> u64 {
        self.limit
    }

    /// Validate descriptor state.
    ///
    /// Fails on a rejected identifier, a wildcard key or order column, or on
    /// `descending` without `order_by`.
    pub fn validate(&self) -> TableResult<()> {
        if let Some(err) = &self.build_error {
            return Err(TableError::Validation(err.clone()));
        }
        no_wildcard(self.key.as_ref(), "key column")?;
        no_wildcard(self.order_by.as_ref(), "order_by column")?;
        if self.descending && self.order_by.is_none() {
            return Err(TableError::validation(
                "descending order requires an order_by column",
            ));
        }
        Ok(())
    }

    /// Validation for inserts: `*` is only meaningful in a read projection.
    pub fn validate_insert(&self) -> TableResult<()> {
        self.validate()?;
        self.columns_without_wildcard()
    }

    /// Validation for statements that target one row (update, delete).
    pub fn validate_keyed(&self) -> TableResult<()> {
        self.validate()?;
        if self.key.is_none() {
            return Err(TableError::validation(
                "statement requires a key column for its WHERE clause",
            ));
        }
        Ok(())
    }

    /// Validation for updates: keyed, and every SET target is a real column.
    pub fn validate_update(&self) -> TableResult<()> {
        self.validate_keyed()?;
        self.columns_without_wildcard()
    }

    /// Validation for position lookups: key and order column are both required.
    pub fn validate_position(&self) -> TableResult<()> {
        self.validate_keyed()?;
        if self.order_by.is_none() {
            return Err(TableError::validation(
                "position lookup requires an order_by column",
            ));
        }
        Ok(())
    }

    fn columns_without_wildcard(&self) -> TableResult<()> {
        self.columns
            .iter()
            .try_for_each(|column| no_wildcard(Some(column), "write column"))
    }
}

fn no_wildcard(ident: Option<&Ident>, role: &str) -> TableResult<()> {
    match ident {
        Some(ident) if ident.has_wildcard() => Err(TableError::validation(format!(
            "{role} cannot be a wildcard: {ident}"
        ))),
        _ => Ok(()),
    }
}
