//! Trusted SQL identifiers.
//!
//! Table and column names are interpolated into statement text, while values are
//! always bound. [`Ident`] is the only way a name reaches the SQL text, and it can
//! only hold:
//!
//! - unquoted segments matching `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted segments (any characters except NUL, `"` escaped as `""`)
//! - a trailing `*` wildcard (`*` or `t.*`)
//!
//! Segments may be dotted (`public.fixtures`). Unquoted segments render verbatim.
//!
//! # Example
//! ```
//! use pgtable::Ident;
//!
//! let t = Ident::parse("public.fixtures")?;
//! assert_eq!(t.to_sql(), "public.fixtures");
//! assert!(Ident::parse("col1; DROP TABLE x").is_err());
//! # Ok::<(), pgtable::TableError>(())
//! ```

use crate::error::{TableError, TableResult};
use std::fmt;
use std::str::FromStr;

/// A segment of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
    /// `*`, only valid as the last segment.
    Wildcard,
}

/// A trusted SQL identifier (table, column, or `*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

impl Ident {
    /// The bare `*` projection.
    pub fn wildcard() -> Self {
        Self {
            parts: vec![IdentPart::Wildcard],
        }
    }

    /// Create a single quoted identifier from a raw name.
    pub fn quoted(name: &str) -> TableResult<Self> {
        if name.is_empty() {
            return Err(TableError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(TableError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse an identifier string.
    ///
    /// - Dotted: `schema.table`
    /// - Quoted: `"CamelCase"."Fixtures"`
    /// - Wildcard: `*`, `fixtures.*`
    pub fn parse(s: &str) -> TableResult<Self> {
        if s.is_empty() {
            return Err(TableError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(TableError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if parts.last() == Some(&IdentPart::Wildcard) {
                return Err(TableError::validation(
                    "'*' must be the last identifier segment",
                ));
            }

            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(TableError::validation("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(TableError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            match chars.peek() {
                Some('*') => {
                    chars.next();
                    parts.push(IdentPart::Wildcard);
                    continue;
                }
                Some('"') => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('"') => {
                                if chars.peek() == Some(&'"') {
                                    chars.next();
                                    name.push('"');
                                } else {
                                    break;
                                }
                            }
                            Some(c) => name.push(c),
                            None => {
                                return Err(TableError::validation("Unclosed quoted identifier"));
                            }
                        }
                    }
                    if name.is_empty() {
                        return Err(TableError::validation("Empty quoted identifier"));
                    }
                    parts.push(IdentPart::Quoted(name));
                    continue;
                }
                _ => {}
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let ok = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !ok {
                    return Err(TableError::validation(format!(
                        "Invalid character in identifier '{s}': '{c}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(TableError::validation("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        Ok(Self { parts })
    }

    /// Whether this is the bare `*` projection.
    pub fn is_wildcard(&self) -> bool {
        self.parts == [IdentPart::Wildcard]
    }

    /// Whether the identifier ends in `*` (`*` or `t.*`), so it can only be a
    /// projection.
    pub fn has_wildcard(&self) -> bool {
        self.parts.last() == Some(&IdentPart::Wildcard)
    }

    /// The identifier's segments.
    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Wildcard => out.push('*'),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    for ch in s.chars() {
                        if ch == '"' {
                            out.push_str("\"\"");
                        } else {
                            out.push(ch);
                        }
                    }
                    out.push('"');
                }
            }
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl FromStr for Ident {
    type Err = TableError;

    fn from_str(s: &str) -> TableResult<Self> {
        Self::parse(s)
    }
}

/// Convert an input into an [`Ident`].
///
/// Lets descriptor and table constructors take `&str`, `String`, or a parsed `Ident`.
pub trait IntoIdent {
    fn into_ident(self) -> TableResult<Ident>;

    /// Like [`IntoIdent::into_ident`], but an empty name means "no identifier".
    fn into_optional_ident(self) -> TableResult<Option<Ident>>
    where
        Self: Sized,
    {
        self.into_ident().map(Some)
    }
}

impl IntoIdent for Ident {
    fn into_ident(self) -> TableResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> TableResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> TableResult<Ident> {
        Ident::parse(self)
    }

    fn into_optional_ident(self) -> TableResult<Option<Ident>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ident::parse(self).map(Some)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> TableResult<Ident> {
        Ident::parse(&self)
    }

    fn into_optional_ident(self) -> TableResult<Option<Ident>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ident::parse(&self).map(Some)
    }
}

impl IntoIdent for &String {
    fn into_ident(self) -> TableResult<Ident> {
        Ident::parse(self)
    }

    fn into_optional_ident(self) -> TableResult<Option<Ident>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ident::parse(self).map(Some)
    }
}
