//! # pgtable
//!
//! Single-table CRUD over PostgreSQL, driven by a schema-agnostic descriptor.
//!
//! ## Features
//!
//! - **One descriptor, five statements**: a [`Descriptor`] names a key column and
//!   value, columns and values, an optional ORDER BY and LIMIT; the same shape
//!   drives insert, update, delete, read, and row-position lookups
//! - **Values are always bound**: identifiers are parsed into [`Ident`]s and
//!   interpolated, values only ever travel as `$n` parameters
//! - **Schema-agnostic reads**: rows come back as ordered [`Record`]s of dynamic
//!   [`Value`]s, whatever the table looks like
//! - **Per-call connections**: each operation opens, uses and closes its own
//!   connection; there is no pool and no shared state
//!
//! ## Example
//!
//! ```no_run
//! use pgtable::{ConnConfig, Descriptor, Table, Value};
//!
//! # async fn demo() -> pgtable::TableResult<()> {
//! let table = Table::new("fixtures", ConnConfig::from_env())?;
//!
//! // INSERT INTO fixtures VALUES ($1,$2,$3)
//! table
//!     .insert(&Descriptor::new().values([Value::from(4), Value::from("Four"), Value::from(40)]))
//!     .await?;
//!
//! // UPDATE fixtures SET col2=$1,col3=$2 WHERE col1=$3
//! table
//!     .update(&Descriptor::new().key("col1", 4).set("col2", "Four++").set("col3", 41))
//!     .await?;
//!
//! // SELECT * FROM fixtures ORDER BY col3 DESC LIMIT 2
//! let top = table
//!     .read(&Descriptor::new().order_by("col3").descending(true).limit(2))
//!     .await?;
//! for record in &top {
//!     println!("{}", record.to_json());
//! }
//!
//! // rank of col1=4 when ordered by col3
//! let rank = table
//!     .get_position(&Descriptor::new().key("col1", 4).order_by("col3"))
//!     .await?;
//! # let _ = rank;
//! # Ok(())
//! # }
//! ```
//!
//! Statements can also be rendered without a database:
//!
//! ```
//! use pgtable::{Descriptor, Ident, render_update};
//!
//! let table = Ident::parse("fixtures").unwrap();
//! let d = Descriptor::new().key_column("col1").columns(["col2", "col3"]);
//! assert_eq!(
//!     render_update(&table, &d).sql(),
//!     "UPDATE fixtures SET col2=$1,col3=$2 WHERE col1=$3"
//! );
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod ident;
pub mod materialize;
pub mod record;
pub mod session;
pub mod table;
pub mod value;

mod trace;

pub use builder::{
    Descriptor, Statement, StatementKind, render_delete, render_insert, render_position,
    render_read, render_update,
};
pub use config::ConnConfig;
pub use error::{TableError, TableResult};
pub use ident::{Ident, IdentPart, IntoIdent};
pub use materialize::{Cursor, Materialized, materialize};
pub use record::Record;
pub use session::{PgCursor, Session};
pub use table::Table;
pub use value::Value;
