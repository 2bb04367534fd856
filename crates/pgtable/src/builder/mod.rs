//! Statement builder.
//!
//! Pure rendering from a table [`Ident`](crate::Ident) and a [`Descriptor`] to a
//! [`Statement`]: SQL text with `$1, $2, ...` placeholders plus the bind values
//! in placeholder order.
//!
//! ## Design
//!
//! - Identifiers are interpolated verbatim; they can only come from a parsed `Ident`.
//! - Values are never written into SQL text, only bound.
//! - Rendering does no validation and never fails. Call [`Descriptor::validate`]
//!   (the table operations do) to reject malformed descriptors before executing.

pub mod descriptor;
pub mod render;
pub mod statement;

pub use descriptor::Descriptor;
pub use render::{render_delete, render_insert, render_position, render_read, render_update};
pub use statement::{Statement, StatementKind};
