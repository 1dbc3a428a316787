//! ## Crate layout
//! - `record`, `tag`, `extract`: field metadata and tag parsing.
//! - `descriptor`, `index`, `scope`: per-table column metadata and scopes.
//! - `clause`, `command`: SQL fragment and command compilation with caching.
//! - `executor`: backend capability traits.
//! - `table`: record-level operations over one registered table.
//!
//! `#[derive(Record)]` generates the field metadata; the `prelude` module
//! brings the table facade and the traits needed to call it into scope.

pub use tagsql_core::{
    bind, clause, command, config, descriptor, error, executor, extract, index, naming, record,
    scope, table, tag, value,
};

// trait and derive share a name in separate namespaces
pub use tagsql_core::record::Record;
pub use tagsql_derive::Record;

pub use tagsql_core::{error::Error, table::Table};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::Record;
    pub use tagsql_core::prelude::*;
}
