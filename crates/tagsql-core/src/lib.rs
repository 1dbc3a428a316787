//! Core runtime for tagsql: record metadata, scope parsing, clause and
//! command compilation, argument binding, and the `Table` facade.
//!
//! Nothing here talks to a database. Finished SQL text and ordered
//! `Value` arguments are handed to the capability traits in `executor`.

extern crate self as tagsql;

// public exports are one module level down
pub mod bind;
pub mod clause;
pub mod command;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod extract;
pub mod index;
pub mod naming;
pub mod record;
pub mod scope;
pub mod table;
pub mod tag;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Record vocabulary and the table facade. Traits are exported as `_` so
/// their methods resolve without name clashes.
///

pub mod prelude {
    pub use crate::{
        command::UpdateBy,
        config::TableConfig,
        error::Error,
        executor::{
            Database as _, Executer as _, QueryExecuter as _, QueryRowExecuter as _,
            Transaction as _,
        },
        record::Record as _,
        table::Table,
        value::{FieldValue as _, Value},
    };
}
