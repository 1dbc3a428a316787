//! Backend capability traits.
//!
//! The transport (connections, drivers, row decoding) lives outside this
//! crate. Commands only need to hand finished SQL text plus ordered
//! arguments to one of these traits and read ordered values back.

use crate::{error::Error, value::Value};
use tracing::warn;

///
/// Backend
///
/// Shared error type of a backend's capabilities.
///

pub trait Backend {
    type Error: std::error::Error + Send + Sync + 'static;
}

///
/// Executer
///

pub trait Executer: Backend {
    /// Run a statement and return the affected row count.
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, Self::Error>;
}

///
/// QueryRowExecuter
///

pub trait QueryRowExecuter: Backend {
    /// Run a query expected to return exactly one row and scan it into
    /// `dest`, one value per selected column.
    fn query_row(&self, sql: &str, args: &[Value], dest: &mut [Value]) -> Result<(), Self::Error>;
}

///
/// Rows
///
/// Cursor over a query result.
///

pub trait Rows {
    type Error;

    /// Move to the next row; `false` once the result is exhausted.
    fn advance(&mut self) -> Result<bool, Self::Error>;

    /// Scan the current row into `dest`.
    fn scan(&mut self, dest: &mut [Value]) -> Result<(), Self::Error>;
}

///
/// QueryExecuter
///

pub trait QueryExecuter: Backend {
    type Rows<'a>: Rows<Error = Self::Error>
    where
        Self: 'a;

    fn query<'a>(&'a self, sql: &str, args: &[Value]) -> Result<Self::Rows<'a>, Self::Error>;
}

///
/// Transaction
///

pub trait Transaction: Executer + QueryRowExecuter + QueryExecuter + Sized {
    fn commit(self) -> Result<(), Self::Error>;

    fn rollback(self) -> Result<(), Self::Error>;
}

///
/// Database
///

pub trait Database: Executer + QueryRowExecuter + QueryExecuter {
    type Tx<'a>: Transaction<Error = Self::Error>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Tx<'_>, Self::Error>;

    /// Whether `err` means "no row matched".
    fn is_not_found(&self, err: &Self::Error) -> bool;

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// A failed rollback is logged and the closure's error is returned.
    fn in_tx<'a, T, F>(&'a self, f: F) -> Result<T, Error<Self::Error>>
    where
        F: FnOnce(&Self::Tx<'a>) -> Result<T, Error<Self::Error>>,
    {
        let tx = self.begin().map_err(Error::Backend)?;

        match f(&tx) {
            Ok(out) => {
                tx.commit().map_err(Error::Backend)?;
                Ok(out)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}
