//! Compiled commands and the caches that hold them.

mod cache;
mod compiler;
mod statement;

pub use cache::{Cache, CacheStats};
pub use compiler::{CommandKey, Compiler, SOFT_DELETE, Trailing};
pub use statement::StatementKind;

use crate::{
    bind::{Binder, Buffer},
    error::{BindError, Error},
    executor::{Executer, QueryExecuter, QueryRowExecuter, Rows},
    record::Record,
    value::Value,
};
use derive_more::Display;
use std::{fmt, sync::Arc};

///
/// CommandKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum CommandKind {
    Select,
    Insert,
    InsertReturning,
    Update,
    UpdateReturning,
    Delete,
    DeleteReturning,
}

impl CommandKind {
    #[must_use]
    pub const fn is_returning(self) -> bool {
        matches!(
            self,
            Self::InsertReturning | Self::UpdateReturning | Self::DeleteReturning
        )
    }
}

///
/// UpdateBy
///
/// Row selection of an UPDATE: anchored on the primary key, or a caller
/// clause whose placeholders are numbered from 1 and follow the bound
/// record arguments.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateBy<'a> {
    PrimaryKey,
    Clause(&'a str),
}

///
/// Command
///
/// Immutable compiled statement. `binds` are the ordinals read from a
/// record as leading arguments; `scans` are the ordinals written back from
/// a result row.
///

pub struct Command<R> {
    kind: CommandKind,
    sql: String,
    binds: Vec<usize>,
    scans: Vec<usize>,
    binder: Arc<Binder<R>>,
}

impl<R: Record> Command<R> {
    pub(crate) const fn new(
        kind: CommandKind,
        sql: String,
        binds: Vec<usize>,
        scans: Vec<usize>,
        binder: Arc<Binder<R>>,
    ) -> Self {
        Self {
            kind,
            sql,
            binds,
            scans,
            binder,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn binds(&self) -> &[usize] {
        &self.binds
    }

    #[must_use]
    pub fn scans(&self) -> &[usize] {
        &self.scans
    }

    // Record arguments first, then the caller's.
    fn args(&self, record: Option<&R>, extra: &[Value]) -> Result<Buffer<'_>, BindError> {
        let mut args = match record {
            Some(record) => self.binder.args(record, &self.binds)?,
            None if self.binds.is_empty() => self.binder.slots(0),
            None => {
                return Err(BindError::MissingRecord {
                    expected: self.binds.len(),
                });
            }
        };
        args.extend_from_slice(extra);

        Ok(args)
    }

    /// Execute with arguments read from `record`, followed by `extra`.
    pub fn exec<D>(&self, db: &D, record: &R, extra: &[Value]) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        let args = self.args(Some(record), extra)?;

        db.execute(&self.sql, &args).map_err(Error::Backend)
    }

    /// Execute a command that binds nothing from a record.
    pub fn exec_args<D>(&self, db: &D, args: &[Value]) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        let args = self.args(None, args)?;

        db.execute(&self.sql, &args).map_err(Error::Backend)
    }

    /// Query one row and scan it into a fresh record.
    pub fn get<D>(&self, db: &D, args: &[Value]) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        let mut out = R::default();
        self.get_into(db, &mut out, args)?;

        Ok(out)
    }

    /// Query one row and scan it into `dest`.
    pub fn get_into<D>(&self, db: &D, dest: &mut R, args: &[Value]) -> Result<(), Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        let args = self.args(None, args)?;
        self.fetch_row(db, &args, dest)
    }

    /// Query every row, one record per row.
    pub fn get_many<D>(&self, db: &D, args: &[Value]) -> Result<Vec<R>, Error<D::Error>>
    where
        D: QueryExecuter + ?Sized,
    {
        let args = self.args(None, args)?;
        let mut rows = db.query(&self.sql, &args).map_err(Error::Backend)?;
        let mut slots = self.binder.slots(self.scans.len());

        let mut out = Vec::new();
        while rows.advance().map_err(Error::Backend)? {
            rows.scan(&mut slots).map_err(Error::Backend)?;

            let mut record = R::default();
            self.binder.scan(&mut record, &self.scans, &mut slots)?;
            out.push(record);
        }

        Ok(out)
    }

    /// Run a returning command bound to `record` and scan the returned row
    /// into a fresh record.
    pub fn query_row<D>(&self, db: &D, record: &R, extra: &[Value]) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        let args = self.args(Some(record), extra)?;

        let mut out = R::default();
        self.fetch_row(db, &args, &mut out)?;

        Ok(out)
    }

    /// Like `query_row`, scanning the returned row back into `record`.
    pub fn query_row_into<D>(
        &self,
        db: &D,
        record: &mut R,
        extra: &[Value],
    ) -> Result<(), Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        let args = self.args(Some(&*record), extra)?;

        self.fetch_row(db, &args, record)
    }

    fn fetch_row<D>(&self, db: &D, args: &[Value], dest: &mut R) -> Result<(), Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        let mut slots = self.binder.slots(self.scans.len());
        db.query_row(&self.sql, args, &mut slots)
            .map_err(Error::Backend)?;

        self.binder.scan(dest, &self.scans, &mut slots)?;

        Ok(())
    }
}

impl<R> fmt::Debug for Command<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("sql", &self.sql)
            .field("binds", &self.binds)
            .field("scans", &self.scans)
            .finish_non_exhaustive()
    }
}
