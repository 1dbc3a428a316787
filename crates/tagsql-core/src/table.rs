//! Record-level operations over one registered table.

use crate::{
    command::{CacheStats, Command, Compiler, SOFT_DELETE, StatementKind, Trailing, UpdateBy},
    config::TableConfig,
    descriptor::Descriptor,
    error::{BindError, ConfigError, Error},
    executor::{Executer, QueryExecuter, QueryRowExecuter},
    naming::plural_table_name,
    record::Record,
    scope,
    value::{FieldValue, Value},
};
use std::{any::type_name, sync::Arc};

///
/// Table
///
/// A record type bound to a table name. Every operation validates its
/// scope expressions and compiles (or reuses) its command before any
/// backend call is made.
///

#[derive(Debug)]
pub struct Table<R> {
    compiler: Compiler<R>,
}

///
/// TableStats
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TableStats {
    pub clauses: CacheStats,
    pub commands: CacheStats,
    pub statements: CacheStats,
}

impl<R: Record> Table<R> {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        Self::with_config(name, TableConfig::default())
    }

    pub fn with_config(name: &str, config: TableConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            compiler: Compiler::register(name, config)?,
        })
    }

    /// Register under the snake_case plural of the record's type name.
    pub fn plural(config: TableConfig) -> Result<Self, ConfigError> {
        Self::with_config(&plural_table_name(type_name::<R>()), config)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.compiler.descriptor().table()
    }

    #[must_use]
    pub const fn descriptor(&self) -> &Descriptor {
        self.compiler.descriptor()
    }

    #[must_use]
    pub const fn compiler(&self) -> &Compiler<R> {
        &self.compiler
    }

    /// Check a scope expression against this table's scope names.
    pub fn validate_scope(&self, expr: &str) -> Result<(), ConfigError> {
        self.descriptor().validate_scope(expr)
    }

    #[must_use]
    pub fn stats(&self) -> TableStats {
        TableStats {
            clauses: self.compiler.clause_stats(),
            commands: self.compiler.command_stats(),
            statements: self.compiler.statement_stats(),
        }
    }

    //
    // command surface
    //

    pub fn select_command(
        &self,
        scope: &str,
        trailing: &str,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler.select(scope, trailing)
    }

    pub fn insert_command(&self, scope: &str) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler.insert(scope)
    }

    pub fn insert_returning_command(
        &self,
        scope: &str,
        ret_scope: &str,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler.insert_returning(scope, ret_scope)
    }

    pub fn update_command(
        &self,
        scope: &str,
        by: UpdateBy<'_>,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler.update(scope, by)
    }

    pub fn update_returning_command(
        &self,
        scope: &str,
        ret_scope: &str,
        by: UpdateBy<'_>,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler.update_returning(scope, ret_scope, by)
    }

    pub fn delete_command(&self, trailing: &str) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler.delete(trailing)
    }

    pub fn delete_returning_command(
        &self,
        ret_scope: &str,
        trailing: &str,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.compiler
            .delete_returning(ret_scope, Trailing::Clause(trailing.to_string()))
    }

    //
    // reads
    //

    /// Every column of the row whose primary key is `pk`.
    pub fn get_by_pk<D>(&self, db: &D, pk: impl FieldValue) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .select_by_pk(scope::FULL)?
            .get(db, &[pk.to_value()])
    }

    /// Like `get_by_pk`, scanning into an existing record.
    pub fn get_by_pk_into<D>(
        &self,
        db: &D,
        dest: &mut R,
        pk: impl FieldValue,
    ) -> Result<(), Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .select_by_pk(scope::FULL)?
            .get_into(db, dest, &[pk.to_value()])
    }

    pub fn get<D>(
        &self,
        db: &D,
        scope: &str,
        trailing: &str,
        args: &[Value],
    ) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler.select(scope, trailing)?.get(db, args)
    }

    pub fn select<D>(
        &self,
        db: &D,
        scope: &str,
        trailing: &str,
        args: &[Value],
    ) -> Result<Vec<R>, Error<D::Error>>
    where
        D: QueryExecuter + ?Sized,
    {
        self.compiler.select(scope, trailing)?.get_many(db, args)
    }

    //
    // inserts
    //

    pub fn insert<D>(&self, db: &D, record: &R, scope: &str) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        self.compiler.insert(scope)?.exec(db, record, &[])
    }

    /// Insert and return the columns of `ret_scope`; the version and
    /// insert-stamp columns are always part of both scopes.
    pub fn insert_returning<D>(
        &self,
        db: &D,
        record: &R,
        scope: &str,
        ret_scope: &str,
    ) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .insert_returning(scope, ret_scope)?
            .query_row(db, record, &[])
    }

    //
    // updates
    //

    /// Update the rows matched by `trailing`. Its placeholders are numbered
    /// from 1 and bound to `args`.
    pub fn update<D>(
        &self,
        db: &D,
        record: &R,
        scope: &str,
        trailing: &str,
        args: &[Value],
    ) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        self.compiler
            .update(scope, UpdateBy::Clause(trailing))?
            .exec(db, record, args)
    }

    pub fn update_by_pk<D>(&self, db: &D, record: &R, scope: &str) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        self.compiler
            .update(scope, UpdateBy::PrimaryKey)?
            .exec(db, record, &[])
    }

    pub fn update_returning<D>(
        &self,
        db: &D,
        record: &R,
        scope: &str,
        ret_scope: &str,
        trailing: &str,
        args: &[Value],
    ) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .update_returning(scope, ret_scope, UpdateBy::Clause(trailing))?
            .query_row(db, record, args)
    }

    pub fn update_returning_by_pk<D>(
        &self,
        db: &D,
        record: &R,
        scope: &str,
        ret_scope: &str,
    ) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .update_returning(scope, ret_scope, UpdateBy::PrimaryKey)?
            .query_row(db, record, &[])
    }

    /// Set the delete and update stamps and bump the version.
    pub fn soft_delete_by_pk<D>(&self, db: &D, record: &R) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        self.compiler
            .update(SOFT_DELETE, UpdateBy::PrimaryKey)?
            .exec(db, record, &[])
    }

    /// Soft delete returning the key and system columns.
    pub fn soft_delete_returning_by_pk<D>(&self, db: &D, record: &R) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .update_returning(scope::DELETE, scope::SYSTEM, UpdateBy::PrimaryKey)?
            .query_row(db, record, &[])
    }

    /// Set the update stamp only.
    pub fn touch_by_pk<D>(&self, db: &D, record: &R) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        self.compiler
            .update(scope::UPDATE, UpdateBy::PrimaryKey)?
            .exec(db, record, &[])
    }

    //
    // deletes
    //

    pub fn delete_by_pk<D>(&self, db: &D, pk: impl FieldValue) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        let sql = self.compiler.statement(StatementKind::DeleteByPk, "")?;

        db.execute(&sql, &[pk.to_value()]).map_err(Error::Backend)
    }

    pub fn delete<D>(&self, db: &D, trailing: &str, args: &[Value]) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        self.compiler.delete(trailing)?.exec_args(db, args)
    }

    /// Delete the first row matched by `trailing` and return all of its
    /// columns.
    pub fn delete_returning<D>(
        &self,
        db: &D,
        trailing: &str,
        args: &[Value],
    ) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .delete_returning(scope::FULL, Trailing::Clause(trailing.to_string()))?
            .get(db, args)
    }

    /// Delete the row keyed by `record` and return all of its columns.
    pub fn delete_returning_by_pk<D>(&self, db: &D, record: &R) -> Result<R, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.compiler
            .delete_returning(scope::FULL, Trailing::PrimaryKey)?
            .query_row(db, record, &[])
    }

    pub fn truncate<D>(&self, db: &D) -> Result<u64, Error<D::Error>>
    where
        D: Executer + ?Sized,
    {
        let sql = self.compiler.statement(StatementKind::Truncate, "")?;

        db.execute(&sql, &[]).map_err(Error::Backend)
    }

    //
    // aggregates
    //

    pub fn exists<D>(&self, db: &D, trailing: &str, args: &[Value]) -> Result<bool, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.scalar(db, StatementKind::Exists, trailing, args)
    }

    pub fn exists_by_pk<D>(&self, db: &D, pk: impl FieldValue) -> Result<bool, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.scalar(db, StatementKind::ExistsByPk, "", &[pk.to_value()])
    }

    pub fn count<D>(&self, db: &D, trailing: &str, args: &[Value]) -> Result<u64, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
    {
        self.scalar(db, StatementKind::Count, trailing, args)
    }

    // Single-value statement scanned into `T`.
    fn scalar<D, T>(
        &self,
        db: &D,
        kind: StatementKind,
        trailing: &str,
        args: &[Value],
    ) -> Result<T, Error<D::Error>>
    where
        D: QueryRowExecuter + ?Sized,
        T: FieldValue,
    {
        let sql = self.compiler.statement(kind, trailing)?;

        let mut dest = [Value::Null];
        db.query_row(&sql, args, &mut dest)
            .map_err(Error::Backend)?;

        let [value] = dest;
        T::from_value(&value)
            .ok_or_else(|| BindError::mismatch(scalar_name(kind), &value).into())
    }
}

const fn scalar_name(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::Count => "count",
        _ => "exists",
    }
}

#[cfg(test)]
mod tests;
