use super::{
    Cache, CacheStats, Command, CommandKind, StatementKind, UpdateBy, statement::suffix,
};
use crate::{
    bind::Binder,
    clause::{Clause, ClauseKind},
    config::TableConfig,
    descriptor::Descriptor,
    error::ConfigError,
    extract::extract,
    index::FieldIndex,
    naming::{numbered_prefix, shift_placeholders},
    record::Record,
    scope::{self, ScopeSet},
};
use std::{fmt, sync::Arc};
use tracing::debug;

/// Scope of the soft-delete assignment: the delete marker plus the update
/// stamp and version bump.
pub const SOFT_DELETE: &str = "delete,update,version";

const RETURNING_INSERT: [&str; 2] = [scope::VERSION, scope::INSERT];
const RETURNING_UPDATE: [&str; 2] = [scope::VERSION, scope::UPDATE];

///
/// Trailing
///
/// Text after the main statement body. `PrimaryKey` renders the table's
/// key-anchored WHERE clause.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Trailing {
    PrimaryKey,
    Clause(String),
}

impl From<UpdateBy<'_>> for Trailing {
    fn from(by: UpdateBy<'_>) -> Self {
        match by {
            UpdateBy::PrimaryKey => Self::PrimaryKey,
            UpdateBy::Clause(clause) => Self::Clause(clause.to_string()),
        }
    }
}

///
/// CommandKey
///
/// Everything a command depends on besides the table itself.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CommandKey {
    pub kind: CommandKind,
    pub arg_scope: String,
    pub ret_scope: String,
    pub trailing: Trailing,
}

impl CommandKey {
    fn new(kind: CommandKind, arg_scope: &str, ret_scope: &str, trailing: Trailing) -> Self {
        Self {
            kind,
            arg_scope: arg_scope.to_string(),
            ret_scope: ret_scope.to_string(),
            trailing,
        }
    }
}

///
/// Compiler
///
/// Per-table command compiler. Clauses, commands and fixed statements are
/// each memoized; scope expressions are validated before anything is built.
///

pub struct Compiler<R> {
    desc: Descriptor,
    config: TableConfig,
    binder: Arc<Binder<R>>,
    pk_where: Option<String>,
    arg_prefix: Option<String>,
    clauses: Cache<(ClauseKind, ScopeSet), Clause>,
    commands: Cache<CommandKey, Command<R>>,
    statements: Cache<(StatementKind, String), String>,
}

impl<R: Record> Compiler<R> {
    /// Extract `R`, build its descriptor and field index, and compile the
    /// key-anchored commands up front.
    pub fn register(table: &str, config: TableConfig) -> Result<Self, ConfigError> {
        let fields = extract::<R>(&config.tag);
        let desc = Descriptor::build(table, &fields, &config)?;
        let index = FieldIndex::from_paths(fields.iter().map(|f| f.path.as_slice()))?;

        debug!(
            table,
            columns = desc.columns().len(),
            primary_key = desc.primary_key().map_or("-", |pk| pk.name.as_str()),
            scopes = desc.scope_names().len(),
            "table registered"
        );

        let compiler = Self::new(desc, config, Arc::new(Binder::new(index)));
        compiler.warm()?;

        Ok(compiler)
    }

    #[must_use]
    pub fn new(desc: Descriptor, config: TableConfig, binder: Arc<Binder<R>>) -> Self {
        let pk_where = desc
            .primary_key()
            .map(|pk| format!("WHERE {}={}", pk.name, config.format_arg(1)));
        let arg_prefix = numbered_prefix(config.arg_formatter);

        Self {
            desc,
            config,
            binder,
            pk_where,
            arg_prefix,
            clauses: Cache::new("clause"),
            commands: Cache::new("command"),
            statements: Cache::new("statement"),
        }
    }

    /// Compile the commands every keyed table uses, so the first calls
    /// never miss.
    pub fn warm(&self) -> Result<(), ConfigError> {
        if self.pk_where.is_none() {
            return Ok(());
        }

        self.select_by_pk(scope::FULL)?;
        self.update_returning(scope::FULL, scope::FULL, UpdateBy::PrimaryKey)?;
        self.update(SOFT_DELETE, UpdateBy::PrimaryKey)?;
        self.statement(StatementKind::DeleteByPk, "")?;

        Ok(())
    }

    #[must_use]
    pub const fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    #[must_use]
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub const fn binder(&self) -> &Arc<Binder<R>> {
        &self.binder
    }

    /// `WHERE <pk>=<first placeholder>`, for keyed tables.
    #[must_use]
    pub fn pk_where(&self) -> Option<&str> {
        self.pk_where.as_deref()
    }

    fn require_pk_where(&self) -> Result<&str, ConfigError> {
        self.pk_where
            .as_deref()
            .ok_or_else(|| ConfigError::NoPrimaryKey {
                table: self.desc.table().to_string(),
            })
    }

    //
    // commands
    //

    pub fn select(&self, scope: &str, trailing: &str) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::Select,
            scope,
            scope::EMPTY,
            Trailing::Clause(trailing.to_string()),
        ))
    }

    pub fn select_by_pk(&self, scope: &str) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::Select,
            scope,
            scope::EMPTY,
            Trailing::PrimaryKey,
        ))
    }

    pub fn insert(&self, scope: &str) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::Insert,
            scope,
            scope::EMPTY,
            Trailing::Clause(String::new()),
        ))
    }

    pub fn insert_returning(
        &self,
        arg_scope: &str,
        ret_scope: &str,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::InsertReturning,
            arg_scope,
            ret_scope,
            Trailing::Clause(String::new()),
        ))
    }

    pub fn update(&self, scope: &str, by: UpdateBy<'_>) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::Update,
            scope,
            scope::EMPTY,
            by.into(),
        ))
    }

    pub fn update_returning(
        &self,
        arg_scope: &str,
        ret_scope: &str,
        by: UpdateBy<'_>,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::UpdateReturning,
            arg_scope,
            ret_scope,
            by.into(),
        ))
    }

    pub fn delete(&self, trailing: &str) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::Delete,
            scope::EMPTY,
            scope::EMPTY,
            Trailing::Clause(trailing.to_string()),
        ))
    }

    pub fn delete_returning(
        &self,
        ret_scope: &str,
        trailing: Trailing,
    ) -> Result<Arc<Command<R>>, ConfigError> {
        self.command(CommandKey::new(
            CommandKind::DeleteReturning,
            scope::EMPTY,
            ret_scope,
            trailing,
        ))
    }

    /// Cached command for `key`, compiled on a miss.
    pub fn command(&self, key: CommandKey) -> Result<Arc<Command<R>>, ConfigError> {
        let build_key = key.clone();

        self.commands.get_or_build(key, || self.build(&build_key))
    }

    /// Cached fixed statement. `trailing` is ignored by the key-anchored
    /// kinds.
    pub fn statement(&self, kind: StatementKind, trailing: &str) -> Result<Arc<String>, ConfigError> {
        let trailing = if kind.is_key_anchored() { "" } else { trailing };

        self.statements
            .get_or_build((kind, trailing.to_string()), || {
                let pk_where = if kind.is_key_anchored() {
                    self.require_pk_where()?
                } else {
                    ""
                };

                Ok(kind.render(self.desc.table(), pk_where, trailing))
            })
    }

    //
    // building
    //

    fn build(&self, key: &CommandKey) -> Result<Command<R>, ConfigError> {
        self.desc.validate_scope(&key.arg_scope)?;
        self.desc.validate_scope(&key.ret_scope)?;

        let table = self.desc.table();
        let by_pk = key.trailing == Trailing::PrimaryKey;

        let (sql, binds, scans) = match key.kind {
            CommandKind::Select => {
                let cols = self.clause(ClauseKind::PrefixedColumns, &key.arg_scope, &[])?;
                let trailing = self.trailing(&key.trailing, 0)?;

                (
                    format!("SELECT {} FROM {table} t{trailing}", cols.text),
                    Vec::new(),
                    cols.ordinals.clone(),
                )
            }

            CommandKind::Insert => {
                let cols = self.clause(ClauseKind::Columns, &key.arg_scope, &[])?;
                let vals = self.clause(ClauseKind::InsertValues, &key.arg_scope, &[])?;

                (
                    format!("INSERT INTO {table} ({}) VALUES ({})", cols.text, vals.text),
                    vals.ordinals.clone(),
                    Vec::new(),
                )
            }

            CommandKind::InsertReturning => {
                let cols = self.clause(ClauseKind::Columns, &key.arg_scope, &RETURNING_INSERT)?;
                let vals =
                    self.clause(ClauseKind::InsertValues, &key.arg_scope, &RETURNING_INSERT)?;
                let rets = self.clause(ClauseKind::Columns, &key.ret_scope, &RETURNING_INSERT)?;

                (
                    format!(
                        "INSERT INTO {table} ({}) VALUES ({}) RETURNING {}",
                        cols.text, vals.text, rets.text
                    ),
                    vals.ordinals.clone(),
                    rets.ordinals.clone(),
                )
            }

            CommandKind::Update | CommandKind::UpdateReturning => {
                let returning = key.kind == CommandKind::UpdateReturning;
                let extras: &[&str] = if returning { &RETURNING_UPDATE } else { &[] };

                let kind = if by_pk {
                    ClauseKind::UpdateByPk
                } else {
                    ClauseKind::Update
                };
                let set = self.clause(kind, &key.arg_scope, extras)?;
                let trailing = self.trailing(&key.trailing, set.len())?;

                let mut sql = format!("UPDATE {table} SET {}{trailing}", set.text);
                let mut scans = Vec::new();
                if returning {
                    let rets = self.clause(ClauseKind::Columns, &key.ret_scope, extras)?;
                    sql.push_str(" RETURNING ");
                    sql.push_str(&rets.text);
                    scans.clone_from(&rets.ordinals);
                }

                (sql, set.ordinals.clone(), scans)
            }

            CommandKind::Delete | CommandKind::DeleteReturning => {
                let binds = if by_pk {
                    vec![self.desc.require_primary_key()?.ordinal]
                } else {
                    Vec::new()
                };
                let trailing = self.trailing(&key.trailing, 0)?;

                let mut sql = format!("DELETE FROM {table}{trailing}");
                let mut scans = Vec::new();
                if key.kind == CommandKind::DeleteReturning {
                    let rets = self.clause(ClauseKind::Columns, &key.ret_scope, &[])?;
                    sql.push_str(" RETURNING ");
                    sql.push_str(&rets.text);
                    scans.clone_from(&rets.ordinals);
                }

                (sql, binds, scans)
            }
        };

        debug!(table, kind = %key.kind, %sql, "command compiled");

        Ok(Command::new(
            key.kind,
            sql,
            binds,
            scans,
            Arc::clone(&self.binder),
        ))
    }

    /// Cached clause for a scope expression parsed with `extras`.
    fn clause(
        &self,
        kind: ClauseKind,
        expr: &str,
        extras: &[&str],
    ) -> Result<Arc<Clause>, ConfigError> {
        let scopes = ScopeSet::parse(expr, extras);
        let build_scopes = scopes.clone();

        self.clauses.get_or_build((kind, scopes), || {
            Clause::compile(kind, &self.desc, &build_scopes, self.config.arg_formatter)
        })
    }

    /// Rendered trailing text with its leading space. Caller clauses that
    /// follow `bound` record arguments are renumbered past them when the
    /// formatter is numbered; positional placeholders need no shift.
    fn trailing(&self, trailing: &Trailing, bound: usize) -> Result<String, ConfigError> {
        match (trailing, self.arg_prefix.as_deref()) {
            (Trailing::PrimaryKey, _) => Ok(suffix(self.require_pk_where()?)),
            (Trailing::Clause(clause), Some(prefix)) if bound > 0 => {
                Ok(suffix(&shift_placeholders(clause, prefix, bound + 1)))
            }
            (Trailing::Clause(clause), _) => Ok(suffix(clause)),
        }
    }

    //
    // stats
    //

    #[must_use]
    pub fn command_stats(&self) -> CacheStats {
        self.commands.stats()
    }

    #[must_use]
    pub fn clause_stats(&self) -> CacheStats {
        self.clauses.stats()
    }

    #[must_use]
    pub fn statement_stats(&self) -> CacheStats {
        self.statements.stats()
    }
}

impl<R> fmt::Debug for Compiler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("table", &self.desc.table())
            .field("pk_where", &self.pk_where)
            .finish_non_exhaustive()
    }
}
