//! Clause compiler: SQL fragments for one scope set and clause kind.

use crate::{
    config::ArgFormatter,
    descriptor::{Column, Descriptor},
    error::ConfigError,
    scope::{self, ScopeSet},
};
use derive_more::Display;

///
/// ClauseKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ClauseKind {
    /// `id,name,age`
    Columns,
    /// `t.id,t.name,t.age`
    PrefixedColumns,
    /// `DEFAULT,$1,$2` or `nextval('seq'),$1` or `$1,$2,$3`
    InsertValues,
    /// `name=$2,age=$3`; `$1` is kept for the primary key in the WHERE clause
    UpdateByPk,
    /// `name=$1,age=$2`; the caller supplies the WHERE clause
    Update,
}

impl ClauseKind {
    const fn is_assignment(self) -> bool {
        matches!(self, Self::UpdateByPk | Self::Update)
    }
}

///
/// Clause
///
/// SQL text plus the column ordinals bound (or scanned) in text order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Clause {
    pub text: String,
    pub ordinals: Vec<usize>,
}

impl Clause {
    /// Compile the clause of `kind` for the columns selected by `scopes`.
    pub fn compile(
        kind: ClauseKind,
        desc: &Descriptor,
        scopes: &ScopeSet,
        format_arg: ArgFormatter,
    ) -> Result<Self, ConfigError> {
        let pk = match kind {
            ClauseKind::UpdateByPk => Some(desc.require_primary_key()?),
            _ => desc.primary_key(),
        };

        let mut clause = Self::default();
        if let Some(pk) = pk {
            clause.seed(kind, pk, format_arg);
        }

        let pk_ordinal = pk.map(|pk| pk.ordinal);
        for col in desc.columns() {
            if Some(col.ordinal) == pk_ordinal {
                continue;
            }
            if scopes.is_all() || in_scope(col, scopes) {
                clause.add(kind, col, scopes, format_arg);
            }
        }

        Ok(clause)
    }

    /// Primary key contribution, always first.
    fn seed(&mut self, kind: ClauseKind, pk: &Column, format_arg: ArgFormatter) {
        match kind {
            ClauseKind::Columns => self.join(&pk.name, Some(pk.ordinal)),
            ClauseKind::PrefixedColumns => self.join(&format!("t.{}", pk.name), Some(pk.ordinal)),
            ClauseKind::InsertValues => {
                let expr = pk.value_gen.insert_expr(&format_arg(1));
                let bound = (!pk.value_gen.is_db_generated()).then_some(pk.ordinal);
                self.join(&expr, bound);
            }
            ClauseKind::UpdateByPk => self.ordinals.push(pk.ordinal),
            ClauseKind::Update => {}
        }
    }

    fn add(&mut self, kind: ClauseKind, col: &Column, scopes: &ScopeSet, format_arg: ArgFormatter) {
        match kind {
            ClauseKind::Columns => self.join(&col.name, Some(col.ordinal)),
            ClauseKind::PrefixedColumns => self.join(&format!("t.{}", col.name), Some(col.ordinal)),
            ClauseKind::InsertValues => {
                if col.value_gen.is_db_generated() {
                    self.join(&col.value_gen.insert_expr(""), None);
                } else {
                    let arg = format_arg(self.ordinals.len() + 1);
                    self.join(&arg, Some(col.ordinal));
                }
            }
            ClauseKind::UpdateByPk | ClauseKind::Update => {
                if col.has_scope(scope::VERSION) {
                    self.join(&format!("{0}={0}+1", col.name), None);
                    return;
                }
                if skips_assignment(col, scopes) {
                    return;
                }
                let arg = format_arg(self.ordinals.len() + 1);
                self.join(&format!("{}={arg}", col.name), Some(col.ordinal));
            }
        }
    }

    fn join(&mut self, text: &str, ordinal: Option<usize>) {
        if !self.text.is_empty() {
            self.text.push(',');
        }
        self.text.push_str(text);
        self.ordinals.extend(ordinal);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of bound or scanned ordinals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }
}

/// Whether `col` is selected by a non-`all` scope set.
///
/// A direct or system match selects the column. System columns are decided
/// by that match alone. Once any negation is requested every other column
/// is opted in, and a column tagged with a negated name is dropped.
fn in_scope(col: &Column, scopes: &ScopeSet) -> bool {
    let matched = scopes
        .direct()
        .iter()
        .chain(scopes.system())
        .any(|s| col.has_scope(s));

    if col.is_system() || scopes.negated().is_empty() {
        return matched;
    }

    !scopes.negated().iter().any(|s| col.has_scope(s))
}

// Insert/delete bookkeeping columns stay out of SET lists unless the scope
// set asks for that bookkeeping scope by name.
fn skips_assignment(col: &Column, scopes: &ScopeSet) -> bool {
    [scope::INSERT, scope::DELETE]
        .into_iter()
        .any(|s| col.has_scope(s) && !scopes.names_system(s))
}
