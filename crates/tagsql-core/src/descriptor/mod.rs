//! Table descriptor: columns, primary key, system columns and scope names
//! derived once from a record's extracted attributes.

mod value_gen;

pub use value_gen::{GEN_KEY, ValueGen};

use crate::{
    config::TableConfig,
    error::ConfigError,
    extract::ExtractedField,
    scope::{self, FULL, PRIMARY_KEY},
    tag::TagPairs,
};
use std::collections::BTreeSet;

/// Pair-set key under which bare tag tokens (scope names) are stored.
pub const SCOPE_KEY: &str = "scope";

/// Column name that marks the primary key when no attribute is tagged `pk`.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

///
/// Column
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    /// SQL column name.
    pub name: String,
    /// Declared attribute name.
    pub attribute: &'static str,
    pub path: Vec<u16>,
    pub tags: TagPairs,
    pub value_gen: ValueGen,
    /// Position within the table's flat column list.
    pub ordinal: usize,
}

impl Column {
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.tags.pair_exists(SCOPE_KEY, scope)
    }

    /// True when the column carries any system scope.
    #[must_use]
    pub fn is_system(&self) -> bool {
        scope::SYSTEM_SCOPES.iter().any(|s| self.has_scope(s))
    }
}

///
/// SystemColumns
///
/// Column ordinals grouped by bookkeeping role.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SystemColumns {
    pub created: Vec<usize>,
    pub updated: Vec<usize>,
    pub deleted: Vec<usize>,
    pub version: Option<usize>,
}

///
/// Descriptor
///

#[derive(Clone, Debug)]
pub struct Descriptor {
    table: String,
    columns: Vec<Column>,
    pk: Option<usize>,
    system: SystemColumns,
    scope_names: BTreeSet<String>,
}

impl Descriptor {
    pub fn build(
        table: &str,
        fields: &[ExtractedField],
        config: &TableConfig,
    ) -> Result<Self, ConfigError> {
        let columns = fields
            .iter()
            .enumerate()
            .map(|(ordinal, field)| {
                let mut tags = TagPairs::parse(field.tag, SCOPE_KEY).map_err(|source| {
                    ConfigError::MalformedTag {
                        table: table.to_string(),
                        attribute: field.name.to_string(),
                        source,
                    }
                })?;
                tags.add(SCOPE_KEY, FULL);

                Ok(Column {
                    name: (config.column_namer)(field.name, field.tag),
                    attribute: field.name,
                    path: field.path.clone(),
                    value_gen: ValueGen::for_column(tags.value(GEN_KEY)),
                    tags,
                    ordinal,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut desc = Self {
            table: table.to_string(),
            columns,
            pk: None,
            system: SystemColumns::default(),
            scope_names: BTreeSet::new(),
        };

        desc.find_primary_key(&(config.sequence_namer)(table));
        if desc.pk.is_none() && config.require_primary_key {
            return Err(ConfigError::NoPrimaryKey {
                table: table.to_string(),
            });
        }
        desc.classify_system_columns()?;
        desc.collect_scope_names();

        Ok(desc)
    }

    fn find_primary_key(&mut self, friendly_sequence: &str) {
        let pos = self
            .columns
            .iter()
            .position(|c| c.has_scope(PRIMARY_KEY))
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name == DEFAULT_PRIMARY_KEY)
            });

        if let Some(pos) = pos {
            let pk = &mut self.columns[pos];
            pk.value_gen = ValueGen::for_primary_key(pk.tags.value(GEN_KEY), friendly_sequence);
            self.pk = Some(pos);
        }
    }

    fn classify_system_columns(&mut self) -> Result<(), ConfigError> {
        for col in &self.columns {
            if col.has_scope(scope::INSERT) {
                self.system.created.push(col.ordinal);
            }
            if col.has_scope(scope::UPDATE) {
                self.system.updated.push(col.ordinal);
            }
            if col.has_scope(scope::DELETE) {
                self.system.deleted.push(col.ordinal);
            }
            if col.has_scope(scope::VERSION) {
                if let Some(first) = self.system.version {
                    return Err(ConfigError::DuplicateVersion {
                        table: self.table.clone(),
                        first: self.columns[first].attribute.to_string(),
                        second: col.attribute.to_string(),
                    });
                }
                self.system.version = Some(col.ordinal);
            }
        }

        Ok(())
    }

    fn collect_scope_names(&mut self) {
        for col in &self.columns {
            for name in col.tags.get(SCOPE_KEY) {
                if scope::is_system(name) {
                    continue;
                }
                if name != FULL && name != PRIMARY_KEY {
                    self.scope_names.insert(format!("!{name}"));
                }
                self.scope_names.insert(name.clone());
            }
        }
    }

    /// Check every token of a caller scope expression against the known
    /// scope names.
    pub fn validate_scope(&self, expr: &str) -> Result<(), ConfigError> {
        for token in expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let known = token == FULL
                || token == scope::SYSTEM
                || scope::is_system(token)
                || self.scope_names.contains(token);

            if !known {
                return Err(ConfigError::UnknownScope {
                    table: self.table.clone(),
                    scope: token.to_string(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn primary_key(&self) -> Option<&Column> {
        self.pk.map(|pos| &self.columns[pos])
    }

    /// The primary key column, or `NoPrimaryKey`.
    pub fn require_primary_key(&self) -> Result<&Column, ConfigError> {
        self.primary_key().ok_or_else(|| ConfigError::NoPrimaryKey {
            table: self.table.clone(),
        })
    }

    #[must_use]
    pub const fn system_columns(&self) -> &SystemColumns {
        &self.system
    }

    #[must_use]
    pub const fn scope_names(&self) -> &BTreeSet<String> {
        &self.scope_names
    }
}
