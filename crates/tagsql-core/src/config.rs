use crate::naming;

/// Tag key read when no other key is configured.
pub const DEFAULT_TAG: &str = "db";

pub type ColumnNamer = fn(&str, &str) -> String;
pub type ArgFormatter = fn(usize) -> String;
pub type SequenceNamer = fn(&str) -> String;

///
/// TableConfig
///
/// Registration-time settings for one table.
///

#[derive(Clone, Debug)]
pub struct TableConfig {
    pub tag: String,
    pub column_namer: ColumnNamer,
    pub arg_formatter: ArgFormatter,
    pub sequence_namer: SequenceNamer,
    pub require_primary_key: bool,
}

impl TableConfig {
    #[must_use]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    #[must_use]
    pub fn format_arg(&self, position: usize) -> String {
        (self.arg_formatter)(position)
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            column_namer: naming::snake_case_column,
            arg_formatter: naming::numbered_arg,
            sequence_namer: naming::table_sequence,
            require_primary_key: false,
        }
    }
}

///
/// TableBuilder
///

#[derive(Debug, Default)]
pub struct TableBuilder {
    config: TableConfig,
}

impl TableBuilder {
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.config.tag = tag.into();
        self
    }

    #[must_use]
    pub fn column_namer(mut self, namer: ColumnNamer) -> Self {
        self.config.column_namer = namer;
        self
    }

    #[must_use]
    pub fn arg_formatter(mut self, formatter: ArgFormatter) -> Self {
        self.config.arg_formatter = formatter;
        self
    }

    #[must_use]
    pub fn sequence_namer(mut self, namer: SequenceNamer) -> Self {
        self.config.sequence_namer = namer;
        self
    }

    #[must_use]
    pub const fn require_primary_key(mut self, require: bool) -> Self {
        self.config.require_primary_key = require;
        self
    }

    #[must_use]
    pub fn build(self) -> TableConfig {
        self.config
    }
}
