use thiserror::Error as ThisError;

///
/// TagError
///
/// A raw tag token that cannot be interpreted as either a bare scope
/// name or a single `key=value` pair.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TagError {
    #[error("tag token '{token}' has more than one '='")]
    MultipleAssignments { token: String },

    #[error("tag token '{token}' has an empty key")]
    EmptyKey { token: String },

    #[error("tag token '{token}' has an empty value")]
    EmptyValue { token: String },
}

///
/// ConfigError
///
/// Programmer errors detected while registering a record type or while
/// validating caller input against it. None of these depend on data; they
/// are raised before any SQL text is built or any backend call is made.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("table '{table}': malformed tag on attribute '{attribute}': {source}")]
    MalformedTag {
        table: String,
        attribute: String,
        source: TagError,
    },

    #[error(
        "table '{table}': attributes '{first}' and '{second}' are both tagged as the version column"
    )]
    DuplicateVersion {
        table: String,
        first: String,
        second: String,
    },

    #[error("table '{table}': no primary key defined")]
    NoPrimaryKey { table: String },

    #[error("table '{table}': unknown scope '{scope}'")]
    UnknownScope { table: String, scope: String },

    #[error("field index container overflow: {detail}")]
    FieldIndexOverflow { detail: String },
}

///
/// BindError
///
/// Failures while moving values between a record instance and the
/// argument/scan buffers of a command.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindError {
    #[error("attribute '{attribute}' cannot hold a {found} value")]
    TypeMismatch {
        attribute: &'static str,
        found: &'static str,
    },

    #[error("no attribute is addressable at path {path:?}")]
    Unaddressable { path: Vec<u16> },

    #[error("ordinal {ordinal} is not registered in the field index")]
    UnknownOrdinal { ordinal: usize },

    #[error("command expects {expected} columns, backend returned {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("command binds {expected} record attributes but no record was given")]
    MissingRecord { expected: usize },
}

impl BindError {
    /// Construct a type mismatch for the given attribute and offending value.
    #[must_use]
    pub const fn mismatch(attribute: &'static str, value: &crate::value::Value) -> Self {
        Self::TypeMismatch {
            attribute,
            found: value.kind_name(),
        }
    }
}

///
/// Error
///
/// Operation-level error. Backend failures are passed through unchanged
/// in `Backend`; this crate never retries or reinterprets them.
///

#[derive(Debug, ThisError)]
pub enum Error<E> {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Backend(E),
}

impl<E> Error<E> {
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// Unwrap the backend error, if this is one.
    pub fn into_backend(self) -> Option<E> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}
