/// Tag key carrying the value generation directive.
pub const GEN_KEY: &str = "gen";

const SERIAL: &str = "serial";
const UUID: &str = "uuid";
const NO: &str = "no";

///
/// ValueGen
///
/// How a column's INSERT value is produced.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValueGen {
    /// Database default, e.g. identity/serial.
    Database,
    Uuid,
    /// Conventional `<table>_seq` style sequence.
    FriendlySequence(String),
    CustomSequence(String),
    /// Supplied by the caller as a bound argument.
    Application,
}

impl ValueGen {
    /// Primary key rule: no directive means the table's friendly sequence.
    #[must_use]
    pub fn for_primary_key(directive: Option<&str>, friendly_sequence: &str) -> Self {
        match directive {
            None | Some("") => Self::FriendlySequence(friendly_sequence.to_string()),
            Some(other) => Self::from_directive(other),
        }
    }

    /// Non-key rule: no directive means the caller supplies the value.
    #[must_use]
    pub fn for_column(directive: Option<&str>) -> Self {
        match directive {
            None | Some("") => Self::Application,
            Some(other) => Self::from_directive(other),
        }
    }

    fn from_directive(directive: &str) -> Self {
        match directive {
            SERIAL => Self::Database,
            UUID => Self::Uuid,
            NO => Self::Application,
            sequence => Self::CustomSequence(sequence.to_string()),
        }
    }

    #[must_use]
    pub const fn is_db_generated(&self) -> bool {
        !matches!(self, Self::Application)
    }

    /// INSERT value expression; `placeholder` is used for caller-supplied values.
    #[must_use]
    pub fn insert_expr(&self, placeholder: &str) -> String {
        match self {
            Self::Database => "DEFAULT".to_string(),
            Self::Uuid => "gen_random_uuid()".to_string(),
            Self::FriendlySequence(seq) | Self::CustomSequence(seq) => format!("nextval('{seq}')"),
            Self::Application => placeholder.to_string(),
        }
    }
}
