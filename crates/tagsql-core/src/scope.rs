//! Scope names and scope-expression parsing.
//!
//! A scope expression is a comma-separated list of scope names. `*` selects
//! every column, `system` expands to the four system scopes, and `!name`
//! selects every column not tagged `name`.

/// Every column carries this scope implicitly.
pub const FULL: &str = "*";
pub const SYSTEM: &str = "system";
pub const EMPTY: &str = "";

pub const VERSION: &str = "version";
pub const INSERT: &str = "insert";
pub const UPDATE: &str = "update";
pub const DELETE: &str = "delete";

/// Scope token marking the primary key attribute.
pub const PRIMARY_KEY: &str = "pk";

pub const SYSTEM_SCOPES: [&str; 4] = [VERSION, INSERT, UPDATE, DELETE];

const NEGATION: char = '!';

#[must_use]
pub fn is_system(name: &str) -> bool {
    SYSTEM_SCOPES.contains(&name)
}

///
/// ScopeSet
///
/// Normalized scope expression. Every name lands in at most one list.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ScopeSet {
    all: bool,
    direct: Vec<String>,
    negated: Vec<String>,
    system: Vec<String>,
}

impl ScopeSet {
    /// The set that selects every column.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            all: true,
            direct: Vec::new(),
            negated: Vec::new(),
            system: Vec::new(),
        }
    }

    /// Parse `expr`, then append `extras` under the same rules.
    ///
    /// A bare name is registered on first encounter only; the expression is
    /// read before the extras, so the expression decides classification.
    #[must_use]
    pub fn parse(expr: &str, extras: &[&str]) -> Self {
        let mut set = Self::default();

        let tokens = expr.split(',').chain(extras.iter().copied());
        for token in tokens.map(str::trim).filter(|t| !t.is_empty()) {
            if token == FULL {
                return Self::all();
            }
            set.classify(token);
        }

        set
    }

    fn classify(&mut self, token: &str) {
        if token == SYSTEM {
            for name in SYSTEM_SCOPES {
                if !self.contains(name) {
                    self.system.push(name.to_string());
                }
            }
            return;
        }

        if let Some(name) = token.strip_prefix(NEGATION) {
            let name = name.trim();
            // negating a system scope has no meaning
            if name.is_empty() || is_system(name) || self.contains(name) {
                return;
            }
            self.negated.push(name.to_string());
            return;
        }

        if self.contains(token) {
            return;
        }

        if is_system(token) {
            self.system.push(token.to_string());
        } else {
            self.direct.push(token.to_string());
        }
    }

    fn contains(&self, name: &str) -> bool {
        [&self.direct, &self.negated, &self.system]
            .into_iter()
            .flatten()
            .any(|n| n == name)
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.all
    }

    #[must_use]
    pub fn direct(&self) -> &[String] {
        &self.direct
    }

    #[must_use]
    pub fn negated(&self) -> &[String] {
        &self.negated
    }

    #[must_use]
    pub fn system(&self) -> &[String] {
        &self.system
    }

    /// True when the system list names `scope` explicitly.
    #[must_use]
    pub fn names_system(&self, scope: &str) -> bool {
        self.system.iter().any(|s| s == scope)
    }
}
