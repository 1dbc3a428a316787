use derive_more::Display;

///
/// StatementKind
///
/// Fixed statements that need no clause compilation.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StatementKind {
    Exists,
    ExistsByPk,
    Count,
    Truncate,
    DeleteByPk,
}

impl StatementKind {
    /// Render the statement for `table`.
    ///
    /// `trailing` is appended to the `Exists` and `Count` forms only; the
    /// key-anchored forms use `pk_where`.
    #[must_use]
    pub fn render(self, table: &str, pk_where: &str, trailing: &str) -> String {
        match self {
            Self::Exists => format!(
                "SELECT EXISTS(SELECT 1 FROM {table} t{})",
                suffix(trailing)
            ),
            Self::ExistsByPk => format!("SELECT EXISTS(SELECT 1 FROM {table} {pk_where})"),
            Self::Count => format!("SELECT COUNT(*) FROM {table} t{}", suffix(trailing)),
            Self::Truncate => format!("TRUNCATE TABLE {table}"),
            Self::DeleteByPk => format!("DELETE FROM {table} {pk_where}"),
        }
    }

    /// Whether rendering needs a primary key.
    #[must_use]
    pub const fn is_key_anchored(self) -> bool {
        matches!(self, Self::ExistsByPk | Self::DeleteByPk)
    }
}

/// `" <clause>"`, or nothing for an empty clause.
pub(crate) fn suffix(clause: &str) -> String {
    let clause = clause.trim();
    if clause.is_empty() {
        String::new()
    } else {
        format!(" {clause}")
    }
}
