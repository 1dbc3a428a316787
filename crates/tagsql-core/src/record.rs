//! Record metadata emitted by `#[derive(Record)]`.

use crate::{error::BindError, value::Value};

///
/// Record
///
/// A struct whose public fields map onto table columns.
///
/// `FIELDS` declares every struct field in declaration order. A field path
/// is one `FieldDecl::index` per nesting level; the last element addresses
/// a leaf and the preceding ones address embedded sub-records.
///

pub trait Record: Default + Send + Sync + 'static {
    const FIELDS: &'static [FieldDecl];

    /// Read the leaf at `path`.
    ///
    /// An absent optional sub-record on the way yields the leaf's zero value.
    /// Returns `None` only when `path` does not address a leaf.
    fn read_field(&self, path: &[u16]) -> Option<Value>;

    /// Write `value` into the leaf at `path`, allocating absent optional
    /// sub-records on the way.
    fn write_field(&mut self, path: &[u16], value: Value) -> Result<(), BindError>;
}

///
/// FieldDecl
///

#[derive(Debug)]
pub struct FieldDecl {
    pub name: &'static str,

    /// Declaration index within the owning struct.
    pub index: u16,

    /// Non-public fields are not addressable and never become columns.
    pub public: bool,

    /// Raw tag strings keyed by tag key, e.g. `("db", "pk,gen=serial")`.
    pub tags: &'static [(&'static str, &'static str)],

    pub kind: FieldKind,
}

impl FieldDecl {
    /// Raw tag under `key`, empty when the field carries none.
    #[must_use]
    pub fn tag(&self, key: &str) -> &'static str {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map_or("", |(_, raw)| raw)
    }
}

///
/// FieldKind
///

#[derive(Debug)]
pub enum FieldKind {
    Leaf,
    Embedded {
        fields: &'static [FieldDecl],
        optional: bool,
    },
}

impl FieldKind {
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }
}
