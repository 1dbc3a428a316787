//! Flattening of record declarations into addressable attributes.

use crate::record::{FieldDecl, FieldKind, Record};
use parking_lot::RwLock;
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, OnceLock},
};

/// Tag value that removes a field from the mapping entirely.
pub const EXCLUDED: &str = "-";

///
/// ExtractedField
///
/// One leaf attribute: its ownership path, declared name and raw tag
/// under the requested tag key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtractedField {
    pub path: Vec<u16>,
    pub name: &'static str,
    pub tag: &'static str,
}

type ExtractCache = RwLock<HashMap<(TypeId, String), Arc<[ExtractedField]>>>;

static EXTRACTED: OnceLock<ExtractCache> = OnceLock::new();

/// Extract the attributes of `R` under `tag_key`.
///
/// The walk runs once per (type, tag key); later calls share the result.
#[must_use]
pub fn extract<R: Record>(tag_key: &str) -> Arc<[ExtractedField]> {
    let cache = EXTRACTED.get_or_init(|| RwLock::new(HashMap::new()));
    let key = (TypeId::of::<R>(), tag_key.to_string());

    if let Some(fields) = cache.read().get(&key) {
        return Arc::clone(fields);
    }

    let fields: Arc<[ExtractedField]> = extract_fields(R::FIELDS, tag_key).into();
    cache.write().insert(key, Arc::clone(&fields));

    fields
}

/// Uncached walk over a declaration list.
#[must_use]
pub fn extract_fields(decls: &'static [FieldDecl], tag_key: &str) -> Vec<ExtractedField> {
    let mut out = Vec::new();
    walk(decls, tag_key, &[], &mut out);

    out
}

fn walk(
    decls: &'static [FieldDecl],
    tag_key: &str,
    parent: &[u16],
    out: &mut Vec<ExtractedField>,
) {
    for decl in decls {
        if !decl.public {
            continue;
        }

        let tag = decl.tag(tag_key);
        if tag == EXCLUDED {
            continue;
        }

        let mut path = Vec::with_capacity(parent.len() + 1);
        path.extend_from_slice(parent);
        path.push(decl.index);

        match decl.kind {
            FieldKind::Leaf => out.push(ExtractedField {
                path,
                name: decl.name,
                tag,
            }),
            FieldKind::Embedded { fields, .. } => walk(fields, tag_key, &path, out),
        }
    }
}
