//! Small accessors over lopdf objects.

use lopdf::{Dictionary, Document, Object};

use crate::utils::Rect;

/// Guards against `Parent` cycles in malformed page trees.
const MAX_TREE_DEPTH: usize = 32;

/// Follows a reference; unresolvable references are returned as-is.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    doc.dereference(obj).map_or(obj, |(_, target)| target)
}

pub fn number(obj: &Object) -> Option<f64> {
    match *obj {
        Object::Integer(i) => Some(i as f64),
        Object::Real(r) => Some(f64::from(r)),
        _ => None,
    }
}

/// Looks up a page attribute, walking up the page tree for inherited keys.
pub fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        node = node
            .get(b"Parent")
            .ok()
            .and_then(|parent| resolve(doc, parent).as_dict().ok())?;
    }
    None
}

/// Reads a rectangle array, normalising corner order.
pub fn rect(doc: &Document, obj: &Object) -> Option<Rect> {
    let values: Vec<f64> = obj
        .as_array()
        .ok()?
        .iter()
        .filter_map(|v| number(resolve(doc, v)))
        .collect();
    match values[..] {
        [x0, y0, x1, y1] => Some((x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))),
        _ => None,
    }
}
