//! The deep-merge primitive (spec §4.2).
//!
//! Mirrors the recursion shape of the teacher's own JSON merge helper
//! (`declarative::merge_value`) but inverts the tie-break: here the
//! destination (the parent-rendered payload) always wins a scalar/container
//! clash, since overwriting it is what `replace` is for.

use serde_json::{Map, Value};

/// Recursively merge `src` into `dst`.
///
/// - When both `dst[k]` and `src[k]` are objects, recurse.
/// - When `dst[k]` is absent, `src[k]` is copied in.
/// - Otherwise `dst[k]` is left untouched: a merge never overwrites an
///   existing value, whether or not the types match.
/// - Sequences and scalars are opaque; there is no element-wise sequence
///   merge.
pub fn deep_merge(dst: &mut Value, src: &Value) {
    let Value::Object(src_map) = src else {
        return;
    };
    if !dst.is_object() {
        *dst = Value::Object(Map::new());
    }
    let Some(dst_map) = dst.as_object_mut() else {
        return;
    };
    merge_object(dst_map, src_map);
}

fn merge_object(dst: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, src_value) in src {
        match dst.get_mut(key) {
            Some(existing) if existing.is_object() && src_value.is_object() => {
                deep_merge(existing, src_value);
            }
            Some(_existing) => {
                // dst wins: merge never overwrites an existing entry.
            }
            None => {
                dst.insert(key.clone(), src_value.clone());
            }
        }
    }
}
