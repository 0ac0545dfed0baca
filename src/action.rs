//! The action evaluator (spec §4.4): applies one `{method, path}` action to
//! the in-progress parent-rendered payload, using the child document's own
//! payload as the source of new data.

use serde_json::{Map, Value, json};

use crate::document::ActionSpec;
use crate::error::{DocumentRef, LayeringError, LayeringResult};
use crate::merge::deep_merge;
use crate::path::{ResolvedPath, navigate, navigate_mut, parse_path};

/// Apply `action` to `overall` (the parent-rendered payload, wrapped as
/// `{"data": ...}`), using `child_payload` as the child's own data.
///
/// # Errors
///
/// Returns [`LayeringError::UnsupportedActionMethod`] for any method other
/// than `merge`, `replace`, or `delete`, and
/// [`LayeringError::MissingDocumentKey`] when the path (or terminal key, for
/// `delete`) is not present where the method requires it.
pub fn apply_action(
    action: &ActionSpec,
    child_ref: &DocumentRef,
    parent_ref: &DocumentRef,
    child_payload: &Value,
    overall: &mut Value,
) -> LayeringResult<()> {
    let resolved = parse_path(&action.path);
    let child_wrapper = json!({ "data": child_payload.clone() });

    match action.method.as_str() {
        "merge" => apply_merge(&resolved, child_ref, parent_ref, &action.path, &child_wrapper, overall),
        "replace" => apply_replace(&resolved, child_ref, parent_ref, &action.path, &child_wrapper, overall),
        "delete" => apply_delete(&resolved, child_ref, parent_ref, &action.path, overall),
        other => Err(LayeringError::unsupported_action_method(child_ref.clone(), other).into_arc()),
    }
}

fn missing_key(
    child_ref: &DocumentRef,
    parent_ref: &DocumentRef,
    path: &str,
    key: &str,
) -> std::sync::Arc<LayeringError> {
    LayeringError::missing_document_key(child_ref.clone(), parent_ref.clone(), path, key)
        .into_arc()
}

fn container_map<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Map<String, Value>> {
    navigate(value, segments).and_then(Value::as_object)
}

fn container_map_mut<'a>(
    value: &'a mut Value,
    segments: &[String],
) -> Option<&'a mut Map<String, Value>> {
    navigate_mut(value, segments).and_then(Value::as_object_mut)
}

fn apply_merge(
    resolved: &ResolvedPath,
    child_ref: &DocumentRef,
    parent_ref: &DocumentRef,
    path: &str,
    child_wrapper: &Value,
    overall: &mut Value,
) -> LayeringResult<()> {
    let child_container = container_map(child_wrapper, &resolved.segments)
        .ok_or_else(|| missing_key(child_ref, parent_ref, path, &resolved.terminal))?;
    let child_value = child_container.get(&resolved.terminal).cloned();

    let parent_container = container_map_mut(overall, &resolved.segments)
        .ok_or_else(|| missing_key(child_ref, parent_ref, path, &resolved.terminal))?;
    let parent_has_key = parent_container.contains_key(&resolved.terminal);

    match (parent_has_key, child_value) {
        (true, Some(child_value)) => {
            let both_mappings = parent_container
                .get(&resolved.terminal)
                .is_some_and(Value::is_object)
                && child_value.is_object();
            if both_mappings {
                if let Some(existing) = parent_container.get_mut(&resolved.terminal) {
                    deep_merge(existing, &child_value);
                }
            }
            // Otherwise the parent value is preserved (merge never
            // overwrites a present, non-mapping pair).
            Ok(())
        }
        (false, Some(child_value)) => {
            parent_container.insert(resolved.terminal.clone(), child_value);
            Ok(())
        }
        (_, None) => Err(missing_key(child_ref, parent_ref, path, &resolved.terminal)),
    }
}

fn apply_replace(
    resolved: &ResolvedPath,
    child_ref: &DocumentRef,
    parent_ref: &DocumentRef,
    path: &str,
    child_wrapper: &Value,
    overall: &mut Value,
) -> LayeringResult<()> {
    let child_container = container_map(child_wrapper, &resolved.segments)
        .ok_or_else(|| missing_key(child_ref, parent_ref, path, &resolved.terminal))?;
    let Some(child_value) = child_container.get(&resolved.terminal).cloned() else {
        return Err(missing_key(child_ref, parent_ref, path, &resolved.terminal));
    };

    let parent_container = container_map_mut(overall, &resolved.segments)
        .ok_or_else(|| missing_key(child_ref, parent_ref, path, &resolved.terminal))?;
    parent_container.insert(resolved.terminal.clone(), child_value);
    Ok(())
}

fn apply_delete(
    resolved: &ResolvedPath,
    child_ref: &DocumentRef,
    parent_ref: &DocumentRef,
    path: &str,
    overall: &mut Value,
) -> LayeringResult<()> {
    if resolved.segments.is_empty() && resolved.terminal == "data" {
        if let Some(obj) = overall.as_object_mut() {
            obj.insert("data".to_owned(), Value::Object(Map::new()));
        }
        return Ok(());
    }

    let parent_container = container_map_mut(overall, &resolved.segments)
        .ok_or_else(|| missing_key(child_ref, parent_ref, path, &resolved.terminal))?;
    if parent_container.remove(&resolved.terminal).is_some() {
        Ok(())
    } else {
        Err(missing_key(child_ref, parent_ref, path, &resolved.terminal))
    }
}
