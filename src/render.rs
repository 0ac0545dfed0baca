//! The renderer (spec §4.7): walks the linked forest top-down per root,
//! threading each layer's rendered payload into its children and evaluating
//! each child's actions against its parent's rendered payload.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::action::apply_action;
use crate::document::Document;
use crate::error::LayeringResult;
use crate::linker::LinkedForest;
use crate::policy::LayeringPolicy;

/// Render every document in `forest` against `documents`.
///
/// Returns the rendered payload for every concrete layered document, keyed
/// by its index into `documents`. Abstract documents are walked (their
/// rendered state seeds their own children) but never appear in the
/// returned map.
///
/// # Errors
///
/// Propagates any [`crate::error::LayeringError`] raised by the action
/// evaluator while rendering a document's actions.
pub fn render_forest(
    documents: &[Document],
    forest: &LinkedForest,
) -> LayeringResult<HashMap<usize, Value>> {
    let mut rendered: HashMap<usize, Value> = HashMap::new();
    let mut rendered_by_layer: HashMap<usize, Value> = HashMap::new();

    for &root_i in &forest.roots {
        let Some(root) = documents.get(root_i) else {
            continue;
        };
        let root_payload = root.payload().clone();
        rendered_by_layer.insert(0, json!({ "data": root_payload.clone() }));
        if !root.is_abstract() {
            rendered.insert(root_i, root_payload);
        }

        render_children(
            root_i,
            0,
            documents,
            forest,
            &mut rendered_by_layer,
            &mut rendered,
        )?;
    }

    Ok(rendered)
}

/// Pre-order DFS over `parent_i`'s subtree. `rendered_by_layer` must, on
/// entry, already carry the parent's (layer `parent_layer`) rendered
/// payload; this is only correct because the traversal is strict pre-order
/// — a subtree is always fully rendered before its next sibling begins, so
/// `rendered_by_layer[layer]` is always the most recently rendered document
/// at that layer along the current path, which is exactly the nearest
/// ancestor a §4.7 lookup needs.
fn render_children(
    parent_i: usize,
    parent_layer: usize,
    documents: &[Document],
    forest: &LinkedForest,
    rendered_by_layer: &mut HashMap<usize, Value>,
    rendered: &mut HashMap<usize, Value>,
) -> LayeringResult<()> {
    let Some(node) = forest.nodes.get(&parent_i) else {
        return Ok(());
    };
    let child_layer = parent_layer + 1;

    for &child_i in &node.children {
        let Some(child) = documents.get(child_i) else {
            continue;
        };
        let Some(parent_rendered) = rendered_by_layer.get(&parent_layer).cloned() else {
            continue;
        };

        let mut working = parent_rendered;
        let child_ref = child.document_ref();
        let parent_ref = documents
            .get(parent_i)
            .map(Document::document_ref)
            .unwrap_or_else(|| child_ref.clone());

        for action in child.actions() {
            apply_action(
                action,
                &child_ref,
                &parent_ref,
                child.payload(),
                &mut working,
            )?;
        }

        let child_payload = working
            .get("data")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        if child.is_abstract() {
            rendered_by_layer.insert(child_layer, working);
        } else {
            rendered.insert(child_i, child_payload);
            rendered_by_layer.insert(child_layer, working);
        }

        render_children(
            child_i,
            child_layer,
            documents,
            forest,
            rendered_by_layer,
            rendered,
        )?;
    }

    Ok(())
}

/// Reassemble `documents` into the output contract (spec §6, §4.7): each
/// layered document in `forest.ordered` order with its rendered payload
/// substituted (concrete documents only; abstract documents keep their
/// original payload), followed by passthrough documents in their original
/// input order. The policy document itself (`policy.document_ref()`) is
/// excluded.
#[must_use]
pub fn assemble_output(
    documents: &[Document],
    policy: &LayeringPolicy,
    forest: &LinkedForest,
    rendered: &HashMap<usize, Value>,
) -> Vec<Value> {
    let mut output = Vec::with_capacity(documents.len());

    for &i in &forest.ordered {
        let Some(doc) = documents.get(i) else { continue };
        let payload = if doc.is_abstract() {
            None
        } else {
            rendered.get(&i).cloned()
        };
        output.push(doc.to_value(payload));
    }

    for (i, doc) in documents.iter().enumerate() {
        if forest.ordered.contains(&i) {
            continue;
        }
        if doc.document_ref() == *policy.document_ref() {
            continue;
        }
        output.push(doc.to_value(None));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::{assemble_output, render_forest};
    use crate::document::Document;
    use crate::linker::link;
    use crate::policy::{LayeringOptions, load_layering_policy};
    use anyhow::{Result, ensure};
    use serde_json::json;

    fn parse(value: serde_json::Value, index: usize) -> Result<Document> {
        Document::from_value(index, value).map_err(|err| anyhow::anyhow!(err.to_string()))
    }

    #[test]
    fn renders_scenario_one_merge_at_root() -> Result<()> {
        let docs = vec![
            parse(
                json!({
                    "schema": "deckhand/LayeringPolicy/v1",
                    "metadata": {"name": "policy"},
                    "data": {"layerOrder": ["global", "site"]},
                }),
                0,
            )?,
            parse(
                json!({
                    "schema": "example/Kind/v1",
                    "metadata": {
                        "name": "global-1234",
                        "labels": {"key1": "value1"},
                        "layeringDefinition": {"layer": "global"},
                    },
                    "data": {"a": {"x": 1, "y": 2}, "c": 9},
                }),
                1,
            )?,
            parse(
                json!({
                    "schema": "example/Kind/v1",
                    "metadata": {
                        "name": "site-1234",
                        "layeringDefinition": {
                            "layer": "site",
                            "parentSelector": {"key1": "value1"},
                            "actions": [{"method": "merge", "path": "."}],
                        },
                    },
                    "data": {"a": {"x": 7, "z": 3}, "b": 4},
                }),
                2,
            )?,
        ];

        let policy = load_layering_policy(&docs, &LayeringOptions::default())
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let forest = link(&docs, &policy).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let rendered =
            render_forest(&docs, &forest).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let output = assemble_output(&docs, &policy, &forest, &rendered);

        ensure!(output.len() == 2);
        let site = output
            .iter()
            .find(|doc| doc.get("metadata").and_then(|m| m.get("name")) == Some(&json!("site-1234")))
            .ok_or_else(|| anyhow::anyhow!("site document missing from output"))?;
        ensure!(
            site.get("data") == Some(&json!({"a": {"x": 7, "y": 2, "z": 3}, "b": 4, "c": 9}))
        );
        Ok(())
    }

    #[test]
    fn abstract_parent_is_unchanged_in_output() -> Result<()> {
        let docs = vec![
            parse(
                json!({
                    "schema": "deckhand/LayeringPolicy/v1",
                    "metadata": {"name": "policy"},
                    "data": {"layerOrder": ["global", "site"]},
                }),
                0,
            )?,
            parse(
                json!({
                    "schema": "example/Kind/v1",
                    "metadata": {
                        "name": "global-1234",
                        "labels": {"key1": "value1"},
                        "layeringDefinition": {"layer": "global", "abstract": true},
                    },
                    "data": {"a": 1},
                }),
                1,
            )?,
            parse(
                json!({
                    "schema": "example/Kind/v1",
                    "metadata": {
                        "name": "site-1234",
                        "layeringDefinition": {
                            "layer": "site",
                            "parentSelector": {"key1": "value1"},
                            "actions": [{"method": "merge", "path": "."}],
                        },
                    },
                    "data": {"b": 2},
                }),
                2,
            )?,
        ];

        let policy = load_layering_policy(&docs, &LayeringOptions::default())
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let forest = link(&docs, &policy).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let rendered =
            render_forest(&docs, &forest).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let output = assemble_output(&docs, &policy, &forest, &rendered);

        let global = output
            .iter()
            .find(|doc| doc.get("metadata").and_then(|m| m.get("name")) == Some(&json!("global-1234")))
            .ok_or_else(|| anyhow::anyhow!("global document missing from output"))?;
        ensure!(global.get("data") == Some(&json!({"a": 1})));
        Ok(())
    }

    #[test]
    fn passthrough_documents_are_returned_unchanged() -> Result<()> {
        let docs = vec![
            parse(
                json!({
                    "schema": "deckhand/LayeringPolicy/v1",
                    "metadata": {"name": "policy"},
                    "data": {"layerOrder": ["global"]},
                }),
                0,
            )?,
            parse(
                json!({
                    "schema": "example/Other/v1",
                    "metadata": {"name": "standalone"},
                    "data": {"k": "v"},
                }),
                1,
            )?,
        ];

        let policy = load_layering_policy(&docs, &LayeringOptions::default())
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let forest = link(&docs, &policy).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let rendered =
            render_forest(&docs, &forest).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let output = assemble_output(&docs, &policy, &forest, &rendered);

        ensure!(output.len() == 1);
        ensure!(output.first() == Some(&json!({
            "schema": "example/Other/v1",
            "metadata": {"name": "standalone"},
            "data": {"k": "v"},
        })));
        Ok(())
    }
}
