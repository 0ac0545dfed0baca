//! Deterministic document layering.
//!
//! Renders a set of declarative documents — each carrying metadata and a
//! payload — into fully materialized configuration by composing them in
//! layers. A distinguished layering-policy document declares the precedence
//! order (coarsest layer first); every other layered document declares
//! which layer it belongs to, an optional parent selector, and an ordered
//! list of `{method, path}` actions describing how its payload transforms
//! its parent's rendered payload.
//!
//! The entry point is [`render_documents`] (or [`render_documents_with_options`]
//! for a non-default layering-policy schema).

mod action;
mod document;
mod error;
mod linker;
mod merge;
mod path;
mod policy;
mod render;

pub use document::{ActionSpec, Document};
pub use error::{DocumentRef, LayeringError, LayeringResult};
pub use linker::{LinkedDocument, LinkedForest};
pub use policy::{DEFAULT_LAYERING_POLICY_SCHEMA, LayeringOptions, LayeringPolicy};

use serde_json::Value;

/// Render `documents` using the default layering-policy schema
/// ([`DEFAULT_LAYERING_POLICY_SCHEMA`]).
///
/// # Errors
///
/// See [`render_documents_with_options`].
pub fn render_documents(documents: Vec<Value>) -> LayeringResult<Vec<Value>> {
    render_documents_with_options(documents, &LayeringOptions::default())
}

/// Render `documents` according to `options`.
///
/// Parses each value into a [`Document`] (§4.1), locates the unique
/// layering-policy document and its `layerOrder` (§4.5), links every
/// layered document to its parent (§4.6), and walks the resulting forest
/// top-down, applying each document's actions against its parent's
/// rendered payload (§4.7). Returns the layered documents in `layerOrder`
/// order (parents first) followed by passthrough documents in their
/// original input order; the layering-policy document itself is excluded.
///
/// # Errors
///
/// Returns [`LayeringError::InvalidDocument`] if an input value lacks
/// `schema` or `metadata`; [`LayeringError::LayeringPolicyNotFound`] or
/// [`LayeringError::LayeringPolicyMalformed`] for a missing or malformed
/// policy document; [`LayeringError::InvalidParentSelector`],
/// [`LayeringError::MissingDocumentParent`], or
/// [`LayeringError::IndeterminateDocumentParent`] for a linking failure;
/// and [`LayeringError::UnsupportedActionMethod`] or
/// [`LayeringError::MissingDocumentKey`] for a rendering failure.
#[tracing::instrument(skip_all, fields(document_count = documents.len()))]
pub fn render_documents_with_options(
    documents: Vec<Value>,
    options: &LayeringOptions,
) -> LayeringResult<Vec<Value>> {
    let parsed: Vec<Document> = documents
        .into_iter()
        .enumerate()
        .map(|(i, value)| Document::from_value(i, value))
        .collect::<LayeringResult<_>>()?;

    let policy = policy::load_layering_policy(&parsed, options)?;
    let forest = linker::link(&parsed, &policy)?;
    let rendered = render::render_forest(&parsed, &forest)?;

    Ok(render::assemble_output(&parsed, &policy, &forest, &rendered))
}

#[cfg(test)]
mod tests {
    use super::render_documents;
    use anyhow::{Result, ensure};
    use serde_json::json;

    #[test]
    fn end_to_end_scenario_two_replace() -> Result<()> {
        let documents = vec![
            json!({
                "schema": "deckhand/LayeringPolicy/v1",
                "metadata": {"name": "policy"},
                "data": {"layerOrder": ["global", "site"]},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "global-1234",
                    "labels": {"key1": "value1"},
                    "layeringDefinition": {"layer": "global"},
                },
                "data": {"a": {"x": 1, "y": 2}, "c": 9},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "site-1234",
                    "layeringDefinition": {
                        "layer": "site",
                        "parentSelector": {"key1": "value1"},
                        "actions": [{"method": "replace", "path": ".a"}],
                    },
                },
                "data": {"a": {"x": 7, "z": 3}, "b": 4},
            }),
        ];

        let rendered = render_documents(documents).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        ensure!(rendered.len() == 2);
        let site = rendered
            .iter()
            .find(|doc| doc.get("metadata").and_then(|m| m.get("name")) == Some(&json!("site-1234")))
            .ok_or_else(|| anyhow::anyhow!("site document missing from output"))?;
        ensure!(site.get("data") == Some(&json!({"a": {"x": 7, "z": 3}, "c": 9})));
        Ok(())
    }

    #[test]
    fn end_to_end_scenario_three_layer_replace_then_merge() -> Result<()> {
        let documents = vec![
            json!({
                "schema": "deckhand/LayeringPolicy/v1",
                "metadata": {"name": "policy"},
                "data": {"layerOrder": ["global", "region", "site"]},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "global-1234",
                    "labels": {"key1": "value1"},
                    "layeringDefinition": {"layer": "global"},
                },
                "data": {"a": {"x": 1, "y": 2}},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "region-1234",
                    "labels": {"key2": "value2"},
                    "layeringDefinition": {
                        "layer": "region",
                        "parentSelector": {"key1": "value1"},
                        "actions": [{"method": "replace", "path": ".a"}],
                    },
                },
                "data": {"a": {"z": 3}},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "site-1234",
                    "layeringDefinition": {
                        "layer": "site",
                        "parentSelector": {"key2": "value2"},
                        "actions": [{"method": "merge", "path": "."}],
                    },
                },
                "data": {"b": 4},
            }),
        ];

        let rendered = render_documents(documents).map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let site = rendered
            .iter()
            .find(|doc| doc.get("metadata").and_then(|m| m.get("name")) == Some(&json!("site-1234")))
            .ok_or_else(|| anyhow::anyhow!("site document missing from output"))?;
        ensure!(site.get("data") == Some(&json!({"a": {"z": 3}, "b": 4})));
        Ok(())
    }

    #[test]
    fn site_document_with_no_matching_global_parent_fails() -> Result<()> {
        let documents = vec![
            json!({
                "schema": "deckhand/LayeringPolicy/v1",
                "metadata": {"name": "policy"},
                "data": {"layerOrder": ["global", "site"]},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "global-1234",
                    "labels": {"key1": "value1"},
                    "layeringDefinition": {"layer": "global"},
                },
                "data": {},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "site-1234",
                    "layeringDefinition": {
                        "layer": "site",
                        "parentSelector": {"key1": "no-such-value"},
                    },
                },
                "data": {},
            }),
        ];

        let Err(err) = render_documents(documents) else {
            anyhow::bail!("expected an unmatched parent selector to fail");
        };
        ensure!(matches!(
            *err,
            crate::error::LayeringError::MissingDocumentParent { .. }
        ));
        Ok(())
    }

    #[test]
    fn two_global_parents_matching_one_site_selector_is_indeterminate() -> Result<()> {
        let documents = vec![
            json!({
                "schema": "deckhand/LayeringPolicy/v1",
                "metadata": {"name": "policy"},
                "data": {"layerOrder": ["global", "site"]},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "global-a",
                    "labels": {"key1": "value1"},
                    "layeringDefinition": {"layer": "global"},
                },
                "data": {},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "global-b",
                    "labels": {"key1": "value1"},
                    "layeringDefinition": {"layer": "global"},
                },
                "data": {},
            }),
            json!({
                "schema": "example/Kind/v1",
                "metadata": {
                    "name": "site-1234",
                    "layeringDefinition": {
                        "layer": "site",
                        "parentSelector": {"key1": "value1"},
                    },
                },
                "data": {},
            }),
        ];

        let Err(err) = render_documents(documents) else {
            anyhow::bail!("expected two matching global parents to be indeterminate");
        };
        ensure!(matches!(
            *err,
            crate::error::LayeringError::IndeterminateDocumentParent { .. }
        ));
        Ok(())
    }
}
