//! The layering-policy loader (spec §4.5) and its companion configuration
//! type (SPEC_FULL.md §10.3).

use serde_json::Value;

use crate::document::Document;
use crate::error::{DocumentRef, LayeringError, LayeringResult};

/// The reserved schema identifier the original system uses for its
/// layering-policy control document.
pub const DEFAULT_LAYERING_POLICY_SCHEMA: &str = "deckhand/LayeringPolicy/v1";

/// Knobs governing a rendering call, beyond the document set itself.
///
/// The engine proper takes no configuration; this only exists so that a
/// caller embedding the engine in a system using a different reserved
/// identifier is not forced to fork it.
#[derive(Debug, Clone)]
pub struct LayeringOptions {
    /// The schema identifying the layering-policy control document.
    pub layering_policy_schema: String,
}

impl Default for LayeringOptions {
    fn default() -> Self {
        Self {
            layering_policy_schema: DEFAULT_LAYERING_POLICY_SCHEMA.to_owned(),
        }
    }
}

/// The located layering policy: the ordered layer names and the identity of
/// the policy document itself, retained for error-reporting context.
#[derive(Debug, Clone)]
pub struct LayeringPolicy {
    /// `layerOrder`, coarsest layer first.
    pub layer_order: Vec<String>,
    policy_ref: DocumentRef,
}

impl LayeringPolicy {
    /// Identity of the policy document this was loaded from.
    #[must_use]
    pub fn document_ref(&self) -> &DocumentRef {
        &self.policy_ref
    }
}

/// Find the unique document whose schema matches `options.layering_policy_schema`
/// and extract its `layerOrder` (I1, I2).
///
/// # Errors
///
/// Returns [`LayeringError::LayeringPolicyNotFound`] if zero or more than one
/// document carries the reserved schema, and
/// [`LayeringError::LayeringPolicyMalformed`] if `data.layerOrder` is absent,
/// not a sequence, or contains a duplicate.
pub fn load_layering_policy(
    documents: &[Document],
    options: &LayeringOptions,
) -> LayeringResult<LayeringPolicy> {
    let mut candidates = documents
        .iter()
        .filter(|doc| doc.schema() == options.layering_policy_schema);

    let policy_doc = candidates
        .next()
        .ok_or_else(|| {
            LayeringError::layering_policy_not_found(options.layering_policy_schema.clone())
                .into_arc()
        })?;
    if candidates.next().is_some() {
        return Err(LayeringError::layering_policy_not_found(
            options.layering_policy_schema.clone(),
        )
        .into_arc());
    }

    let policy_ref = policy_doc.document_ref();
    let layer_order = extract_layer_order(policy_doc, &policy_ref)?;

    Ok(LayeringPolicy {
        layer_order,
        policy_ref,
    })
}

fn extract_layer_order(
    policy_doc: &Document,
    policy_ref: &DocumentRef,
) -> LayeringResult<Vec<String>> {
    let malformed = |reason: &str| {
        LayeringError::layering_policy_malformed(policy_ref.clone(), reason.to_owned()).into_arc()
    };

    let Value::Array(entries) = policy_doc
        .payload()
        .get("layerOrder")
        .ok_or_else(|| malformed("data.layerOrder is missing"))?
    else {
        return Err(malformed("data.layerOrder is not a sequence"));
    };

    let mut layer_order = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry
            .as_str()
            .ok_or_else(|| malformed("data.layerOrder contains a non-string entry"))?;
        layer_order.push(name.to_owned());
    }

    if layer_order.is_empty() {
        return Err(malformed("data.layerOrder is empty"));
    }
    let mut sorted = layer_order.clone();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != layer_order.len() {
        return Err(malformed("data.layerOrder contains a duplicate layer name"));
    }

    Ok(layer_order)
}
