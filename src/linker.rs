//! The parent/child linker (spec §4.6).
//!
//! Builds the forest of layered documents: for every document not in the
//! topmost layer, finds its unique parent in the immediately preceding
//! layer, matched by schema equality and single-key selector.

use std::collections::HashMap;

use crate::document::Document;
use crate::error::{LayeringError, LayeringResult};
use crate::policy::LayeringPolicy;

/// One layered document plus its resolved children, indexed by position in
/// the caller's original document slice.
#[derive(Debug, Clone)]
pub struct LinkedDocument {
    /// Index of this document in the slice passed to [`link`].
    pub index: usize,
    /// Indices (into the same slice) of this document's children, in the
    /// order they were discovered (layer order, then candidate order).
    pub children: Vec<usize>,
}

/// The linked forest: one entry per layered document, in `layerOrder` order
/// (parents before children), plus the roots (top-layer documents).
#[derive(Debug, Clone)]
pub struct LinkedForest {
    /// Layered documents, keyed by their index into the original slice.
    pub nodes: HashMap<usize, LinkedDocument>,
    /// Indices of the top-layer documents, in input order.
    pub roots: Vec<usize>,
    /// Layered document indices in `layerOrder` order (parents first,
    /// siblings in input order). Excludes nothing; every layered document
    /// appears exactly once.
    pub ordered: Vec<usize>,
}

/// Link `documents` according to `policy`.
///
/// # Errors
///
/// Returns [`LayeringError::InvalidParentSelector`] if a non-top-layer
/// document's `parentSelector` does not have exactly one entry,
/// [`LayeringError::MissingDocumentParent`] if such a document matches no
/// candidate, and [`LayeringError::IndeterminateDocumentParent`] if it
/// matches more than one.
pub fn link(documents: &[Document], policy: &LayeringPolicy) -> LayeringResult<LinkedForest> {
    let layer_index: HashMap<&str, usize> = policy
        .layer_order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let by_index = |i: usize| documents.get(i);

    let layered: Vec<usize> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.is_layered())
        .map(|(i, _)| i)
        .collect();

    let mut by_layer: Vec<Vec<usize>> = vec![Vec::new(); policy.layer_order.len()];
    for &i in &layered {
        let Some(doc) = by_index(i) else { continue };
        if let Some(&layer_idx) = doc.layer().and_then(|name| layer_index.get(name)) {
            if let Some(bucket) = by_layer.get_mut(layer_idx) {
                bucket.push(i);
            }
        }
    }

    let mut nodes: HashMap<usize, LinkedDocument> = layered
        .iter()
        .map(|&i| {
            (
                i,
                LinkedDocument {
                    index: i,
                    children: Vec::new(),
                },
            )
        })
        .collect();
    let mut parent_count: HashMap<usize, usize> = HashMap::new();

    for layer_idx in 0..by_layer.len().saturating_sub(1) {
        let parents = by_layer.get(layer_idx).cloned().unwrap_or_default();
        let children = by_layer.get(layer_idx + 1).cloned().unwrap_or_default();
        for parent_i in parents {
            let Some(parent) = by_index(parent_i) else { continue };
            for &child_i in &children {
                let Some(child) = by_index(child_i) else { continue };
                if !is_child_of(child, parent)? {
                    continue;
                }
                tracing::debug!(
                    parent = parent.name(),
                    child = child.name(),
                    "linked document to parent"
                );
                if let Some(node) = nodes.get_mut(&parent_i) {
                    node.children.push(child_i);
                }
                *parent_count.entry(child_i).or_insert(0) += 1;
            }
        }
    }

    let top_layer = by_layer.first().cloned().unwrap_or_default();
    for &i in &layered {
        if top_layer.contains(&i) {
            continue;
        }
        let Some(doc) = by_index(i) else { continue };
        let count = parent_count.get(&i).copied().unwrap_or(0);
        match count {
            0 => return Err(LayeringError::missing_document_parent(doc.document_ref()).into_arc()),
            1 => {}
            n => {
                return Err(
                    LayeringError::indeterminate_document_parent(doc.document_ref(), n).into_arc(),
                );
            }
        }
    }

    let ordered: Vec<usize> = by_layer.into_iter().flatten().collect();

    Ok(LinkedForest {
        nodes,
        roots: top_layer,
        ordered,
    })
}

fn is_child_of(child: &Document, parent: &Document) -> LayeringResult<bool> {
    if child.schema() != parent.schema() {
        return Ok(false);
    }
    let Some(selector) = child.parent_selector() else {
        return Ok(false);
    };
    if selector.len() != 1 {
        return Err(LayeringError::invalid_parent_selector(
            child.document_ref(),
            selector.len(),
        )
        .into_arc());
    }
    // `selector.len() == 1` guarantees this holds exactly one entry.
    let Some((key, value)) = selector.iter().next() else {
        return Ok(false);
    };
    Ok(parent.labels().get(key) == Some(value))
}
