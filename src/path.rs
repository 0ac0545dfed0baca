//! The dotted path resolver (spec §4.3).
//!
//! An action's path is resolved against a *document-shaped* value — an
//! object carrying at least a `data` key — never against the bare payload
//! directly. `"."` addresses the `data` key of that wrapper itself; `".a"`
//! descends into `data` and addresses `a`. This mirrors the original
//! Python engine, which resolves paths against the whole document dict
//! (`doc['data']['a']`, not `doc['a']`).

use serde_json::Value;

/// A path expression resolved into a descent and a terminal key.
///
/// `segments` always starts with the reserved `data` key. `"."` resolves to
/// `segments: []`, `terminal: "data"` (no descent; the terminal key to
/// address, at the document's own top level, is `data` itself). `".a.b"`
/// resolves to `segments: ["data", "a"]`, `terminal: "b"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Keys to descend through, from the document root, to reach the
    /// container holding the terminal key.
    pub segments: Vec<String>,
    /// The terminal key being addressed.
    pub terminal: String,
}

/// Parse a dotted path expression, as given in an action's `path` field.
///
/// Splits on `.`, discards empty segments, and prepends the reserved `data`
/// root. The final segment becomes the terminal key; everything before it
/// is the descent to the containing object.
#[must_use]
pub fn parse_path(path: &str) -> ResolvedPath {
    let mut segments: Vec<String> = path
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    segments.insert(0, "data".to_owned());

    // `segments` always has at least the prepended "data" entry, so this
    // never returns the fallback.
    let terminal = segments.pop().unwrap_or_else(|| "data".to_owned());
    ResolvedPath { segments, terminal }
}

/// Walk `segments` from `root`, returning the container reached.
///
/// Returns `None` if an intermediate segment is absent or not an object —
/// the caller turns that into [`crate::error::LayeringError::MissingDocumentKey`].
#[must_use]
pub fn navigate<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Mutable counterpart of [`navigate`].
#[must_use]
pub fn navigate_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}
