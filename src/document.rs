//! The document model: a uniform in-memory representation of a single
//! layering-engine input, deferring semantic (as opposed to structural)
//! validation to the linker.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{DocumentRef, LayeringError, LayeringResult};

/// One `{method, path}` entry of a document's `layeringDefinition.actions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    /// The method name, verbatim (validated by the action evaluator, not
    /// here — an unsupported method is a rendering-time failure, not a
    /// construction-time one).
    pub method: String,
    /// The dotted path expression (see [`crate::path`]).
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LayeringDefinition {
    layer: String,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default, rename = "parentSelector")]
    parent_selector: BTreeMap<String, String>,
    #[serde(default)]
    actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct Metadata {
    name: String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default, rename = "layeringDefinition")]
    layering_definition: Option<LayeringDefinition>,
}

/// A single parsed input document.
///
/// Construction validates only the presence of `schema` and `metadata`
/// (§4.1); layer membership and selector well-formedness are checked later,
/// by the linker, so that those errors can be reported in the context of the
/// layering policy.
#[derive(Debug, Clone)]
pub struct Document {
    schema: String,
    metadata: Metadata,
    data: Value,
    raw: Value,
}

impl Document {
    /// Parse a single top-level input value into a [`Document`].
    ///
    /// # Errors
    ///
    /// Returns [`LayeringError::InvalidDocument`] if `schema` or `metadata`
    /// is absent or the wrong shape.
    pub fn from_value(index: usize, value: Value) -> LayeringResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| LayeringError::invalid_document(index, "<root>").into_arc())?;

        let schema = obj
            .get("schema")
            .and_then(Value::as_str)
            .ok_or_else(|| LayeringError::invalid_document(index, "schema").into_arc())?
            .to_owned();

        let metadata_value = obj
            .get("metadata")
            .ok_or_else(|| LayeringError::invalid_document(index, "metadata").into_arc())?;
        let metadata: Metadata = serde_json::from_value(metadata_value.clone())
            .map_err(|_err| LayeringError::invalid_document(index, "metadata").into_arc())?;

        let data = obj
            .get("data")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        Ok(Self {
            schema,
            metadata,
            data,
            raw: value,
        })
    }

    /// Build an identity reference for use in error reporting.
    #[must_use]
    pub fn document_ref(&self) -> DocumentRef {
        DocumentRef {
            name: self.metadata.name.clone(),
            schema: self.schema.clone(),
        }
    }

    /// The document's `schema` string.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The document's `metadata.name`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The document's `metadata.labels`.
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.metadata.labels
    }

    /// Whether this document carries a `layeringDefinition`.
    #[must_use]
    pub fn is_layered(&self) -> bool {
        self.metadata.layering_definition.is_some()
    }

    /// The document's layer name, if layered.
    #[must_use]
    pub fn layer(&self) -> Option<&str> {
        self.metadata
            .layering_definition
            .as_ref()
            .map(|def| def.layer.as_str())
    }

    /// Whether this document is abstract. Only meaningful for layered
    /// documents; non-layered documents are never abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.metadata
            .layering_definition
            .as_ref()
            .is_some_and(|def| def.is_abstract)
    }

    /// The document's `parentSelector`, if layered.
    #[must_use]
    pub fn parent_selector(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata
            .layering_definition
            .as_ref()
            .map(|def| &def.parent_selector)
    }

    /// The document's `actions`, in declared order. Empty if the document is
    /// not layered or declares none.
    #[must_use]
    pub fn actions(&self) -> &[ActionSpec] {
        self.metadata
            .layering_definition
            .as_ref()
            .map_or(&[], |def| def.actions.as_slice())
    }

    /// The document's payload (`data`), as originally parsed.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.data
    }

    /// Reconstruct this document's top-level value, replacing `data` with
    /// `rendered` if given.
    #[must_use]
    pub fn to_value(&self, rendered: Option<Value>) -> Value {
        let mut obj = self
            .raw
            .as_object()
            .cloned()
            .unwrap_or_else(Map::new);
        if let Some(rendered) = rendered {
            obj.insert("data".to_owned(), rendered);
        }
        Value::Object(obj)
    }
}
