//! Primary error enum for the document-layering engine.

use thiserror::Error;

/// Identity of a document, carried by errors for diagnosis.
///
/// Documents have no single unique identifier in the input contract; `name`
/// and `schema` together are what an operator needs to locate the offending
/// document in its source bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// `metadata.name` of the offending document.
    pub name: String,
    /// `schema` of the offending document.
    pub schema: String,
}

/// Errors that can occur while rendering a set of layered documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LayeringError {
    /// No document in the input carries the reserved layering-policy schema.
    #[error("no document with schema '{expected_schema}' was found in the input")]
    LayeringPolicyNotFound {
        /// The schema the loader was looking for.
        expected_schema: String,
    },

    /// The layering policy's `data.layerOrder` is absent, not a sequence, or
    /// contains duplicate layer names.
    #[error("layering policy {policy:?} is malformed: {reason}")]
    LayeringPolicyMalformed {
        /// Identity of the policy document.
        policy: DocumentRef,
        /// Human-readable explanation of the defect.
        reason: String,
    },

    /// A non-top-layer document has no parent satisfying I5 and its selector.
    #[error("document {document:?} has no parent in the preceding layer")]
    MissingDocumentParent {
        /// Identity of the orphaned document.
        document: DocumentRef,
    },

    /// A non-top-layer document has two or more candidate parents.
    #[error("document {document:?} matches more than one candidate parent")]
    IndeterminateDocumentParent {
        /// Identity of the ambiguous document.
        document: DocumentRef,
        /// Number of candidate parents found.
        candidate_count: usize,
    },

    /// An action's `parentSelector` does not have exactly one entry.
    #[error(
        "document {document:?} has a parentSelector with {entry_count} entries; exactly one is required"
    )]
    InvalidParentSelector {
        /// Identity of the document carrying the malformed selector.
        document: DocumentRef,
        /// Number of entries found in the selector.
        entry_count: usize,
    },

    /// An action's `method` is not one of `merge`, `replace`, or `delete`.
    #[error("document {document:?} uses unsupported action method '{method}'")]
    UnsupportedActionMethod {
        /// Identity of the document whose action is malformed.
        document: DocumentRef,
        /// The unsupported method string, verbatim.
        method: String,
    },

    /// An action's path refers to a key absent where the method requires it.
    #[error(
        "action on document {child:?} (parent {parent:?}) references missing key '{key}' at path '{path}'"
    )]
    MissingDocumentKey {
        /// Identity of the child document whose action failed.
        child: DocumentRef,
        /// Identity of the parent document being rendered into.
        parent: DocumentRef,
        /// The dotted path given by the action.
        path: String,
        /// The terminal key that was missing.
        key: String,
    },

    /// A top-level input value is missing `schema` or `metadata`.
    #[error("input document at index {index} is missing required field '{field}'")]
    InvalidDocument {
        /// Position of the offending value in the input sequence.
        index: usize,
        /// Name of the missing top-level field.
        field: String,
    },
}
