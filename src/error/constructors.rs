//! Constructors for [`LayeringError`], following the host crate's
//! named-function convention in preference to struct literals at call sites.

use std::sync::Arc;

use super::LayeringError;
use super::types::DocumentRef;

impl LayeringError {
    /// Wrap `self` in the `Arc` expected by [`super::LayeringResult`].
    #[must_use]
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Build a [`LayeringError::LayeringPolicyNotFound`].
    #[must_use]
    pub fn layering_policy_not_found(expected_schema: impl Into<String>) -> Self {
        Self::LayeringPolicyNotFound {
            expected_schema: expected_schema.into(),
        }
    }

    /// Build a [`LayeringError::LayeringPolicyMalformed`].
    #[must_use]
    pub fn layering_policy_malformed(policy: DocumentRef, reason: impl Into<String>) -> Self {
        Self::LayeringPolicyMalformed {
            policy,
            reason: reason.into(),
        }
    }

    /// Build a [`LayeringError::MissingDocumentParent`].
    #[must_use]
    pub fn missing_document_parent(document: DocumentRef) -> Self {
        Self::MissingDocumentParent { document }
    }

    /// Build a [`LayeringError::IndeterminateDocumentParent`].
    #[must_use]
    pub fn indeterminate_document_parent(document: DocumentRef, candidate_count: usize) -> Self {
        Self::IndeterminateDocumentParent {
            document,
            candidate_count,
        }
    }

    /// Build a [`LayeringError::InvalidParentSelector`].
    #[must_use]
    pub fn invalid_parent_selector(document: DocumentRef, entry_count: usize) -> Self {
        Self::InvalidParentSelector {
            document,
            entry_count,
        }
    }

    /// Build a [`LayeringError::UnsupportedActionMethod`].
    #[must_use]
    pub fn unsupported_action_method(document: DocumentRef, method: impl Into<String>) -> Self {
        Self::UnsupportedActionMethod {
            document,
            method: method.into(),
        }
    }

    /// Build a [`LayeringError::MissingDocumentKey`].
    #[must_use]
    pub fn missing_document_key(
        child: DocumentRef,
        parent: DocumentRef,
        path: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::MissingDocumentKey {
            child,
            parent,
            path: path.into(),
            key: key.into(),
        }
    }

    /// Build a [`LayeringError::InvalidDocument`].
    #[must_use]
    pub fn invalid_document(index: usize, field: impl Into<String>) -> Self {
        Self::InvalidDocument {
            index,
            field: field.into(),
        }
    }
}
