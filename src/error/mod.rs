//! Error types produced by the layering engine.

mod constructors;
mod types;

pub use types::{DocumentRef, LayeringError};

use std::sync::Arc;

/// Canonical result type for this crate's public APIs.
///
/// Errors are wrapped in an `Arc` so that `Result<T, _>` stays small on the
/// success path and so callers can clone an error cheaply when logging and
/// rethrowing it.
pub type LayeringResult<T> = std::result::Result<T, Arc<LayeringError>>;
