//! Error types.
//!
//! The cursor engine is mostly total: positions are clamped rather than rejected. The only
//! failures are contract violations by the caller and invalid configuration.

use thiserror::Error;

/// Errors reported by the cursor engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("illegal argument: {0}")]
    /// A required argument was missing or malformed (e.g. a move request without `to`).
    IllegalArgument(&'static str),

    #[error("invalid editor options: {0}")]
    /// Editor options failed validation.
    InvalidOptions(String),
}
