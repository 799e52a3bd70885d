//! Error types for schema resolution.
//!
//! Only structural defects of the input document are fatal. Shapes the
//! resolver does not understand degrade to an untyped fallback instead.

use thiserror::Error;

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Fatal resolution errors.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A fixed-point pass made no progress while object schemas remained
    /// unresolved (an `allOf` cycle).
    #[error("No superclass definitions were found for {}", .0.join(", "))]
    UnsatisfiableDependency(Vec<String>),

    /// A schema expected in the pool is absent.
    #[error("No schema for {0}")]
    MissingSchema(String),

    /// The document is not valid JSON or does not have the OpenAPI shape.
    #[error("Failed to parse OpenAPI document: {0}")]
    Parse(#[from] serde_json::Error),
}
