//! Schema resolution engine for OpenAPI client generation.
//!
//! Turns an OpenAPI document into a closed model of enums, objects, property
//! aliases and operations that a template layer can render without further
//! lookups. No I/O happens here.

pub mod error;
pub mod openapi;
pub mod options;

pub use error::{ResolveError, ResolveResult};
pub use openapi::{ResolvedApi, resolve, resolve_json, resolve_value};
pub use options::GenerationOptions;
