//! OpenAPI document resolution.
//!
//! This module parses OpenAPI 3.x (and Swagger 2 style references) and
//! produces a [`ResolvedApi`]:
//! - Enum, object and alias schemas from `components`
//! - Objects promoted from anonymous inline definitions
//! - Operations with typed parameters, body variants and responses

pub mod ir;
pub mod spec;

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};
use crate::options::GenerationOptions;
use ir::classify::classify;
use ir::inplace::extract_in_place;
use ir::operations::OperationResolver;
use ir::pool::build_pool;
use ir::{Method, Schema};
pub use spec::OpenApiSpec;

/// The fully resolved model handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedApi {
    /// Pool entries in insertion order, then promoted anonymous objects
    /// deepest-first.
    pub schemas: Vec<Schema>,
    /// Operations in path order.
    pub methods: Vec<Method>,
}

impl ResolvedApi {
    /// Schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name() == name)
    }

    /// Method by endpoint name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Every named type must resolve to a schema of this model.
    fn check_closure(&self) -> ResolveResult<()> {
        let known: HashSet<&str> = self.schemas.iter().map(Schema::name).collect();

        let mut referenced: Vec<&str> = Vec::new();
        for schema in &self.schemas {
            referenced.extend(schema.referenced_names());
        }
        for method in &self.methods {
            method.response.property.ty.collect_names(&mut referenced);
            for param in &method.parameters {
                param.ty.collect_names(&mut referenced);
            }
            for body in &method.bodies {
                body.property.ty.collect_names(&mut referenced);
            }
        }

        match referenced.into_iter().find(|name| !known.contains(name)) {
            Some(missing) => Err(ResolveError::MissingSchema(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// Resolve a parsed document.
pub fn resolve(spec: &OpenApiSpec, options: &GenerationOptions) -> ResolveResult<ResolvedApi> {
    let kinds = classify(spec);
    let pool = build_pool(spec, &kinds, options)?;
    let methods = OperationResolver::new(spec, &kinds, options, &pool).resolve_all()?;
    let promoted = extract_in_place(&methods, &pool, &kinds, options)?;
    debug!(
        pooled = pool.len(),
        promoted = promoted.len(),
        methods = methods.len(),
        "Resolved document"
    );

    let mut schemas = pool.into_schemas();
    schemas.extend(promoted.into_iter().map(Schema::Object));
    let api = ResolvedApi { schemas, methods };
    api.check_closure()?;
    Ok(api)
}

/// Parse and resolve a JSON document.
pub fn resolve_json(json: &str, options: &GenerationOptions) -> ResolveResult<ResolvedApi> {
    resolve(&OpenApiSpec::from_json(json)?, options)
}

/// Resolve an already decoded JSON document.
pub fn resolve_value(value: Value, options: &GenerationOptions) -> ResolveResult<ResolvedApi> {
    resolve(&OpenApiSpec::from_value(value)?, options)
}
