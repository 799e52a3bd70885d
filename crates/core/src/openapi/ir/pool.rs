//! Schema pool construction.
//!
//! Enums and property aliases go in first. Objects follow in fixed-point
//! iterations: each iteration adds, in declaration order, every object whose
//! object-kind `allOf` parents are already present. An iteration that adds
//! nothing while objects remain is an unsatisfiable dependency.

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::classify::{shared_body_media, shared_body_name};
use super::property::pool_entry;
use super::types::{EnumSchema, ObjectSchema, Schema, SchemaKind, SchemaKinds, SchemaPool};
use crate::error::{ResolveError, ResolveResult};
use crate::openapi::spec::{self, OpenApiSpec};
use crate::options::GenerationOptions;

/// Named definitions in pool order: component schemas, then the synthesized
/// definitions of shared request bodies.
fn definitions<'a>(
    spec: &'a OpenApiSpec,
    kinds: &SchemaKinds,
) -> IndexMap<String, Cow<'a, spec::Schema>> {
    let mut defs: IndexMap<String, Cow<'a, spec::Schema>> = spec
        .components
        .schemas
        .iter()
        .map(|(name, def)| (name.clone(), Cow::Borrowed(def)))
        .collect();

    for (name, body) in &spec.components.request_bodies {
        let Some((_, schema)) = shared_body_media(body) else {
            continue;
        };
        let pool_name = shared_body_name(name);
        let def = if kinds.is_object(&pool_name) {
            Cow::Owned(spec::Schema {
                all_of: vec![schema.clone()],
                description: body.description.clone(),
                ..spec::Schema::default()
            })
        } else {
            Cow::Borrowed(schema)
        };
        defs.insert(pool_name, def);
    }
    defs
}

/// Build the pool for a classified document.
pub fn build_pool(
    spec: &OpenApiSpec,
    kinds: &SchemaKinds,
    options: &GenerationOptions,
) -> ResolveResult<SchemaPool> {
    let defs = definitions(spec, kinds);
    let mut pool = SchemaPool::default();
    let mut objects = Vec::new();

    for (name, def) in &defs {
        match kinds.get(name) {
            Some(SchemaKind::Enum) => {
                pool.insert(Schema::Enum(Arc::new(EnumSchema::from_definition(name, def))));
            }
            Some(SchemaKind::Property) => pool.insert(pool_entry(name, def, kinds, options)),
            Some(SchemaKind::Object) => objects.push((name.as_str(), &**def)),
            None => return Err(ResolveError::MissingSchema(name.clone())),
        }
    }
    debug!(
        entries = pool.len(),
        objects = objects.len(),
        "Added enums and property aliases"
    );

    let mut iteration = 0;
    while !objects.is_empty() {
        iteration += 1;
        let (ready, pending): (Vec<_>, Vec<_>) = objects.into_iter().partition(|(_, def)| {
            ObjectSchema::parent_names(def, kinds)
                .iter()
                .all(|parent| pool.contains(parent))
        });

        if ready.is_empty() {
            let stuck = pending.iter().map(|(name, _)| (*name).to_string()).collect();
            return Err(ResolveError::UnsatisfiableDependency(stuck));
        }

        let built = ready
            .iter()
            .map(|(name, def)| ObjectSchema::from_definition(name, def, kinds, options, &pool))
            .collect::<ResolveResult<Vec<_>>>()?;
        for object in built {
            pool.insert(Schema::Object(Arc::new(object)));
        }
        debug!(
            iteration,
            added = ready.len(),
            remaining = pending.len(),
            "Resolved object schemas"
        );
        objects = pending;
    }

    Ok(pool)
}
