//! Promotion of anonymous objects.
//!
//! Inline object definitions found on responses, request bodies and object
//! properties are turned into named object schemas. Promoted objects can
//! hold further inline objects, so promotion repeats until a round finds
//! nothing new.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::api::Method;
use super::property::Property;
use super::types::{ObjectSchema, SchemaKinds, SchemaPool};
use crate::error::ResolveResult;
use crate::openapi::spec;
use crate::options::GenerationOptions;

fn pending(property: &Property) -> Option<(String, spec::Schema)> {
    property
        .pending_in_place()
        .map(|(name, def)| (name.to_string(), def.clone()))
}

/// Promote every pending anonymous object, deepest first.
pub fn extract_in_place(
    methods: &[Method],
    pool: &SchemaPool,
    kinds: &SchemaKinds,
    options: &GenerationOptions,
) -> ResolveResult<Vec<Arc<ObjectSchema>>> {
    let responses = methods.iter().map(|m| &m.response.property);
    let bodies = methods
        .iter()
        .flat_map(|m| m.bodies.iter().map(|b| &b.property));
    let object_props = pool
        .values()
        .filter_map(|s| s.as_object())
        .flat_map(|o| o.properties.iter());
    let mut round: Vec<(String, spec::Schema)> = responses
        .chain(bodies)
        .chain(object_props)
        .filter_map(pending)
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut promoted = Vec::new();
    let mut depth = 0;
    while !round.is_empty() {
        depth += 1;
        let mut next = Vec::new();
        for (name, def) in round {
            if pool.contains(&name) || !seen.insert(name.clone()) {
                continue;
            }
            let object = ObjectSchema::from_definition(&name, &def, kinds, options, pool)?;
            next.extend(object.properties.iter().filter_map(pending));
            debug!(name = %name, depth, "Promoted anonymous object");
            promoted.push(Arc::new(object));
        }
        round = next;
    }

    promoted.reverse();
    Ok(promoted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::classify::classify;
    use crate::openapi::ir::operations::OperationResolver;
    use crate::openapi::ir::pool::build_pool;
    use crate::openapi::spec::OpenApiSpec;

    fn promoted_names(json: &str) -> Vec<String> {
        let spec = OpenApiSpec::from_json(json).unwrap();
        let options = GenerationOptions::default();
        let kinds = classify(&spec);
        let pool = build_pool(&spec, &kinds, &options).unwrap();
        let methods = OperationResolver::new(&spec, &kinds, &options, &pool)
            .resolve_all()
            .unwrap();
        extract_in_place(&methods, &pool, &kinds, &options)
            .unwrap()
            .iter()
            .map(|o| o.name.clone())
            .collect()
    }

    #[test]
    fn test_nested_response_objects_deepest_first() {
        let names = promoted_names(
            r#"{ "paths": { "/a": { "get": {
                "operationId": "getA",
                "responses": { "200": { "content": { "application/json": { "schema": {
                    "type": "object",
                    "properties": { "outer": {
                        "type": "object",
                        "properties": { "inner": {
                            "type": "object",
                            "properties": { "leaf": { "type": "string" } }
                        } }
                    } }
                } } } } }
            } } } }"#,
        );
        assert_eq!(
            names,
            [
                "GetAResponse$get$outer$inner",
                "GetAResponse$get$outer",
                "GetAResponse$get"
            ]
        );
    }

    #[test]
    fn test_pool_object_properties_and_dedup() {
        let names = promoted_names(
            r#"{
                "components": { "schemas": {
                    "Pet": { "type": "object", "properties": {
                        "address": { "type": "object", "properties": { "city": { "type": "string" } } }
                    } }
                } },
                "paths": { "/pets": {
                    "post": {
                        "operationId": "addPet",
                        "requestBody": { "content": { "application/json": { "schema": {
                            "type": "object", "properties": { "name": { "type": "string" } }
                        } } } },
                        "responses": { "204": { "description": "none" } }
                    }
                } }
            }"#,
        );
        assert_eq!(names, ["Pet$address", "AddPetBody$post"]);
    }
}
