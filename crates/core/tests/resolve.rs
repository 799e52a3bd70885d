//! End-to-end resolution tests over small documents.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;

use serde_json::json;
use swagts_core::openapi::OpenApiSpec;
use swagts_core::openapi::ir::classify::classify;
use swagts_core::openapi::ir::{BodyMime, Primitive, Schema, SchemaKind, TypeRef};
use swagts_core::{GenerationOptions, ResolveError, ResolvedApi, resolve, resolve_value};

fn petstore() -> serde_json::Value {
    json!({
        "openapi": "3.0.0",
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "tags": ["pets"],
                    "parameters": [
                        { "name": "status", "in": "query", "schema": { "$ref": "#/components/schemas/Status" } }
                    ],
                    "responses": {
                        "200": { "content": { "application/json": { "schema": {
                            "type": "array", "items": { "$ref": "#/components/schemas/Pet" }
                        } } } }
                    }
                },
                "post": {
                    "operationId": "addPet",
                    "tags": ["pets", "internal"],
                    "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } },
                    "responses": { "201": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } } }
                }
            },
            "/owners": {
                "get": {
                    "operationId": "listOwners",
                    "tags": ["owners"],
                    "responses": { "200": { "content": { "application/json": { "schema": {
                        "type": "array", "items": { "$ref": "#/components/schemas/Owner" }
                    } } } } }
                }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "status": { "$ref": "#/components/schemas/Status" },
                        "owner": { "$ref": "#/components/schemas/Owner" }
                    }
                },
                "Owner": { "type": "object", "properties": { "id": { "type": "integer" } } },
                "Status": { "type": "string", "enum": ["available", "sold"] }
            }
        }
    })
}

fn resolve_with(value: serde_json::Value, options: &GenerationOptions) -> ResolvedApi {
    resolve_value(value, options).unwrap()
}

fn method_names(api: &ResolvedApi) -> Vec<&str> {
    api.methods.iter().map(|m| m.name.as_str()).collect()
}

#[test]
fn petstore_end_to_end() {
    let api = resolve_with(petstore(), &GenerationOptions::default());

    assert!(matches!(api.schema("Pet"), Some(Schema::Object(_))));
    assert!(matches!(api.schema("Status"), Some(Schema::Enum(_))));
    let list = api.method("listPets").unwrap();
    assert_eq!(list.response.property.ty.to_string(), "array<Pet>");
    assert_eq!(list.parameters[0].ty.to_string(), "Status");
}

#[test]
fn every_schema_is_classified_once() {
    let mut doc = petstore();
    doc["components"]["requestBodies"] = json!({
        "PetBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
    });
    let spec = OpenApiSpec::from_value(doc).unwrap();
    let kinds = classify(&spec);

    let names: Vec<_> = kinds.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["Pet", "Owner", "Status", "PetBody$RequestBody"]);
    assert_eq!(kinds.get("Status"), Some(SchemaKind::Enum));
    assert_eq!(kinds.get("PetBody$RequestBody"), Some(SchemaKind::Object));
}

#[test]
fn model_is_closed() {
    let api = resolve_with(petstore(), &GenerationOptions::default());
    let known: HashSet<&str> = api.schemas.iter().map(Schema::name).collect();

    for schema in &api.schemas {
        for name in schema.referenced_names() {
            assert!(known.contains(name), "{} references unknown {name}", schema.name());
        }
    }
    for method in &api.methods {
        let mut names = Vec::new();
        method.response.property.ty.collect_names(&mut names);
        for body in &method.bodies {
            body.property.ty.collect_names(&mut names);
        }
        for param in &method.parameters {
            param.ty.collect_names(&mut names);
        }
        assert!(names.iter().all(|n| known.contains(n)));
    }
}

#[test]
fn required_propagates_to_inherited_properties() {
    let doc = json!({
        "components": { "schemas": {
            "A": { "type": "object", "properties": { "x": { "type": "string" } } },
            "B": { "allOf": [
                { "$ref": "#/components/schemas/A" },
                { "type": "object", "required": ["x"] }
            ] }
        } }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let Some(Schema::Object(b)) = api.schema("B") else {
        panic!("B is not an object");
    };
    let props = b.props_including_inherited();
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].name, "x");
    assert!(props[0].required);

    let Some(Schema::Object(a)) = api.schema("A") else {
        panic!("A is not an object");
    };
    assert!(!a.properties[0].required, "the parent keeps its own flag");
}

#[test]
fn child_property_shadows_parent() {
    let doc = json!({
        "components": { "schemas": {
            "Base": { "type": "object", "properties": { "id": { "type": "string" } } },
            "Child": { "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "properties": { "id": { "type": "integer" } } }
            ] }
        } }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let Some(Schema::Object(child)) = api.schema("Child") else {
        panic!("Child is not an object");
    };
    let ids: Vec<_> = child
        .props_including_inherited()
        .into_iter()
        .filter(|p| p.name == "id")
        .collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].ty.to_string(), "number");
}

#[test]
fn shared_union_body_is_synthesized() {
    let doc = json!({
        "paths": { "/choose": { "post": {
            "operationId": "choose",
            "requestBody": { "$ref": "#/components/requestBodies/Choice" },
            "responses": {}
        } } },
        "components": {
            "schemas": {
                "A": { "type": "object" },
                "B": { "type": "object" }
            },
            "requestBodies": {
                "Choice": { "content": { "application/json": { "schema": { "anyOf": [
                    { "$ref": "#/components/schemas/A" },
                    { "$ref": "#/components/schemas/B" }
                ] } } } }
            }
        }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let Some(Schema::Property(choice)) = api.schema("Choice$RequestBody") else {
        panic!("Choice$RequestBody is not a property");
    };
    assert_eq!(choice.ty.to_string(), "A | B");

    let body = &api.method("choose").unwrap().bodies[0];
    assert_eq!(body.property.name, "body");
    assert_eq!(body.property.ty.to_string(), "A | B");
}

#[test]
fn referenced_objects_nullable_by_default() {
    let options = GenerationOptions {
        referenced_objects_nullable_by_default: true,
        ..GenerationOptions::default()
    };
    let mut doc = petstore();
    doc["components"]["schemas"]["Pet"]["properties"]["vet"] =
        json!({ "$ref": "#/components/schemas/Owner", "nullable": false });
    let api = resolve_with(doc, &options);

    let Some(Schema::Object(pet)) = api.schema("Pet") else {
        panic!("Pet is not an object");
    };
    let prop = |name: &str| pet.properties.iter().find(|p| p.name == name).unwrap();
    assert!(prop("owner").nullable);
    assert!(!prop("vet").nullable);
    assert!(!prop("status").nullable, "enum references are not objects");

    let off = resolve_with(petstore(), &GenerationOptions::default());
    let Some(Schema::Object(pet)) = off.schema("Pet") else {
        panic!("Pet is not an object");
    };
    assert!(pet.properties.iter().all(|p| !p.nullable));
}

#[test]
fn tag_filtering_exclude_wins() {
    let options = GenerationOptions {
        include_tags: ["pets".to_string()].into(),
        exclude_tags: ["internal".to_string()].into(),
        ..GenerationOptions::default()
    };
    let api = resolve_with(petstore(), &options);
    assert_eq!(method_names(&api), ["listPets"]);

    let all = resolve_with(petstore(), &GenerationOptions::default());
    assert_eq!(method_names(&all), ["listPets", "addPet", "listOwners"]);
}

#[test]
fn nested_anonymous_objects_terminate() {
    let doc = json!({
        "paths": { "/deep": { "get": {
            "operationId": "deep",
            "responses": { "200": { "content": { "application/json": { "schema": {
                "type": "object",
                "properties": { "a": {
                    "type": "object",
                    "properties": { "b": {
                        "type": "object",
                        "properties": { "c": { "type": "string" } }
                    } }
                } }
            } } } } }
        } } }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let promoted: Vec<_> = api.schemas.iter().map(Schema::name).collect();
    assert_eq!(
        promoted,
        ["DeepResponse$get$a$b", "DeepResponse$get$a", "DeepResponse$get"]
    );
    assert_eq!(
        api.method("deep").unwrap().response.property.ty.to_string(),
        "DeepResponse$get"
    );
}

#[test]
fn resolution_is_idempotent() {
    let spec = OpenApiSpec::from_value(petstore()).unwrap();
    let options = GenerationOptions::default();
    assert_eq!(resolve(&spec, &options).unwrap(), resolve(&spec, &options).unwrap());
}

#[test]
fn cyclic_inheritance_is_fatal() {
    let doc = json!({
        "components": { "schemas": {
            "A": { "allOf": [{ "$ref": "#/components/schemas/A" }] }
        } }
    });
    let err = resolve_value(doc, &GenerationOptions::default()).unwrap_err();
    assert!(matches!(err, ResolveError::UnsatisfiableDependency(names) if names == ["A"]));
}

#[test]
fn swagger_definitions_prefix_is_accepted() {
    let doc = json!({
        "components": { "schemas": {
            "Tag": { "type": "object" },
            "Post": { "type": "object", "properties": {
                "tags": { "type": "array", "items": { "$ref": "#/definitions/Tag" } }
            } }
        } }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let Some(Schema::Object(post)) = api.schema("Post") else {
        panic!("Post is not an object");
    };
    assert_eq!(post.properties[0].ty.to_string(), "array<Tag>");
    assert!(post.properties[0].item_references_object);
}

#[test]
fn placeholder_request_body_is_untyped_object() {
    let doc = json!({
        "paths": { "/errors": { "post": {
            "operationId": "report",
            "requestBody": { "required": true, "content": { "application/json": { "schema": [] } } },
            "responses": { "204": { "description": "Accepted" } }
        } } }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let report = api.method("report").unwrap();
    assert_eq!(report.bodies.len(), 1);
    let body = &report.bodies[0];
    assert_eq!(body.mime, BodyMime::Json);
    assert_eq!(body.property.ty, TypeRef::Primitive(Primitive::Object));
    assert!(body.property.required);
    assert!(body.property.pending_in_place().is_none());
}

#[test]
fn shared_parameters_are_followed() {
    let doc = json!({
        "components": { "parameters": {
            "Limit": { "name": "limit", "in": "query", "required": true, "schema": { "type": "integer" } }
        } },
        "paths": { "/pets": { "get": {
            "operationId": "listPets",
            "parameters": [
                { "$ref": "#/components/parameters/Limit" },
                { "$ref": "#/components/parameters/Gone" },
                { "name": "q", "in": "query", "schema": { "type": "string" } }
            ],
            "responses": {}
        } } }
    });
    let api = resolve_with(doc, &GenerationOptions::default());
    let params: Vec<_> = api
        .method("listPets")
        .unwrap()
        .parameters
        .iter()
        .map(|p| format!("{}:{}", p.name, p.ty))
        .collect();
    assert_eq!(params, ["limit:number", "q:string"]);
}
