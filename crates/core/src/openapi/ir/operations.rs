//! Operation resolution.
//!
//! Turns every path item operation into a [`Method`]: parameters typed,
//! sorted and disambiguated, one body variant per supported mime type, and
//! the response chosen to type the result.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::api::{BodyMime, Method, Parameter, ParseMode, RequestBody, ResponseDetails};
use super::classify::{shared_body_media, shared_body_name};
use super::naming::{capitalize, classname_of, method_name_of, path_to_name};
use super::property::Property;
use super::types::{Primitive, Schema, SchemaKinds, SchemaPool, TypeRef};
use crate::error::{ResolveError, ResolveResult};
use crate::openapi::spec::{
    self, HttpMethod, MediaType, OpenApiSpec, Operation, Response, SCHEMA_PREFIX,
    SHARED_BODIES_PREFIX,
};
use crate::options::GenerationOptions;

const BODY: &str = "body";
const JSON_MIME: &str = "application/json";

/// Resolves operations against a finished pool.
#[derive(Debug, Clone, Copy)]
pub struct OperationResolver<'a> {
    spec: &'a OpenApiSpec,
    kinds: &'a SchemaKinds,
    options: &'a GenerationOptions,
    pool: &'a SchemaPool,
}

impl<'a> OperationResolver<'a> {
    /// Create a resolver.
    pub fn new(
        spec: &'a OpenApiSpec,
        kinds: &'a SchemaKinds,
        options: &'a GenerationOptions,
        pool: &'a SchemaPool,
    ) -> Self {
        Self {
            spec,
            kinds,
            options,
            pool,
        }
    }

    /// Resolve every operation that survives tag filtering, in path order and
    /// canonical verb order within a path.
    pub fn resolve_all(&self) -> ResolveResult<Vec<Method>> {
        let mut methods = Vec::new();
        for (path, item) in &self.spec.paths {
            for (verb, op) in item.operations() {
                let tags: IndexSet<String> = op.tags.iter().cloned().collect();
                if !self.options.accepts(&tags) {
                    debug!(path = %path, verb = verb.as_str(), "Operation filtered out by tags");
                    continue;
                }
                methods.push(self.resolve_method(path, verb, op, &item.parameters, tags)?);
            }
        }
        debug!(count = methods.len(), "Resolved operations");
        Ok(methods)
    }

    fn resolve_method(
        &self,
        path: &str,
        verb: HttpMethod,
        op: &Operation,
        path_params: &[spec::Parameter],
        tags: IndexSet<String>,
    ) -> ResolveResult<Method> {
        let base_name = op
            .operation_id
            .clone()
            .unwrap_or_else(|| format!("{}{}", verb.as_str(), path_to_name(path)));

        let parameters = self.parameters(op, path_params);
        let bodies = self.bodies(&base_name, verb, op)?;
        let response = self.response(&base_name, verb, op);
        let wrap_params_in_object =
            parameters.len() > 2 || (!bodies.is_empty() && !parameters.is_empty());

        Ok(Method {
            path: path.to_string(),
            verb,
            operation_id: op.operation_id.clone(),
            name: method_name_of(&base_name),
            tags,
            summary: op.summary.clone(),
            description: op.description.clone(),
            deprecated: op.deprecated,
            response,
            parameters,
            bodies,
            body_description: op.request_body.as_ref().and_then(|b| b.description.clone()),
            wrap_params_in_object,
        })
    }

    /// Path-level parameters not overridden by the operation, then the
    /// operation's own; required first, then by location. Parameters sharing
    /// a name get the location prepended to their unique name. References to
    /// shared parameters are followed; dangling ones are skipped.
    fn parameters(&self, op: &Operation, path_params: &[spec::Parameter]) -> Vec<Parameter> {
        let own = self.follow_references(&op.parameters);
        let overridden = |p: &spec::Parameter| {
            own.iter()
                .any(|o| o.name == p.name && o.location == p.location)
        };
        let mut params: Vec<Parameter> = self
            .follow_references(path_params)
            .into_iter()
            .filter(|&p| !overridden(p))
            .chain(own.iter().copied())
            .map(|def| Parameter::from_definition(def, self.kinds, self.options))
            .collect();
        params.sort_by_key(|p| (!p.required, p.location.rank()));

        let mut counts: HashMap<String, usize> = HashMap::new();
        for p in &params {
            *counts.entry(p.name.clone()).or_default() += 1;
        }
        params
            .into_iter()
            .map(|p| {
                if counts.get(&p.name).copied().unwrap_or_default() > 1 {
                    let unique = format!("{}{}", p.location.as_str(), capitalize(&p.name));
                    p.with_unique_name(unique)
                } else {
                    p
                }
            })
            .collect()
    }

    fn follow_references<'p>(&'p self, params: &'p [spec::Parameter]) -> Vec<&'p spec::Parameter> {
        params
            .iter()
            .filter_map(|p| {
                let resolved = self.spec.parameter(p);
                if resolved.is_none() {
                    debug!(reference = ?p.ref_path, "Skipping unresolved parameter reference");
                }
                resolved
            })
            .collect()
    }

    fn bodies(
        &self,
        base_name: &str,
        verb: HttpMethod,
        op: &Operation,
    ) -> ResolveResult<Vec<RequestBody>> {
        let Some(body) = &op.request_body else {
            return Ok(Vec::new());
        };
        if let Some(content) = &body.content {
            return Ok(self.inline_bodies(base_name, verb, content, body.required));
        }
        match body.ref_path.as_deref() {
            Some(reference) => {
                let name = reference
                    .strip_prefix(SHARED_BODIES_PREFIX)
                    .ok_or_else(|| ResolveError::MissingSchema(reference.to_string()))?;
                Ok(self.shared_body(name, body.required)?.into_iter().collect())
            }
            None => Ok(Vec::new()),
        }
    }

    fn shared_body(&self, name: &str, required: bool) -> ResolveResult<Option<RequestBody>> {
        let shared = self
            .spec
            .components
            .request_bodies
            .get(name)
            .ok_or_else(|| ResolveError::MissingSchema(format!("{SHARED_BODIES_PREFIX}{name}")))?;
        let Some((mime, _)) = shared_body_media(shared) else {
            debug!(body = %name, "Shared request body has no supported content");
            return Ok(None);
        };

        let pool_name = shared_body_name(name);
        let property = match self.pool.get(&pool_name) {
            Some(Schema::Property(p)) if p.ty.is_union() => (**p).clone().with_name(BODY),
            Some(Schema::Object(_)) => Property::reference(BODY, &pool_name, true),
            Some(Schema::Property(_) | Schema::Enum(_)) => {
                Property::reference(BODY, &pool_name, false)
            }
            None => return Err(ResolveError::MissingSchema(pool_name)),
        };
        let nullable = !property.references_object && property.nullable;
        let property = property
            .with_required(required || shared.required)
            .with_nullable(nullable)
            .with_description(shared.description.clone());

        Ok(Some(RequestBody {
            property,
            mime,
            suffix: String::new(),
        }))
    }

    fn inline_bodies(
        &self,
        base_name: &str,
        verb: HttpMethod,
        content: &IndexMap<String, MediaType>,
        required: bool,
    ) -> Vec<RequestBody> {
        let supported: Vec<(BodyMime, &MediaType)> = content
            .iter()
            .filter_map(|(mime, media)| BodyMime::from_mime(mime).map(|m| (m, media)))
            .collect();
        let multiple = supported.len() > 1;

        supported
            .into_iter()
            .map(|(mime, media)| RequestBody {
                property: self.body_property(base_name, verb, media.schema.as_ref(), required),
                mime,
                suffix: if multiple {
                    mime.label().to_string()
                } else {
                    String::new()
                },
            })
            .collect()
    }

    fn body_property(
        &self,
        base_name: &str,
        verb: HttpMethod,
        def: Option<&spec::Schema>,
        required: bool,
    ) -> Property {
        let property = match def {
            None => Property::new(BODY, TypeRef::Primitive(Primitive::Object)),
            Some(def) if def.is_empty_object_or_array() => {
                Property::new(BODY, TypeRef::Primitive(Primitive::Object))
            }
            Some(def) if def.ref_path.is_some() => {
                let def = shared_ref_as_schema_ref(def);
                Property::from_definition("", BODY, &def, self.kinds, self.options)
            }
            Some(def) if def.is_inline_object() => {
                let promoted = classname_of(&format!("{base_name}Body${}", verb.as_str()));
                Property::inline_object(BODY, promoted, def)
            }
            Some(def) => Property::from_definition("", BODY, def, self.kinds, self.options),
        };

        let nullable = if property.references_object {
            def.and_then(|d| d.nullable) == Some(true)
        } else {
            property.nullable
        };
        property.with_nullable(nullable).with_required(required)
    }

    /// Lowest 2xx status, else `default`, else the first declared response.
    fn choose_response<'r>(op: &'r Operation) -> Option<(&'r String, &'r Response)> {
        op.responses
            .iter()
            .filter_map(|(status, r)| {
                let code = status.parse::<u16>().ok()?;
                (200..300).contains(&code).then_some((code, status, r))
            })
            .min_by_key(|(code, _, _)| *code)
            .map(|(_, status, r)| (status, r))
            .or_else(|| op.responses.get_key_value("default"))
            .or_else(|| op.responses.first())
    }

    fn response(&self, base_name: &str, verb: HttpMethod, op: &Operation) -> ResponseDetails {
        let chosen = Self::choose_response(op);
        let content = chosen.and_then(|(_, r)| r.content.as_ref());
        let mime_type = content
            .and_then(|c| {
                if c.contains_key(JSON_MIME) {
                    Some(JSON_MIME)
                } else {
                    c.keys().next().map(String::as_str)
                }
            })
            .unwrap_or(JSON_MIME)
            .to_string();
        let parse_mode = ParseMode::for_mime(&mime_type);
        let media = content.and_then(|c| c.get(&mime_type));

        let property = match media {
            Some(_) if parse_mode == ParseMode::Text => {
                Property::new("", TypeRef::Primitive(Primitive::String)).with_required(true)
            }
            Some(MediaType { schema: Some(def) }) if def.is_inline_object() => {
                let promoted = classname_of(&format!("{base_name}Response${}", verb.as_str()));
                Property::inline_object("", promoted, def).with_required(true)
            }
            Some(MediaType { schema: Some(def) }) => {
                Property::from_definition("", "", def, self.kinds, self.options)
                    .with_nullable(false)
                    .with_required(true)
            }
            _ => Property::new("", TypeRef::Primitive(Primitive::Unknown)),
        };

        ResponseDetails {
            status: chosen.map(|(status, _)| status.clone()),
            property,
            mime_type,
            parse_mode,
            description: chosen.and_then(|(_, r)| r.description.clone()),
        }
    }
}

/// Inline content may `$ref` a shared body directly; point it at the
/// body's pool entry instead.
fn shared_ref_as_schema_ref(def: &spec::Schema) -> spec::Schema {
    match def
        .ref_path
        .as_deref()
        .and_then(|r| r.strip_prefix(SHARED_BODIES_PREFIX))
    {
        Some(name) => spec::Schema {
            ref_path: Some(format!("{SCHEMA_PREFIX}{}", shared_body_name(name))),
            ..def.clone()
        },
        None => def.clone(),
    }
}

