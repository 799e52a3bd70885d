//! TypeScript client rendering.
//!
//! The resolved model is flattened into serializable views with every type
//! expression already emitted; the tera template only lays them out.

use serde::Serialize;
use serde_json::Value;
use swagts_core::ResolvedApi;
use swagts_core::openapi::ir::naming::{classname_of, property_name_of};
use swagts_core::openapi::ir::{
    BodyMime, EnumSchema, Method, ObjectSchema, ParamLocation, Parameter, ParseMode, PathPart,
    Primitive, Property, RequestBody, Schema, TypeRef,
};
use tera::{Context, Tera};

use crate::error::CliError;

const TEMPLATE_NAME: &str = "client.ts";
const TEMPLATE: &str = include_str!("../templates/client.ts.tera");

/// Trait for emitting TypeScript source text.
pub trait Emit {
    /// Emit TypeScript code as a string.
    fn emit(&self) -> String;
}

impl Emit for Primitive {
    fn emit(&self) -> String {
        let ts = match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "Record<string, unknown>",
            Primitive::Binary | Primitive::File => "Blob",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
        };
        ts.to_string()
    }
}

impl Emit for TypeRef {
    fn emit(&self) -> String {
        match self {
            TypeRef::Primitive(p) => p.emit(),
            TypeRef::Named(name) => classname_of(name),
            TypeRef::Array(item) => format!("Array<{}>", item.emit()),
            TypeRef::Union(members) => members
                .iter()
                .map(Emit::emit)
                .collect::<Vec<_>>()
                .join(" | "),
            TypeRef::Intersection(members) => members
                .iter()
                .map(|m| {
                    if m.is_union() {
                        format!("({})", m.emit())
                    } else {
                        m.emit()
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }
}

/// Nullable properties keep their declared type; otherwise inline enum
/// literals narrow it to a literal union.
impl Emit for Property {
    fn emit(&self) -> String {
        if self.nullable {
            return format!("{} | null", self.ty.emit());
        }
        match self.enum_values.as_deref() {
            Some(values) if !values.is_empty() => values
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
            _ => self.ty.emit(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// String literal with JSON escaping, which TypeScript accepts.
fn string_literal(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Single-line doc text safe inside `/** */`.
fn doc_text(parts: &[Option<&str>]) -> Option<String> {
    let text = parts
        .iter()
        .flatten()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then(|| text.replace("*/", "*\\/"))
}

#[derive(Debug, Serialize)]
struct EnumMemberView {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct PropView {
    key: String,
    ty: String,
    optional: bool,
    doc: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SchemaView {
    Enum {
        name: String,
        doc: Option<String>,
        members: Vec<EnumMemberView>,
    },
    Interface {
        name: String,
        doc: Option<String>,
        extends: Vec<String>,
        props: Vec<PropView>,
    },
    Alias {
        name: String,
        doc: Option<String>,
        ty: String,
    },
}

fn enum_member_name(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let name: String = property_name_of(&raw)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

impl SchemaView {
    fn from_enum(schema: &EnumSchema) -> Self {
        let name = classname_of(&schema.name);
        let doc = doc_text(&[schema.title.as_deref(), schema.description.as_deref()]);
        let representable = schema
            .values
            .iter()
            .all(|v| v.is_string() || v.is_number());
        if representable && !schema.values.is_empty() {
            let members = schema
                .values
                .iter()
                .map(|v| EnumMemberView {
                    name: enum_member_name(v),
                    value: v.to_string(),
                })
                .collect();
            Self::Enum { name, doc, members }
        } else {
            let ty = if schema.values.is_empty() {
                "never".to_string()
            } else {
                schema
                    .values
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" | ")
            };
            Self::Alias { name, doc, ty }
        }
    }

    /// Own properties plus inherited ones the object makes required.
    fn from_object(schema: &ObjectSchema) -> Self {
        let props = schema
            .props_including_inherited()
            .into_iter()
            .filter(|p| {
                schema.properties.iter().any(|own| own.name == p.name)
                    || schema.required.contains(&p.name)
            })
            .map(|p| PropView {
                key: property_key(&p.name),
                ty: p.emit(),
                optional: !p.required,
                doc: doc_text(&[p.description.as_deref()]),
            })
            .collect();
        Self::Interface {
            name: classname_of(&schema.name),
            doc: doc_text(&[schema.title.as_deref(), schema.description.as_deref()]),
            extends: schema.parents.keys().map(|p| classname_of(p)).collect(),
            props,
        }
    }

    fn from_property(property: &Property) -> Self {
        Self::Alias {
            name: classname_of(&property.name),
            doc: doc_text(&[property.description.as_deref()]),
            ty: property.emit(),
        }
    }

    fn from_schema(schema: &Schema) -> Self {
        match schema {
            Schema::Enum(e) => Self::from_enum(e),
            Schema::Object(o) => Self::from_object(o),
            Schema::Property(p) => Self::from_property(p),
        }
    }
}

#[derive(Debug, Serialize)]
struct ArgView {
    key: String,
    expr: String,
    is_array: bool,
}

#[derive(Debug, Serialize)]
struct BodyView {
    expr: String,
    encoding: &'static str,
    content_type: &'static str,
}

#[derive(Debug, Serialize)]
struct FunctionView {
    name: String,
    doc: Option<String>,
    deprecated: bool,
    verb: String,
    url: String,
    signature: String,
    return_type: String,
    parse: &'static str,
    query: Vec<ArgView>,
    headers: Vec<ArgView>,
    cookies: Vec<ArgView>,
    body: Option<BodyView>,
}

fn body_encoding(mime: BodyMime) -> &'static str {
    match mime {
        BodyMime::Json => "json",
        BodyMime::Form => "form",
        BodyMime::Multipart => "multipart",
        BodyMime::OctetStream => "binary",
    }
}

impl FunctionView {
    fn new(method: &Method, body: Option<&RequestBody>) -> Self {
        let wrapped = method.wrap_params_in_object;
        let expr = |name: &str| {
            if wrapped {
                format!("params.{name}")
            } else {
                name.to_string()
            }
        };

        let args = |location: ParamLocation| -> Vec<ArgView> {
            method
                .parameters
                .iter()
                .filter(|p| p.location == location)
                .map(|p| ArgView {
                    key: string_literal(&p.raw_name),
                    expr: expr(&p.unique_name),
                    is_array: p.is_array,
                })
                .collect()
        };

        let url = method
            .path_parts()
            .into_iter()
            .map(|part| match part {
                PathPart::Static(s) => s.replace('`', "\\`"),
                PathPart::Param(name) => {
                    format!("${{encodeURIComponent(String({}))}}", expr(&name))
                }
            })
            .collect();

        let response = &method.response;
        let (return_type, parse) = if response.is_unknown() {
            ("unknown".to_string(), "none")
        } else if response.parse_mode == ParseMode::Text {
            ("string".to_string(), "text")
        } else {
            (response.property.emit(), "json")
        };

        Self {
            name: method.variant_name(body),
            doc: doc_text(&[
                method.summary.as_deref(),
                method.description.as_deref(),
                method.body_description.as_deref(),
            ]),
            deprecated: method.deprecated,
            verb: method.verb.as_str().to_uppercase(),
            url,
            signature: signature(method, body),
            return_type,
            parse,
            query: args(ParamLocation::Query),
            headers: args(ParamLocation::Header),
            cookies: args(ParamLocation::Cookie),
            body: body.map(|b| BodyView {
                expr: expr("body"),
                encoding: body_encoding(b.mime),
                content_type: b.mime.as_str(),
            }),
        }
    }
}

fn param_decl(param: &Parameter) -> (String, String, bool) {
    (param.unique_name.clone(), param.ty.emit(), !param.required)
}

/// Function parameters: positional, or one `params` object when wrapped.
fn signature(method: &Method, body: Option<&RequestBody>) -> String {
    let mut decls: Vec<(String, String, bool)> =
        method.parameters.iter().map(param_decl).collect();
    if let Some(body) = body {
        decls.push(("body".to_string(), body.property.emit(), !body.property.required));
    }
    let decl = |(name, ty, optional): &(String, String, bool)| {
        format!("{name}{}: {ty}", if *optional { "?" } else { "" })
    };

    let mut args = Vec::new();
    if method.wrap_params_in_object {
        let fields = decls.iter().map(decl).collect::<Vec<_>>().join("; ");
        let all_optional = decls.iter().all(|(_, _, optional)| *optional);
        let default = if all_optional { " = {}" } else { "" };
        args.push(format!("params: {{ {fields} }}{default}"));
    } else {
        args.extend(decls.iter().map(decl));
    }
    args.push("options?: RequestOptions".to_string());
    args.join(", ")
}

#[derive(Debug, Serialize)]
struct ClientView {
    schemas: Vec<SchemaView>,
    functions: Vec<FunctionView>,
}

impl ClientView {
    fn new(api: &ResolvedApi) -> Self {
        let functions = api
            .methods
            .iter()
            .flat_map(|method| {
                if method.bodies.is_empty() {
                    vec![FunctionView::new(method, None)]
                } else {
                    method
                        .bodies
                        .iter()
                        .map(|b| FunctionView::new(method, Some(b)))
                        .collect()
                }
            })
            .collect();
        Self {
            schemas: api.schemas.iter().map(SchemaView::from_schema).collect(),
            functions,
        }
    }
}

/// Renders a resolved model into a single TypeScript module.
#[derive(Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load the client template.
    pub fn new() -> Result<Self, CliError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Render the client module.
    pub fn render(&self, api: &ResolvedApi) -> Result<String, CliError> {
        let context = Context::from_serialize(ClientView::new(api))?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}
