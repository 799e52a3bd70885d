//! Resolved operations: methods, parameters, bodies and responses.

use indexmap::IndexSet;
use serde_json::Value;
use tracing::warn;

use super::naming::parameter_name_of;
use super::property::Property;
use super::types::{Primitive, SchemaKinds, TypeRef};
use crate::openapi::spec::{self, HttpMethod};
use crate::options::GenerationOptions;

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// Path template placeholder.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
    /// Swagger 2 body parameter.
    Body,
}

impl ParamLocation {
    /// Parse the `in` field; unknown locations are treated as query.
    pub fn parse(s: &str) -> Self {
        match s {
            "path" => Self::Path,
            "header" => Self::Header,
            "cookie" => Self::Cookie,
            "body" => Self::Body,
            _ => Self::Query,
        }
    }

    /// Lowercase location name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        }
    }

    /// Sort rank: path before query before header before cookie before body.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Path => 0,
            Self::Query => 1,
            Self::Header => 2,
            Self::Cookie => 3,
            Self::Body => 4,
        }
    }
}

/// A resolved operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Identifier-safe name.
    pub name: String,
    /// Name as declared in the document.
    pub raw_name: String,
    /// Name unique within the operation.
    pub unique_name: String,
    /// Location.
    pub location: ParamLocation,
    /// Resolved type.
    pub ty: TypeRef,
    /// Whether the parameter is mandatory.
    pub required: bool,
    /// Whether the type is an array.
    pub is_array: bool,
    /// Default value.
    pub default: Option<Value>,
    /// Description.
    pub description: Option<String>,
    /// Deprecation marker.
    pub deprecated: bool,
}

impl Parameter {
    /// Resolve a declared parameter. Inline object schemas are typed
    /// `object` rather than promoted.
    pub fn from_definition(
        def: &spec::Parameter,
        kinds: &SchemaKinds,
        options: &GenerationOptions,
    ) -> Self {
        let name = parameter_name_of(&def.name);
        let (ty, default) = match &def.schema {
            Some(schema) => {
                let property = Property::from_definition("", &def.name, schema, kinds, options);
                let ty = if property.in_place.is_some() {
                    TypeRef::Primitive(Primitive::Object)
                } else {
                    property.ty
                };
                (ty, property.default)
            }
            None => (TypeRef::Primitive(Primitive::Any), None),
        };
        Self {
            unique_name: name.clone(),
            name,
            raw_name: def.name.clone(),
            location: ParamLocation::parse(&def.location),
            is_array: ty.is_array(),
            ty,
            required: def.required,
            default,
            description: def.description.clone(),
            deprecated: def.deprecated,
        }
    }

    /// Copy with a different unique name.
    pub fn with_unique_name(self, unique_name: String) -> Self {
        Self {
            unique_name,
            ..self
        }
    }
}

/// Request payload encodings the generated client supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyMime {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `multipart/form-data`
    Multipart,
    /// `application/octet-stream`
    OctetStream,
}

impl BodyMime {
    /// Supported encoding of a mime type, ignoring parameters such as
    /// `charset`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence {
            "application/json" => Some(Self::Json),
            "application/x-www-form-urlencoded" => Some(Self::Form),
            "multipart/form-data" => Some(Self::Multipart),
            "application/octet-stream" => Some(Self::OctetStream),
            _ => None,
        }
    }

    /// Canonical mime type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Multipart => "multipart/form-data",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Suffix distinguishing variants of one operation.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Json => "Json",
            Self::Form => "Form",
            Self::Multipart => "File",
            Self::OctetStream => "Binary",
        }
    }
}

/// One request body variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// Payload property, named `body`.
    pub property: Property,
    /// Encoding.
    pub mime: BodyMime,
    /// Method name suffix; empty when the operation has a single variant.
    pub suffix: String,
}

/// How the generated client reads a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseMode {
    /// Decode as JSON.
    Json,
    /// Read as text.
    Text,
}

impl ParseMode {
    /// `text/*` and XML responses are read as text.
    pub fn for_mime(mime: &str) -> Self {
        if mime.starts_with("text/") || mime.contains("xml") {
            Self::Text
        } else {
            Self::Json
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

/// The response chosen to type an operation's result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDetails {
    /// Status code key the response was taken from.
    pub status: Option<String>,
    /// Payload property.
    pub property: Property,
    /// Chosen mime type.
    pub mime_type: String,
    /// Parse mode.
    pub parse_mode: ParseMode,
    /// Description.
    pub description: Option<String>,
}

impl ResponseDetails {
    /// Whether no usable payload was found.
    pub fn is_unknown(&self) -> bool {
        self.property.ty == TypeRef::Primitive(Primitive::Unknown)
    }
}

/// A segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart {
    /// Literal text.
    Static(String),
    /// A placeholder, by the unique name of the parameter that fills it.
    Param(String),
}

/// A resolved operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Path template.
    pub path: String,
    /// HTTP verb.
    pub verb: HttpMethod,
    /// Declared operation id.
    pub operation_id: Option<String>,
    /// Endpoint function name.
    pub name: String,
    /// Tags.
    pub tags: IndexSet<String>,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Deprecation marker.
    pub deprecated: bool,
    /// Chosen response.
    pub response: ResponseDetails,
    /// Parameters: required first, then by location rank.
    pub parameters: Vec<Parameter>,
    /// Body variants, one per supported mime type.
    pub bodies: Vec<RequestBody>,
    /// Body description.
    pub body_description: Option<String>,
    /// Whether parameters are passed as one object.
    pub wrap_params_in_object: bool,
}

impl Method {
    /// Split the path template into literals and placeholders.
    ///
    /// A placeholder maps to the path parameter whose raw or identifier name
    /// matches it, by that parameter's unique name. A placeholder no path
    /// parameter declares stays in the path as literal text.
    pub fn path_parts(&self) -> Vec<PathPart> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut in_param = false;

        for c in self.path.chars() {
            match c {
                '{' if !in_param => {
                    if !current.is_empty() {
                        parts.push(PathPart::Static(std::mem::take(&mut current)));
                    }
                    in_param = true;
                }
                '}' if in_param => {
                    let placeholder = std::mem::take(&mut current);
                    match self.path_param_name(&placeholder) {
                        Some(name) => parts.push(PathPart::Param(name)),
                        None => {
                            warn!(
                                path = %self.path,
                                placeholder = %placeholder,
                                "Path placeholder has no matching path parameter"
                            );
                            parts.push(PathPart::Static(format!("{{{placeholder}}}")));
                        }
                    }
                    in_param = false;
                }
                _ => current.push(c),
            }
        }
        if in_param {
            current.insert(0, '{');
        }
        if !current.is_empty() {
            parts.push(PathPart::Static(current));
        }
        parts
    }

    fn path_param_name(&self, placeholder: &str) -> Option<String> {
        self.parameters
            .iter()
            .find(|p| {
                p.location == ParamLocation::Path
                    && (p.raw_name == placeholder || p.name == placeholder)
            })
            .map(|p| p.unique_name.clone())
    }

    /// Path with placeholders rewritten as template-literal interpolations,
    /// `${params.x}` when parameters are wrapped and `${x}` otherwise.
    pub fn interpolated_path(&self) -> String {
        let prefix = if self.wrap_params_in_object {
            "params."
        } else {
            ""
        };
        self.path_parts()
            .into_iter()
            .map(|part| match part {
                PathPart::Static(s) => s,
                PathPart::Param(name) => format!("${{{prefix}{name}}}"),
            })
            .collect()
    }

    /// Function name of a body variant.
    pub fn variant_name(&self, body: Option<&RequestBody>) -> String {
        match body {
            Some(body) => format!("{}{}", self.name, body.suffix),
            None => self.name.clone(),
        }
    }
}
