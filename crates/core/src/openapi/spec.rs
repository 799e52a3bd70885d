//! OpenAPI specification structs for serde deserialization.
//!
//! A minimal subset of OpenAPI 3.x (plus the Swagger 2 `#/definitions/`
//! reference prefix) sufficient to classify schemas and resolve operations.
//! Maps are insertion-ordered so that resolution follows declaration order.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Reference prefix of component schemas.
pub const SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Reference prefix of Swagger 2 definitions.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Reference prefix of shared request bodies.
pub const SHARED_BODIES_PREFIX: &str = "#/components/requestBodies/";

/// Reference prefix of shared parameters.
pub const PARAMETERS_PREFIX: &str = "#/components/parameters/";

/// Root OpenAPI specification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpenApiSpec {
    /// Path templates mapped to their operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    #[serde(default)]
    pub components: Components,
}

impl OpenApiSpec {
    /// Parse an OpenAPI spec from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert an already parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The parameter itself, or the shared parameter its `$ref` points at.
    pub fn parameter<'a>(&'a self, param: &'a Parameter) -> Option<&'a Parameter> {
        match param.ref_path.as_deref() {
            None => Some(param),
            Some(reference) => reference
                .strip_prefix(PARAMETERS_PREFIX)
                .and_then(|name| self.components.parameters.get(name))
                .filter(|shared| shared.ref_path.is_none()),
        }
    }
}

/// Components section containing reusable schemas and request bodies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    /// Shared request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
    /// Shared parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
}

/// HTTP verbs a path item may declare, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `options`
    Options,
    /// `head`
    Head,
    /// `patch`
    Patch,
    /// `trace`
    Trace,
}

impl HttpMethod {
    /// Lowercase verb as it appears in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
    /// `OPTIONS` operation.
    pub options: Option<Operation>,
    /// `HEAD` operation.
    pub head: Option<Operation>,
    /// `PATCH` operation.
    pub patch: Option<Operation>,
    /// `TRACE` operation.
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Declared operations in canonical verb order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
            (HttpMethod::Options, self.options.as_ref()),
            (HttpMethod::Head, self.head.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
            (HttpMethod::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request body, inline or a reference to a shared body.
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code or `default`.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Deprecation marker.
    #[serde(default)]
    pub deprecated: bool,
}

/// A parameter (path, query, header or cookie), or a reference to a shared
/// one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Parameter {
    /// Reference to `#/components/parameters/...`.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Raw parameter name.
    #[serde(default)]
    pub name: String,
    /// Location: `path`, `query`, `header` or `cookie`.
    #[serde(rename = "in", default)]
    pub location: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Deprecation marker.
    #[serde(default)]
    pub deprecated: bool,
    /// Parameter schema.
    pub schema: Option<Schema>,
}

/// A request body definition, or a reference to a shared one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestBody {
    /// Reference to `#/components/requestBodies/...`.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Whether the body is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Media types keyed by mime type.
    pub content: Option<IndexMap<String, MediaType>>,
}

/// A response definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Response {
    /// Description.
    pub description: Option<String>,
    /// Media types keyed by mime type.
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// `required` is a name list on objects and a flag on properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Required {
    /// Property-level flag.
    Flag(bool),
    /// Object-level list of required property names.
    Names(Vec<String>),
}

/// JSON Schema definition used in OpenAPI.
///
/// Deserializes from an object, from a boolean schema, or from the `[]`
/// placeholder some generators emit for "no body".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "SchemaRepr")]
pub struct Schema {
    /// The declared type.
    pub schema_type: Option<SchemaType>,
    /// Reference to another schema.
    pub ref_path: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Format hint (e.g., int64, binary).
    pub format: Option<String>,
    /// Properties for object types.
    pub properties: IndexMap<String, Schema>,
    /// Required names (object) or flag (property).
    pub required: Option<Required>,
    /// Item schema for array types.
    pub items: Option<Box<Schema>>,
    /// Enum literals.
    pub enum_values: Option<Vec<Value>>,
    /// Intersection members.
    pub all_of: Vec<Schema>,
    /// Exclusive union members.
    pub one_of: Vec<Schema>,
    /// Union members.
    pub any_of: Vec<Schema>,
    /// OpenAPI 3.0 nullable flag.
    pub nullable: Option<bool>,
    /// Default value.
    pub default: Option<Value>,
    /// True for `{}` and `[]` definitions.
    pub placeholder: bool,
}

impl Schema {
    /// A bare `$ref` to a component schema.
    pub fn reference(name: &str) -> Self {
        Self {
            ref_path: Some(format!("{SCHEMA_PREFIX}{name}")),
            ..Self::default()
        }
    }

    /// Whether the definition is the degenerate `{}` or `[]`.
    pub fn is_empty_object_or_array(&self) -> bool {
        self.placeholder
    }

    /// The declared type, skipping `null` in a type array.
    pub fn primary_type(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => Some(t.as_str()),
            Some(SchemaType::Multiple(types)) => {
                types.iter().map(String::as_str).find(|t| *t != "null")
            }
            None => None,
        }
    }

    /// Whether the declared type is exactly `null`.
    pub fn is_null_type(&self) -> bool {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => t == "null",
            Some(SchemaType::Multiple(types)) => {
                !types.is_empty() && types.iter().all(|t| t == "null")
            }
            None => false,
        }
    }

    /// Whether a type array lists `null` next to a concrete type.
    pub fn type_array_allows_null(&self) -> bool {
        matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    /// Target name of `$ref` with the component prefix stripped.
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path.as_deref().map(strip_schema_prefix)
    }

    /// An untyped or `object`-typed definition with inline properties.
    pub fn is_inline_object(&self) -> bool {
        self.ref_path.is_none()
            && !self.properties.is_empty()
            && matches!(self.primary_type(), None | Some("object"))
    }

    /// Object-level required names; empty for the property-level flag.
    pub fn required_names(&self) -> &[String] {
        match &self.required {
            Some(Required::Names(names)) => names,
            _ => &[],
        }
    }

    /// Property-level required flag.
    pub fn required_flag(&self) -> bool {
        matches!(self.required, Some(Required::Flag(true)))
    }
}

/// Strip the schema reference prefix, leaving other references untouched.
pub fn strip_schema_prefix(reference: &str) -> &str {
    reference
        .strip_prefix(SCHEMA_PREFIX)
        .or_else(|| reference.strip_prefix(DEFINITIONS_PREFIX))
        .unwrap_or(reference)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaRepr {
    Placeholder(Vec<Value>),
    Flag(bool),
    Object(Box<SchemaObjectRepr>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaObjectRepr {
    #[serde(rename = "type")]
    schema_type: Option<SchemaType>,
    #[serde(rename = "$ref")]
    ref_path: Option<String>,
    title: Option<String>,
    description: Option<String>,
    format: Option<String>,
    properties: Option<IndexMap<String, Schema>>,
    required: Option<Required>,
    items: Option<Box<Schema>>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<Value>>,
    all_of: Option<Vec<Schema>>,
    one_of: Option<Vec<Schema>>,
    any_of: Option<Vec<Schema>>,
    nullable: Option<bool>,
    default: Option<Value>,
    #[serde(flatten)]
    rest: IndexMap<String, Value>,
}

impl SchemaObjectRepr {
    fn is_blank(&self) -> bool {
        self.schema_type.is_none()
            && self.ref_path.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.format.is_none()
            && self.properties.is_none()
            && self.required.is_none()
            && self.items.is_none()
            && self.enum_values.is_none()
            && self.all_of.is_none()
            && self.one_of.is_none()
            && self.any_of.is_none()
            && self.nullable.is_none()
            && self.default.is_none()
            && self.rest.is_empty()
    }
}

impl From<SchemaRepr> for Schema {
    fn from(repr: SchemaRepr) -> Self {
        match repr {
            SchemaRepr::Placeholder(values) => Self {
                placeholder: values.is_empty(),
                ..Self::default()
            },
            // Boolean schemas say nothing about the type.
            SchemaRepr::Flag(true | false) => Self::default(),
            SchemaRepr::Object(obj) => {
                let placeholder = obj.is_blank();
                let obj = *obj;
                Self {
                    schema_type: obj.schema_type,
                    ref_path: obj.ref_path,
                    title: obj.title,
                    description: obj.description,
                    format: obj.format,
                    properties: obj.properties.unwrap_or_default(),
                    required: obj.required,
                    items: obj.items,
                    enum_values: obj.enum_values,
                    all_of: obj.all_of.unwrap_or_default(),
                    one_of: obj.one_of.unwrap_or_default(),
                    any_of: obj.any_of.unwrap_or_default(),
                    nullable: obj.nullable,
                    default: obj.default,
                    placeholder,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_placeholders() {
        assert!(schema("[]").is_empty_object_or_array());
        assert!(schema("{}").is_empty_object_or_array());
        assert!(!schema(r#"{ "example": 1 }"#).is_empty_object_or_array());
        assert!(!schema(r#"{ "properties": {} }"#).is_empty_object_or_array());
        assert!(!schema("true").is_empty_object_or_array());
        assert_eq!(schema("false"), Schema::default());
    }

    #[test]
    fn test_parameter_references() {
        let spec = OpenApiSpec::from_json(
            r##"{
                "components": { "parameters": {
                    "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                } },
                "paths": { "/pets": { "get": { "parameters": [
                    { "$ref": "#/components/parameters/Limit" },
                    { "$ref": "#/components/parameters/Missing" },
                    { "name": "q", "in": "query" }
                ] } } }
            }"##,
        )
        .unwrap();
        let params = &spec.paths["/pets"].get.as_ref().unwrap().parameters;
        assert_eq!(spec.parameter(&params[0]).unwrap().name, "limit");
        assert!(spec.parameter(&params[1]).is_none());
        assert_eq!(spec.parameter(&params[2]).unwrap().name, "q");
    }

    #[test]
    fn test_type_arrays() {
        let s = schema(r#"{ "type": ["null", "string"] }"#);
        assert_eq!(s.primary_type(), Some("string"));
        assert!(s.type_array_allows_null());
        assert!(!s.is_null_type());
        assert!(schema(r#"{ "type": "null" }"#).is_null_type());
    }

    #[test]
    fn test_required_forms() {
        let obj = schema(r#"{ "required": ["a", "b"] }"#);
        assert_eq!(obj.required_names(), ["a", "b"]);
        assert!(!obj.required_flag());
        let prop = schema(r#"{ "type": "string", "required": true }"#);
        assert!(prop.required_names().is_empty());
        assert!(prop.required_flag());
    }

    #[test]
    fn test_ref_prefixes() {
        assert_eq!(
            schema(r##"{ "$ref": "#/components/schemas/Pet" }"##).ref_name(),
            Some("Pet")
        );
        assert_eq!(
            schema(r##"{ "$ref": "#/definitions/Pet" }"##).ref_name(),
            Some("Pet")
        );
    }

    #[test]
    fn test_nested_placeholders_and_order() {
        let s = schema(
            r#"{ "type": "object", "properties": { "z": {}, "a": [], "m": { "type": "string" } } }"#,
        );
        let names: Vec<_> = s.properties.keys().map(String::as_str).collect();
        assert_eq!(names, ["z", "a", "m"]);
        assert!(s.properties["z"].is_empty_object_or_array());
        assert!(s.properties["a"].is_empty_object_or_array());
        assert!(s.is_inline_object());
    }

    #[test]
    fn test_path_item_operation_order() {
        let item: PathItem = serde_json::from_str(
            r#"{ "post": { "responses": {} }, "get": { "responses": {} }, "parameters": [] }"#,
        )
        .unwrap();
        let verbs: Vec<_> = item.operations().map(|(m, _)| m.as_str()).collect();
        assert_eq!(verbs, ["get", "post"]);
    }
}
