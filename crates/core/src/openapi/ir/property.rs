//! Property resolution.
//!
//! A property is a named, typed slot: an object field, a parameter schema, a
//! request body or a response payload. Its type comes from the first rule in
//! this chain that applies:
//!
//! 1. `$ref`
//! 2. inline object with properties (promoted later under `{parent}${name}`)
//! 3. `allOf` as an intersection
//! 4. `oneOf` as a union
//! 5. `anyOf` as a union, minus `null` branches
//! 6. `{}` / `[]` placeholder as an untyped object
//! 7. the declared primitive type
//! 8. `any`

use std::sync::Arc;

use serde_json::Value;

use super::types::{Primitive, Schema, SchemaKinds, TypeRef};
use crate::openapi::spec;
use crate::options::GenerationOptions;

/// A named, typed slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Raw property name.
    pub name: String,
    /// Resolved type.
    pub ty: TypeRef,
    /// Format hint.
    pub format: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Default value.
    pub default: Option<Value>,
    /// Whether the value may be null.
    pub nullable: bool,
    /// Whether the value must be present.
    pub required: bool,
    /// Whether the type is a `$ref` (bare or as the only `allOf` branch) to
    /// an object schema. Inline objects awaiting promotion do not count.
    pub references_object: bool,
    /// Whether the array item type points at an object schema.
    pub item_references_object: bool,
    /// Enum literals declared inline.
    pub enum_values: Option<Vec<Value>>,
    /// Inline object definition awaiting promotion to a pool entry named by
    /// `ty`.
    pub in_place: Option<Box<spec::Schema>>,
}

impl Property {
    /// A plain property with every flag cleared.
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            format: None,
            description: None,
            default: None,
            nullable: false,
            required: false,
            references_object: false,
            item_references_object: false,
            enum_values: None,
            in_place: None,
        }
    }

    /// A property referring to a pool entry.
    pub fn reference(name: &str, target: &str, references_object: bool) -> Self {
        Self {
            references_object,
            ..Self::new(name, TypeRef::Named(target.to_string()))
        }
    }

    /// A property whose object type is declared inline and promoted under
    /// `promoted_name`.
    pub fn inline_object(name: &str, promoted_name: String, def: &spec::Schema) -> Self {
        Self {
            description: def.description.clone(),
            in_place: Some(Box::new(def.clone())),
            ..Self::new(name, TypeRef::Named(promoted_name))
        }
    }

    /// Resolve a property definition declared on `parent`.
    pub fn from_definition(
        parent: &str,
        name: &str,
        def: &spec::Schema,
        kinds: &SchemaKinds,
        options: &GenerationOptions,
    ) -> Self {
        let is_object_ref = |s: &spec::Schema| s.ref_name().is_some_and(|n| kinds.is_object(n));

        let (ty, in_place) = resolve_type(parent, name, def);
        let references_object =
            is_object_ref(def) || (def.all_of.len() == 1 && is_object_ref(&def.all_of[0]));
        let item_references_object = def.items.as_deref().is_some_and(is_object_ref);

        let nullable = def.nullable == Some(true)
            || (references_object
                && options.referenced_objects_nullable_by_default
                && def.nullable != Some(false))
            || def.any_of.iter().any(spec::Schema::is_null_type)
            || def.type_array_allows_null();

        Self {
            name: name.to_string(),
            ty,
            format: def.format.clone(),
            description: def.description.clone(),
            default: def.default.clone(),
            nullable,
            required: def.required_flag(),
            references_object,
            item_references_object,
            enum_values: def.enum_values.clone(),
            in_place,
        }
    }

    /// Copy with a different name.
    pub fn with_name(self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self
        }
    }

    /// Copy with a different required flag.
    pub fn with_required(self, required: bool) -> Self {
        Self { required, ..self }
    }

    /// Copy with a different nullable flag.
    pub fn with_nullable(self, nullable: bool) -> Self {
        Self { nullable, ..self }
    }

    /// Copy with a different description.
    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Name and definition of an inline object still to be promoted.
    pub fn pending_in_place(&self) -> Option<(&str, &spec::Schema)> {
        let def = self.in_place.as_deref()?;
        self.ty.named().map(|name| (name, def))
    }

    /// Item type when this is an array.
    pub fn items(&self) -> Option<&TypeRef> {
        self.ty.item()
    }

    /// Whether the type is an array.
    pub fn is_array(&self) -> bool {
        self.ty.is_array()
    }
}

fn resolve_type(
    parent: &str,
    name: &str,
    def: &spec::Schema,
) -> (TypeRef, Option<Box<spec::Schema>>) {
    if let Some(target) = def.ref_name() {
        return (TypeRef::Named(target.to_string()), None);
    }
    if def.is_inline_object() {
        let promoted = TypeRef::Named(format!("{parent}${name}"));
        return (promoted, Some(Box::new(def.clone())));
    }
    if let Some(ty) = TypeRef::intersection(def.all_of.iter().filter_map(member_type).collect()) {
        return (ty, None);
    }
    if let Some(ty) = TypeRef::union(def.one_of.iter().filter_map(member_type).collect()) {
        return (ty, None);
    }
    let non_null = def.any_of.iter().filter(|branch| !branch.is_null_type());
    if let Some(ty) = TypeRef::union(non_null.filter_map(member_type).collect()) {
        return (ty, None);
    }
    if def.is_empty_object_or_array() {
        return (TypeRef::Primitive(Primitive::Object), None);
    }
    let ty = def
        .primary_type()
        .map_or(TypeRef::Primitive(Primitive::Any), |t| declared_type(t, def));
    (ty, None)
}

/// Type of a composition branch: its reference, else its declared type.
fn member_type(branch: &spec::Schema) -> Option<TypeRef> {
    branch
        .ref_name()
        .map(|n| TypeRef::Named(n.to_string()))
        .or_else(|| branch.primary_type().map(|t| declared_type(t, branch)))
}

fn declared_type(type_name: &str, def: &spec::Schema) -> TypeRef {
    let primitive = match type_name {
        "string" if def.format.as_deref() == Some("binary") => Primitive::Binary,
        "string" => Primitive::String,
        "integer" | "number" => Primitive::Number,
        "boolean" => Primitive::Boolean,
        "object" => Primitive::Object,
        "file" => Primitive::File,
        "array" => return TypeRef::Array(Box::new(item_type(def.items.as_deref()))),
        _ => Primitive::Any,
    };
    TypeRef::Primitive(primitive)
}

/// Array items never promote inline objects or build intersections.
fn item_type(items: Option<&spec::Schema>) -> TypeRef {
    let Some(items) = items else {
        return TypeRef::Primitive(Primitive::Any);
    };
    if let Some(target) = items.ref_name() {
        return TypeRef::Named(target.to_string());
    }
    if let Some(ty) = TypeRef::union(items.one_of.iter().filter_map(member_type).collect()) {
        return ty;
    }
    let non_null = items.any_of.iter().filter(|branch| !branch.is_null_type());
    if let Some(ty) = TypeRef::union(non_null.filter_map(member_type).collect()) {
        return ty;
    }
    if items.is_inline_object() || items.is_empty_object_or_array() {
        return TypeRef::Primitive(Primitive::Object);
    }
    items
        .primary_type()
        .map_or(TypeRef::Primitive(Primitive::Any), |t| declared_type(t, items))
}

/// Entry for a property-classified pool schema.
pub(crate) fn pool_entry(
    name: &str,
    def: &spec::Schema,
    kinds: &SchemaKinds,
    options: &GenerationOptions,
) -> Schema {
    let property = Property::from_definition(name, name, def, kinds, options);
    Schema::Property(Arc::new(property))
}
