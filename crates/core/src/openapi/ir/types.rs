//! Resolved schema entities.
//!
//! - `TypeRef`: a resolved type expression
//! - `SchemaKind` / `SchemaKinds`: classification of every schema name
//! - `EnumSchema`, `ObjectSchema`: pool entities
//! - `Schema`: the closed union of pool entities
//! - `SchemaPool`: the published, insertion-ordered pool

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use super::property::Property;
use crate::error::{ResolveError, ResolveResult};
use crate::openapi::spec;
use crate::options::GenerationOptions;

/// Built-in types a schema fragment can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `integer` and `number`
    Number,
    /// `boolean`
    Boolean,
    /// Untyped object, including the `{}`/`[]` placeholders.
    Object,
    /// `string` with `format: binary`
    Binary,
    /// Swagger 2 `file`
    File,
    /// Anything; the fallback for unrecognized shapes.
    Any,
    /// Responses without usable content.
    Unknown,
}

impl Primitive {
    /// Language-neutral name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "object",
            Primitive::Binary => "binary",
            Primitive::File => "file",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
        }
    }
}

/// A resolved type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A built-in type.
    Primitive(Primitive),
    /// A pool entry, by its raw schema name.
    Named(String),
    /// Sequence of the item type.
    Array(Box<TypeRef>),
    /// `A | B`
    Union(Vec<TypeRef>),
    /// `A & B`
    Intersection(Vec<TypeRef>),
}

impl TypeRef {
    /// Union of the members; a single member collapses to itself.
    pub fn union(mut members: Vec<TypeRef>) -> Option<TypeRef> {
        match members.len() {
            0 => None,
            1 => members.pop(),
            _ => Some(TypeRef::Union(members)),
        }
    }

    /// Intersection of the members; a single member collapses to itself.
    pub fn intersection(mut members: Vec<TypeRef>) -> Option<TypeRef> {
        match members.len() {
            0 => None,
            1 => members.pop(),
            _ => Some(TypeRef::Intersection(members)),
        }
    }

    /// Referenced pool name, if this is a plain reference.
    pub fn named(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Item type of an array.
    pub fn item(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(item) => Some(item),
            _ => None,
        }
    }

    /// Whether this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// Whether this is a union type.
    pub fn is_union(&self) -> bool {
        matches!(self, TypeRef::Union(_))
    }

    /// Collect every pool name referenced anywhere in the expression.
    pub fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Primitive(_) => {}
            TypeRef::Named(name) => out.push(name),
            TypeRef::Array(item) => item.collect_names(out),
            TypeRef::Union(members) | TypeRef::Intersection(members) => {
                for member in members {
                    member.collect_names(out);
                }
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.as_str()),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Array(item) => write!(f, "array<{item}>"),
            TypeRef::Union(members) => write_joined(f, members, " | "),
            TypeRef::Intersection(members) => write_joined(f, members, " & "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, members: &[TypeRef], sep: &str) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if sep == " & " && member.is_union() {
            write!(f, "({member})")?;
        } else {
            write!(f, "{member}")?;
        }
    }
    Ok(())
}

/// Classification tag assigned once per schema name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Structured record, possibly with parents.
    Object,
    /// Enumeration of literals.
    Enum,
    /// Anything else: aliases, primitives, unions.
    Property,
}

/// Mapping from every schema name to its kind, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaKinds(IndexMap<String, SchemaKind>);

impl SchemaKinds {
    /// Kind of a schema name.
    pub fn get(&self, name: &str) -> Option<SchemaKind> {
        self.0.get(name).copied()
    }

    /// Whether the name is classified as an object.
    pub fn is_object(&self, name: &str) -> bool {
        self.get(name) == Some(SchemaKind::Object)
    }

    /// Classified names with their kinds.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SchemaKind)> {
        self.0.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Number of classified names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, kind: SchemaKind) {
        self.0.insert(name, kind);
    }
}

/// An enumeration schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// Raw schema name.
    pub name: String,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Underlying primitive type (`string`, `integer`).
    pub ty: Option<String>,
    /// Default literal.
    pub default: Option<Value>,
    /// Literals in declaration order.
    pub values: Vec<Value>,
}

impl EnumSchema {
    /// Build from an enum-classified definition.
    pub fn from_definition(name: &str, def: &spec::Schema) -> Self {
        Self {
            name: name.to_string(),
            title: def.title.clone(),
            description: def.description.clone(),
            ty: def.primary_type().map(str::to_string),
            default: def.default.clone(),
            values: def.enum_values.clone().unwrap_or_default(),
        }
    }
}

/// A structured record with named properties and optional parents.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    /// Raw schema name.
    pub name: String,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Declared type tag.
    pub ty: Option<String>,
    /// Own properties in declaration order.
    pub properties: Vec<Property>,
    /// Parents by name, shared with every other child.
    pub parents: IndexMap<String, Arc<ObjectSchema>>,
    /// Explicitly required names, own and inherited.
    pub required: IndexSet<String>,
}

impl ObjectSchema {
    /// Names of `allOf` references that point at object schemas.
    pub fn parent_names<'a>(def: &'a spec::Schema, kinds: &SchemaKinds) -> IndexSet<&'a str> {
        def.all_of
            .iter()
            .filter_map(spec::Schema::ref_name)
            .filter(|name| kinds.is_object(name))
            .collect()
    }

    /// Build an object against a pool that already holds its parents.
    ///
    /// Properties of `allOf` branches merge in declaration order, followed by
    /// properties declared next to `allOf`; a later definition of a name
    /// replaces an earlier one.
    pub fn from_definition(
        name: &str,
        def: &spec::Schema,
        kinds: &SchemaKinds,
        options: &GenerationOptions,
        pool: &SchemaPool,
    ) -> ResolveResult<Self> {
        let mut parents = IndexMap::new();
        for parent in Self::parent_names(def, kinds) {
            parents.insert(parent.to_string(), Arc::clone(pool.object(parent)?));
        }

        let mut required: IndexSet<String> = def.required_names().iter().cloned().collect();
        for branch in &def.all_of {
            required.extend(branch.required_names().iter().cloned());
        }
        for parent in parents.values() {
            required.extend(parent.required.iter().cloned());
        }

        let mut merged: IndexMap<&str, Property> = IndexMap::new();
        for source in def.all_of.iter().chain(std::iter::once(def)) {
            for (prop_name, prop_def) in &source.properties {
                let property = Property::from_definition(name, prop_name, prop_def, kinds, options);
                merged.insert(prop_name, property);
            }
        }

        let properties = merged
            .into_values()
            .map(|p| {
                if required.contains(&p.name) {
                    p.with_required(true)
                } else {
                    p
                }
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            title: def.title.clone(),
            description: def.description.clone(),
            ty: def.primary_type().map(str::to_string),
            properties,
            parents,
            required,
        })
    }

    /// Own properties followed by inherited ones, breadth-first over the
    /// parent chain. The first occurrence of a name wins.
    pub fn props_including_inherited(&self) -> Vec<Property> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut props = Vec::new();
        for p in &self.properties {
            if seen.insert(&p.name) {
                props.push(p.clone());
            }
        }

        let mut pending: VecDeque<&ObjectSchema> = self.parents.values().map(|p| &**p).collect();
        while let Some(parent) = pending.pop_front() {
            for p in &parent.properties {
                if !seen.insert(&p.name) {
                    continue;
                }
                if self.required.contains(&p.name) && !p.required {
                    props.push(p.clone().with_required(true));
                } else {
                    props.push(p.clone());
                }
            }
            pending.extend(parent.parents.values().map(|p| &**p));
        }
        props
    }
}

/// A pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Object schema.
    Object(Arc<ObjectSchema>),
    /// Enum schema.
    Enum(Arc<EnumSchema>),
    /// Alias, primitive or union.
    Property(Arc<Property>),
}

impl Schema {
    /// Name the entry is registered under.
    pub fn name(&self) -> &str {
        match self {
            Schema::Object(o) => &o.name,
            Schema::Enum(e) => &e.name,
            Schema::Property(p) => &p.name,
        }
    }

    /// Kind tag of the entry.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Object(_) => SchemaKind::Object,
            Schema::Enum(_) => SchemaKind::Enum,
            Schema::Property(_) => SchemaKind::Property,
        }
    }

    /// Object view of the entry.
    pub fn as_object(&self) -> Option<&Arc<ObjectSchema>> {
        match self {
            Schema::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Names referenced by the entry's types and parents.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        match self {
            Schema::Object(o) => {
                names.extend(o.parents.keys().map(String::as_str));
                for p in &o.properties {
                    p.ty.collect_names(&mut names);
                }
            }
            Schema::Enum(_) => {}
            Schema::Property(p) => p.ty.collect_names(&mut names),
        }
        names
    }
}

/// Insertion-ordered mapping from schema name to resolved entity.
///
/// Only the pool builder inserts; everything downstream reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPool {
    entries: IndexMap<String, Schema>,
}

impl SchemaPool {
    /// Entry by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries.get(name)
    }

    /// Whether an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Object entry by name; absence is fatal.
    pub fn object(&self, name: &str) -> ResolveResult<&Arc<ObjectSchema>> {
        self.get(name)
            .and_then(Schema::as_object)
            .ok_or_else(|| ResolveError::MissingSchema(name.to_string()))
    }

    /// Entries in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Schema> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the pool, keeping insertion order.
    pub fn into_schemas(self) -> Vec<Schema> {
        self.entries.into_values().collect()
    }

    pub(crate) fn insert(&mut self, schema: Schema) {
        self.entries.insert(schema.name().to_string(), schema);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn object(name: &str, props: &[(&str, bool)], parents: &[Arc<ObjectSchema>]) -> ObjectSchema {
        ObjectSchema {
            name: name.to_string(),
            title: None,
            description: None,
            ty: Some("object".to_string()),
            properties: props
                .iter()
                .map(|(n, r)| {
                    Property::new(n, TypeRef::Primitive(Primitive::String)).with_required(*r)
                })
                .collect(),
            parents: parents
                .iter()
                .map(|p| (p.name.clone(), Arc::clone(p)))
                .collect(),
            required: IndexSet::new(),
        }
    }

    #[test]
    fn test_type_display() {
        let ty = TypeRef::Array(Box::new(TypeRef::Named("Pet".into())));
        assert_eq!(ty.to_string(), "array<Pet>");
        let union = TypeRef::union(vec![TypeRef::Named("A".into()), TypeRef::Named("B".into())]);
        assert_eq!(union.unwrap().to_string(), "A | B");
        let nested = TypeRef::Intersection(vec![
            TypeRef::Named("A".into()),
            TypeRef::Union(vec![
                TypeRef::Primitive(Primitive::String),
                TypeRef::Primitive(Primitive::Number),
            ]),
        ]);
        assert_eq!(nested.to_string(), "A & (string | number)");
    }

    #[test]
    fn test_singletons_collapse() {
        assert_eq!(
            TypeRef::intersection(vec![TypeRef::Named("A".into())]),
            Some(TypeRef::Named("A".into()))
        );
        assert_eq!(TypeRef::union(Vec::new()), None);
    }

    #[test]
    fn test_child_shadows_parent() {
        let grand = Arc::new(object("Grand", &[("x", false), ("g", false)], &[]));
        let parent = Arc::new(object("Parent", &[("x", true), ("p", false)], &[grand]));
        let child = object("Child", &[("x", false), ("c", false)], &[parent]);

        let props = child.props_including_inherited();
        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["x", "c", "p", "g"]);
        assert!(!props[0].required, "child definition of x must win");
    }

    #[test]
    fn test_inherited_props_upgraded_by_child_required() {
        let parent = Arc::new(object("Parent", &[("p", false)], &[]));
        let mut child = object("Child", &[], &[parent]);
        child.required.insert("p".to_string());

        let props = child.props_including_inherited();
        assert_eq!(props.len(), 1);
        assert!(props[0].required);
    }

    #[test]
    fn test_pool_object_lookup() {
        let mut pool = SchemaPool::default();
        pool.insert(Schema::Object(Arc::new(object("A", &[], &[]))));
        assert!(pool.object("A").is_ok());
        assert!(matches!(
            pool.object("B"),
            Err(ResolveError::MissingSchema(name)) if name == "B"
        ));
    }
}
