//! Resolved intermediate representation and the passes that build it.
//!
//! Passes run in order: classify, build the pool, resolve operations, promote
//! anonymous objects. Each pass reads the previous one's output and never
//! mutates it.

pub mod api;
pub mod classify;
pub mod inplace;
pub mod naming;
pub mod operations;
pub mod pool;
pub mod property;
pub mod types;

pub use api::{
    BodyMime, Method, ParamLocation, Parameter, ParseMode, PathPart, RequestBody, ResponseDetails,
};
pub use property::Property;
pub use types::{
    EnumSchema, ObjectSchema, Primitive, Schema, SchemaKind, SchemaKinds, SchemaPool, TypeRef,
};
