//! Schema classification.

use tracing::debug;

use super::api::BodyMime;
use super::types::{SchemaKind, SchemaKinds};
use crate::openapi::spec::{self, OpenApiSpec, RequestBody};

/// Pool name of a shared request body.
pub fn shared_body_name(name: &str) -> String {
    format!("{name}$RequestBody")
}

/// Kind of a single named definition.
pub fn kind_of(def: &spec::Schema) -> SchemaKind {
    if def.primary_type() == Some("object")
        || !def.properties.is_empty()
        || !def.all_of.is_empty()
        || def.is_empty_object_or_array()
    {
        SchemaKind::Object
    } else if def.enum_values.is_some() {
        SchemaKind::Enum
    } else {
        SchemaKind::Property
    }
}

/// Mime type and payload schema of the first supported content entry.
pub fn shared_body_media(body: &RequestBody) -> Option<(BodyMime, &spec::Schema)> {
    body.content
        .as_ref()?
        .iter()
        .find_map(|(mime, media)| BodyMime::from_mime(mime).map(|m| (m, media)))
        .and_then(|(mime, media)| media.schema.as_ref().map(|s| (mime, s)))
}

/// Classify every component schema and every shared request body.
///
/// A shared body whose first supported payload is a `$ref` becomes an object
/// extending that schema; any other payload is a property alias.
pub fn classify(spec: &OpenApiSpec) -> SchemaKinds {
    let mut kinds = SchemaKinds::default();
    for (name, def) in &spec.components.schemas {
        kinds.insert(name.clone(), kind_of(def));
    }
    for (name, body) in &spec.components.request_bodies {
        let Some((_, schema)) = shared_body_media(body) else {
            debug!(body = %name, "Skipping shared request body without supported content");
            continue;
        };
        let kind = if schema.ref_path.is_some() {
            SchemaKind::Object
        } else {
            SchemaKind::Property
        };
        kinds.insert(shared_body_name(name), kind);
    }
    debug!(count = kinds.len(), "Classified schemas");
    kinds
}
