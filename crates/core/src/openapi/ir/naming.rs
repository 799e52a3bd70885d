//! Identifier normalization.
//!
//! Pure string transforms turning raw schema, operation and parameter names
//! into identifiers the generated client can use.

/// Names that collide with reserved words in generated code.
const RESERVED_METHOD_NAMES: &[&str] = &["delete"];

/// Uppercase the first letter and every letter following `.`, `-` or `/`,
/// dropping the separators.
pub fn classname_of(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut need_upper = true;
    for c in raw.chars() {
        if matches!(c, '.' | '-' | '/') {
            need_upper = true;
        } else if need_upper {
            result.extend(c.to_uppercase());
            need_upper = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Replace `.` and `/` with `_`; escape reserved names with a `$` prefix.
pub fn method_name_of(raw: &str) -> String {
    if RESERVED_METHOD_NAMES.contains(&raw) {
        format!("${raw}")
    } else {
        raw.replace(['.', '/'], "_")
    }
}

/// Replace `.` and `-` with `_`.
pub fn property_name_of(raw: &str) -> String {
    raw.replace(['.', '-'], "_")
}

/// Capitalize the first letter of a string.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn word_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

/// Identifier-safe parameter name: `x-request-id` becomes `xRequestId`.
pub fn parameter_name_of(raw: &str) -> String {
    let mut tokens = word_tokens(raw);
    let mut result = tokens.next().unwrap_or_default().to_string();
    for token in tokens {
        result.push_str(&capitalize(token));
    }
    result
}

/// Operation name fragment derived from a path: `/pets/{petId}` becomes
/// `PetsByPetId`.
pub fn path_to_name(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let token = match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                Some(param) => format!("By{}", capitalize(param)),
                None => segment.to_string(),
            };
            word_tokens(&token).map(capitalize).collect::<String>()
        })
        .collect()
}
