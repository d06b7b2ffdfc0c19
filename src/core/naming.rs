//! Deterministic name sanitizers.
//!
//! Identifiers and labels have different charsets, so there are two
//! sanitizers: `sanitize_identifier` for generated code, `sanitize_label` for
//! cloud metadata labels and orchestrator object names.

/// Maximum length of a label value.
pub const LABEL_MAX_LEN: usize = 63;

/// Turn an arbitrary name into a valid code identifier.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`; a leading digit gets a
/// `_` prefix.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Turn an arbitrary value into a valid label value.
///
/// Lowercases, replaces characters outside `[a-z0-9_-]` with `-`, forces a
/// leading letter and truncates to 63 characters.
pub fn sanitize_label(value: &str) -> String {
    let mut out: String = value
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_lowercase()) {
        out.insert(0, 'x');
    }
    out.truncate(LABEL_MAX_LEN);
    out
}

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Output variable name: `{sanitizedName}{Capitalized-field}`.
pub fn output_variable(name: &str, field: &str) -> String {
    format!("{}{}", sanitize_identifier(name), capitalize(field))
}

/// Identifier a generator declares for a resource, e.g. `api_service`.
pub fn code_identifier(name: &str, suffix: &str) -> String {
    format!("{}_{}", sanitize_identifier(name), suffix)
}

/// Construct-backend resource name: `{project}-{name}`.
pub fn prefixed_name(project: &str, name: &str) -> String {
    format!("{}-{}", project, name)
}

/// Image tag convention: `{registry-url}/{name}:{tag}`.
pub fn image_tag(registry_url: &str, name: &str, tag: &str) -> String {
    format!("{}/{}:{}", registry_url.trim_end_matches('/'), name, tag)
}
