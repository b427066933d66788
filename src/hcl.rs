//! HCL rendering helpers
//!
//! Blocks are rendered through Handlebars with HTML escaping disabled. Values
//! reach the templates already in HCL literal form (quoted and escaped by
//! [`quote`]), and keys are pre-padded so the output is `terraform fmt` aligned.

use handlebars::Handlebars;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const RESOURCE_TEMPLATE: &str = "resource";
pub const IMPORT_TEMPLATE: &str = "import";

const RESOURCE_TEMPLATE_SOURCE: &str = r#"resource "{{resource_type}}" "{{name}}" {
{{#each attributes}}  {{key}} = {{value}}
{{/each}}{{#if tags}}  tags = {
{{#each tags}}    {{key}} = {{value}}
{{/each}}  }
{{/if}}}
"#;

const IMPORT_TEMPLATE_SOURCE: &str = r#"import {
  to = {{address}}
  id = {{id}}
}
"#;

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_-]+").unwrap();
    static ref BARE_KEY: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap();
}

/// A `key = value` line inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Data for [`RESOURCE_TEMPLATE`]
#[derive(Debug, Clone, Serialize)]
pub struct ResourceBlock {
    pub resource_type: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub tags: Vec<Attribute>,
}

/// Data for [`IMPORT_TEMPLATE`]
#[derive(Debug, Clone, Serialize)]
pub struct ImportBlock {
    pub address: String,
    pub id: String,
}

/// Create the template registry used by every emitter
pub fn registry() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();

    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars.register_template_string(RESOURCE_TEMPLATE, RESOURCE_TEMPLATE_SOURCE)?;
    handlebars.register_template_string(IMPORT_TEMPLATE, IMPORT_TEMPLATE_SOURCE)?;

    Ok(handlebars)
}

/// Render a string as a quoted HCL literal
pub fn quote(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // Template sequences would be interpolated by Terraform
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }

    escaped.push('"');
    escaped
}

/// Render a map key, quoting it when it is not a valid bare identifier
pub fn map_key(key: &str) -> String {
    if BARE_KEY.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Pad keys so that the `=` signs line up
pub fn align(pairs: Vec<(String, String)>) -> Vec<Attribute> {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    pairs
        .into_iter()
        .map(|(key, value)| Attribute {
            key: format!("{:width$}", key, width = width),
            value,
        })
        .collect()
}

/// Turn an arbitrary label into a valid Terraform resource name
///
/// Keeps letters, digits, `_` and `-`; other runs become `_`. Names must start
/// with a letter or underscore.
pub fn resource_name(label: &str) -> String {
    let sanitized = INVALID_NAME_CHARS.replace_all(label, "_");
    let sanitized = sanitized.trim_matches('_');

    match sanitized.chars().next() {
        None => "resource".to_string(),
        Some(c) if c.is_ascii_digit() || c == '-' => format!("r_{}", sanitized),
        Some(_) => sanitized.to_string(),
    }
}
