use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Global context available to all templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalContext {
    pub version: String,
    pub timestamp: String,
    pub generator_name: String,
}

impl GlobalContext {
    pub fn new(generator_name: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            generator_name: generator_name.to_string(),
        }
    }
}

/// Register common templates used across all generators
pub fn register_common_templates(tera: &mut Tera) -> Result<()> {
    tera.add_raw_template("common/header.tera", include_str!("templates/header.tera"))
        .map_err(|e| Error::Template(format!("Failed to register common/header.tera: {}", e)))?;

    Ok(())
}

/// Register common escaping filters
pub fn register_common_filters(tera: &mut Tera) {
    tera.register_filter("xml_doc", xml_doc_filter);
}

/// Render a template, folding tera's error chain into one message
pub fn render(tera: &Tera, template_name: &str, context: &Context) -> Result<String> {
    tera.render(template_name, context).map_err(|e| {
        let mut error_msg = format!("Failed to render template '{}': {}", template_name, e);
        if let Some(source) = std::error::Error::source(&e) {
            error_msg.push_str(&format!("\nSource: {}", source));
        }
        Error::Template(error_msg)
    })
}

// === Common Filters ===

fn xml_doc_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    if let Some(s) = value.as_str() {
        Ok(Value::String(escape_for_xml_doc(s)))
    } else {
        Err("xml_doc filter expects a string".into())
    }
}

/// Make text safe for a single-line `///` XML doc comment
pub fn escape_for_xml_doc(s: &str) -> String {
    s.replace('&', "&amp;") // Ampersand must be first
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(['\r', '\n'], " ")
}
