//! Tool card extraction from OpenAPI documents.
//!
//! This module turns an OpenAPI-style document into a flat list of
//! [`ToolCard`] records ready for embedding and indexing. Extraction is
//! best-effort: a missing or unreadable spec yields an empty set and a
//! malformed individual operation is skipped (partial success model), so a
//! broken spec never takes the startup sequence down with it.

use crate::error::{AppError, Result};
use crate::ingestion::types::{ParamMap, ParamSpec, ToolCard};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// HTTP methods recognized as operations under a path item.
const METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

/// Placeholder when an operation carries neither summary nor description.
const NO_DESCRIPTION: &str = "No description available.";

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Load the spec file at `path` and extract tool cards from it.
///
/// Absence or parse failure degrades to an empty result with a warning;
/// the caller decides whether to continue without tool retrieval.
pub fn load_tool_cards(path: &Path) -> Vec<ToolCard> {
    let document = match read_spec(path) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(error = %e, "Starting without tool cards");
            return Vec::new();
        }
    };

    let cards = extract_tool_cards(&document);
    tracing::info!(
        path = %path.display(),
        cards = cards.len(),
        "Extracted tool cards from OpenAPI spec"
    );
    cards
}

/// Read and parse the spec document at `path`.
fn read_spec(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::SpecUnavailable(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&raw)
        .map_err(|e| AppError::SpecUnavailable(format!("{}: not valid JSON: {e}", path.display())))
}

/// Extract one [`ToolCard`] per declared `(path, method)` pair.
///
/// Pure transformation, no I/O. Visiting order follows the document, so the
/// same document always yields an identical card sequence.
pub fn extract_tool_cards(document: &Value) -> Vec<ToolCard> {
    let Some(paths) = document.get("paths").and_then(|p| p.as_object()) else {
        tracing::warn!("No 'paths' object found in the OpenAPI document");
        return Vec::new();
    };

    let mut cards = Vec::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for (path, path_item) in paths {
        let Some(path_item) = path_item.as_object() else {
            tracing::warn!(path = %path, "Skipping non-object path item");
            continue;
        };

        for method in METHODS {
            let Some(op) = path_item.get(method) else {
                continue;
            };
            let Some(op) = op.as_object() else {
                tracing::warn!(path = %path, method, "Skipping malformed operation");
                continue;
            };

            let mut params = ParamMap::new();

            // Path-level parameters first, then operation-level; a later
            // declaration with the same name overwrites the earlier one.
            for source in [path_item.get("parameters"), op.get("parameters")] {
                collect_parameters(source, &mut params);
            }
            collect_body_properties(op.get("requestBody"), &mut params);

            params.sort_required_first();

            let description = [op.get("summary"), op.get("description")]
                .into_iter()
                .find_map(|field| field.and_then(|v| v.as_str()).filter(|s| !s.is_empty()))
                .unwrap_or(NO_DESCRIPTION);

            let fallback = format!("{}_{}", method, path.replace('/', "_"));
            let name = match op.get("operationId").and_then(|v| v.as_str()) {
                Some(id) if !id.is_empty() && !used_names.contains(id) => id.to_string(),
                // Collisions resolve deterministically to the method+path
                // form, which is unique per document.
                _ => fallback,
            };
            used_names.insert(name.clone());

            cards.push(ToolCard {
                name,
                description: strip_html(description),
                method: method.to_uppercase(),
                path: path.clone(),
                params,
            });
        }
    }

    cards
}

/// Fold a `parameters` array into the map. Entries without a name are
/// skipped.
fn collect_parameters(parameters: Option<&Value>, params: &mut ParamMap) {
    let Some(list) = parameters.and_then(|p| p.as_array()) else {
        return;
    };

    for parameter in list {
        let Some(name) = parameter.get("name").and_then(|n| n.as_str()) else {
            continue;
        };
        let schema = parameter.get("schema").unwrap_or(&Value::Null);
        let required = parameter
            .get("required")
            .and_then(|r| r.as_bool())
            .unwrap_or(false);
        let location = parameter
            .get("in")
            .and_then(|i| i.as_str())
            .map(str::to_string);

        params.insert(name.to_string(), param_spec(schema, required, location));
    }
}

/// Fold request-body schema properties into the map as `body` parameters.
/// Body properties may shadow a same-named query or path parameter.
fn collect_body_properties(request_body: Option<&Value>, params: &mut ParamMap) {
    let Some(content) = request_body.and_then(|b| b.get("content")) else {
        return;
    };

    // Support both JSON and form-encoded bodies.
    let Some(schema) = content
        .get("application/json")
        .or_else(|| content.get("application/x-www-form-urlencoded"))
        .and_then(|c| c.get("schema"))
    else {
        return;
    };

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return;
    };

    let required: HashSet<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|list| list.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    for (name, property) in properties {
        params.insert(
            name.clone(),
            param_spec(
                property,
                required.contains(name.as_str()),
                Some("body".to_string()),
            ),
        );
    }
}

fn param_spec(schema: &Value, required: bool, location: Option<String>) -> ParamSpec {
    ParamSpec {
        ty: normalize_type(schema),
        required,
        location,
        min_length: schema.get("minLength").and_then(|v| v.as_u64()),
        max_length: schema.get("maxLength").and_then(|v| v.as_u64()),
        allowed_values: schema.get("enum").and_then(|v| v.as_array()).map(|list| {
            list.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        }),
        format: schema.get("format").and_then(|v| v.as_str()).map(str::to_string),
    }
}

/// Resolve a schema's `type`: first element when declared as an array,
/// `"string"` when absent.
fn normalize_type(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(ty)) => ty.clone(),
        Some(Value::Array(types)) => types
            .first()
            .and_then(|t| t.as_str())
            .unwrap_or("string")
            .to_string(),
        _ => "string".to_string(),
    }
}

/// Strip HTML tags and collapse runs of whitespace.
fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");
    WHITESPACE.replace_all(&without_tags, " ").trim().to_string()
}
