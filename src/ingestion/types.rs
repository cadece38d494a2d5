//! Type definitions for the ingestion module.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A normalized tool record describing one callable API operation.
///
/// Cards are extracted once per spec version and never mutated afterwards;
/// re-extraction produces a fresh generation that replaces prior index
/// entries by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCard {
    /// Unique stable identifier (operation id, or a deterministic
    /// method+path fallback).
    pub name: String,

    /// Human-readable summary, HTML-stripped with collapsed whitespace.
    pub description: String,

    /// Uppercase HTTP verb.
    pub method: String,

    /// URL template, may contain `{param}` placeholders.
    pub path: String,

    /// Typed parameters, required entries first.
    pub params: ParamMap,
}

impl ToolCard {
    /// Serialize the card into the text form handed to the embedding
    /// provider.
    ///
    /// Format: `"{description}. Method: {m}. Path: {p}. Params: {name
    /// (type, required, minLength: n, ...); ...}"`, constraints included
    /// only when present, in that fixed order.
    pub fn embedding_text(&self) -> String {
        let param_text = self
            .params
            .iter()
            .map(|(name, spec)| {
                let mut constraints = Vec::new();
                if spec.required {
                    constraints.push("required".to_string());
                }
                if let Some(n) = spec.min_length {
                    constraints.push(format!("minLength: {n}"));
                }
                if let Some(n) = spec.max_length {
                    constraints.push(format!("maxLength: {n}"));
                }
                if let Some(values) = &spec.allowed_values {
                    constraints.push(format!("enum: [{}]", values.join(", ")));
                }
                if let Some(f) = &spec.format {
                    constraints.push(format!("format: {f}"));
                }

                if constraints.is_empty() {
                    format!("{} ({})", name, spec.ty)
                } else {
                    format!("{} ({}, {})", name, spec.ty, constraints.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ");

        format!(
            "{}. Method: {}. Path: {}. Params: {}",
            self.description, self.method, self.path, param_text
        )
    }
}

/// Constraints for a single parameter, in the original wire form
/// (`type`, `in`, `minLength`, `maxLength`, `enum`, `format`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub ty: String,

    pub required: bool,

    /// Where the parameter lives: `path`, `query`, `header`, or `body`.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Insertion-ordered parameter mapping.
///
/// Overwriting an existing name keeps its first-seen position, matching the
/// JavaScript object semantics the stored metadata format was defined with.
/// Serializes as a JSON object in iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap(Vec<(String, ParamSpec)>);

impl ParamMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or overwrite a parameter. An overwrite replaces the spec in
    /// place without moving the entry.
    pub fn insert(&mut self, name: String, spec: ParamSpec) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = spec,
            None => self.0.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamSpec)> {
        self.0.iter().map(|(name, spec)| (name, spec))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable-sort required parameters before optional ones, preserving
    /// relative input order within each group.
    pub fn sort_required_first(&mut self) {
        self.0.sort_by_key(|(_, spec)| !spec.required);
    }
}

impl FromIterator<(String, ParamSpec)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (String, ParamSpec)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (name, spec) in iter {
            map.insert(name, spec);
        }
        map
    }
}

impl Serialize for ParamMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParamMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamMapVisitor;

        impl<'de> Visitor<'de> for ParamMapVisitor {
            type Value = ParamMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of parameter names to specs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, spec)) = access.next_entry::<String, ParamSpec>()? {
                    entries.push((name, spec));
                }
                Ok(ParamMap(entries))
            }
        }

        deserializer.deserialize_map(ParamMapVisitor)
    }
}
