//! Spec normalization: OpenAPI documents in, tool cards out.

pub mod openapi;
pub mod types;

pub use openapi::{extract_tool_cards, load_tool_cards};
pub use types::{ParamMap, ParamSpec, ToolCard};
