//! Legacy (`value`/`type`) export for Tokens Studio sync
//!
//! Primitives are always declared before semantic tokens in `tokenSetOrder`
//! so the consuming tool creates referenced collections first.

use crate::document::TokenDocument;
use crate::error::{Result, TokenError};
use crate::normalizer::to_json;
use crate::types::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportLayout {
    /// One collection holding the primitives and a `semantic` group
    #[default]
    Single,
    /// Separate `primitives` and `semantic` collections
    Dual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub layout: ExportLayout,
    pub set_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout: ExportLayout::Single,
            set_name: DEFAULT_SET_NAME.to_string(),
        }
    }
}

/// Build the legacy export document
pub fn export_legacy(document: &TokenDocument, options: &ExportOptions) -> Result<Value> {
    let branch = |key: &str| {
        document
            .tree
            .child(key)
            .filter(|node| !node.is_leaf())
            .cloned()
            .ok_or_else(|| TokenError::invalid_format(format!("document has no '{}' group to export", key)))
    };
    let mut primitives = branch(PRIMITIVES_KEY)?;
    let mut semantic = branch(SEMANTIC_KEY)?;

    let order = document.token_set_order();
    let position = |name: &str| order.iter().position(|n| n == name);
    if let (Some(p), Some(s)) = (position(PRIMITIVES_KEY), position(SEMANTIC_KEY)) {
        if s < p {
            log::warn!("tokenSetOrder lists semantic before primitives; exporting primitives first");
        }
    }

    let exported = match options.layout {
        ExportLayout::Dual => {
            log::debug!("Exporting dual layout");
            json!({
                PRIMITIVES_KEY: to_json(&primitives, TokenFormat::Legacy),
                SEMANTIC_KEY: to_json(&semantic, TokenFormat::Legacy),
                METADATA_KEY: { TOKEN_SET_ORDER_KEY: [PRIMITIVES_KEY, SEMANTIC_KEY] },
            })
        }
        ExportLayout::Single => {
            let set = options.set_name.as_str();
            if set.is_empty() {
                return Err(TokenError::invalid_format("export set name must not be empty"));
            }
            log::debug!("Exporting single layout into set '{}'", set);

            let rewrite = |path: &str| single_set_reference(path, set);
            rewrite_references(&mut primitives, &rewrite);
            rewrite_references(&mut semantic, &rewrite);

            let mut collection = match to_json(&primitives, TokenFormat::Legacy) {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            collection.insert(SEMANTIC_KEY.to_string(), to_json(&semantic, TokenFormat::Legacy));

            let mut root = Map::new();
            root.insert(set.to_string(), Value::Object(collection));
            root.insert(METADATA_KEY.to_string(), json!({ TOKEN_SET_ORDER_KEY: [set] }));
            Value::Object(root)
        }
    };
    Ok(exported)
}

/// `primitives.x` -> `<set>.x`, `semantic.x` -> `<set>.semantic.x`
fn single_set_reference(path: &str, set: &str) -> Option<String> {
    if let Some(rest) = path.strip_prefix("primitives.") {
        Some(format!("{}.{}", set, rest))
    } else if path.starts_with("semantic.") {
        Some(format!("{}.{}", set, path))
    } else {
        None
    }
}

/// Apply `rewrite` to every reference path in the tree, including those inside composites
pub fn rewrite_references<F>(node: &mut TokenNode, rewrite: &F)
where
    F: Fn(&str) -> Option<String>,
{
    match node {
        TokenNode::Leaf(token) => match &mut token.value {
            TokenValue::Text(text) => rewrite_text(text, rewrite),
            TokenValue::Composite(value) => rewrite_value(value, rewrite),
            TokenValue::Number(_) | TokenValue::Bool(_) => {}
        },
        TokenNode::Group(children) => {
            for child in children.values_mut() {
                rewrite_references(child, rewrite);
            }
        }
    }
}

fn rewrite_text<F>(text: &mut String, rewrite: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = reference_path(text).and_then(rewrite) {
        *text = make_reference(&path);
    }
}

fn rewrite_value<F>(value: &mut Value, rewrite: &F)
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(text) => rewrite_text(text, rewrite),
        Value::Array(items) => items.iter_mut().for_each(|item| rewrite_value(item, rewrite)),
        Value::Object(object) => object.values_mut().for_each(|item| rewrite_value(item, rewrite)),
        _ => {}
    }
}
