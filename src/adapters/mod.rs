//! Importers that map foreign token exports onto the canonical tree
//!
//! Each adapter produces a tree with the canonical `primitives` / `semantic`
//! split, ready for [`crate::merge::merge_into_document`]. The keyword
//! heuristics they share live here.

pub mod figma_folder;
pub mod figma_modes;
pub mod kit;

use crate::types::*;
use serde::Serialize;
use serde_json::{Number, Value};

/// Counts reported after an import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub primitive_count: usize,
    pub semantic_count: usize,
    /// Names of foreign variables that were skipped
    pub skipped: Vec<String>,
}

impl ImportSummary {
    pub fn from_tree(tree: &TokenNode, skipped: Vec<String>) -> Self {
        let count = |key: &str| tree.child(key).map(TokenNode::leaf_count).unwrap_or(0);
        Self {
            primitive_count: count(PRIMITIVES_KEY),
            semantic_count: count(SEMANTIC_KEY),
            skipped,
        }
    }

    pub fn total(&self) -> usize {
        self.primitive_count + self.semantic_count
    }
}

/// Broad value kind reported by the foreign format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Color,
    Number,
    Text,
    Boolean,
}

/// Token type from the value kind and a collection / file name
pub fn infer_token_type(kind: ValueKind, name: &str) -> &'static str {
    let name = name.to_lowercase();
    let has = |needle: &str| name.contains(needle);
    let fontish = has("font") || has("typography");

    match kind {
        ValueKind::Color => "color",
        ValueKind::Boolean => "boolean",
        ValueKind::Number => {
            if has("spacing") {
                "spacing"
            } else if has("radius") || has("radii") {
                "borderRadius"
            } else if has("shadow") {
                "boxShadow"
            } else if has("line") && has("height") {
                "lineHeights"
            } else if fontish && has("size") {
                "fontSizes"
            } else if fontish && has("weight") {
                "fontWeights"
            } else {
                "dimension"
            }
        }
        ValueKind::Text => {
            if has("line") && has("height") {
                "lineHeights"
            } else if fontish && has("size") {
                "fontSizes"
            } else if fontish && has("weight") {
                "fontWeights"
            } else if fontish {
                "fontFamilies"
            } else {
                "string"
            }
        }
    }
}

/// Collection names that explicitly hold raw scale values
pub fn names_primitive_collection(name: &str) -> bool {
    let name = name.to_lowercase();
    ["raw", "primitive", "absolute"].iter().any(|k| name.contains(k))
}

/// Collection names that mention a semantic role
pub fn names_semantic_collection(name: &str) -> bool {
    let name = name.to_lowercase();
    ["semantic", "action", "background", "text"].iter().any(|k| name.contains(k))
}

/// `primitives.<family>` branch for a token type
pub fn primitive_family(token_type: &str) -> Option<&'static str> {
    match token_type {
        "color" => Some("colors"),
        "spacing" => Some("space"),
        "borderRadius" => Some("radii"),
        "fontFamilies" => Some("fonts"),
        "fontSizes" => Some("fontSizes"),
        "fontWeights" => Some("fontWeights"),
        "lineHeights" => Some("lineHeights"),
        _ => None,
    }
}

/// Path below `semantic.color` for a colour named `name` found at `path`
pub fn semantic_color_placement(name: &str, path: &[String]) -> Vec<String> {
    let name = name.to_lowercase();
    let has = |needle: &str| name.contains(needle);
    let fixed = |group: &str, key: &str| vec![group.to_string(), key.to_string()];

    if has("background") || has("bg") {
        if has("default") || has("base") {
            fixed("background", "default")
        } else if has("muted") || has("surface") {
            fixed("background", "muted")
        } else {
            fixed("background", "surface")
        }
    } else if has("foreground") || has("text") {
        if has("primary") || has("default") {
            fixed("text", "primary")
        } else if has("secondary") || has("muted") {
            fixed("text", "secondary")
        } else if has("tertiary") {
            fixed("text", "tertiary")
        } else if has("inverse") || has("on-dark") {
            fixed("text", "inverse")
        } else {
            std::iter::once("text".to_string()).chain(path.iter().cloned()).collect()
        }
    } else if has("primary") && (has("action") || has("button")) {
        fixed("action", "primary")
    } else if has("destructive") {
        fixed("action", "destructive")
    } else if has("border") {
        fixed("border", "default")
    } else {
        path.to_vec()
    }
}

/// Empty canonical structure every adapter starts from
pub fn canonical_skeleton() -> TokenNode {
    let mut tree = TokenNode::group();
    for family in ["colors", "fonts", "fontSizes", "fontWeights", "lineHeights", "radii", "space"] {
        tree.insert_at(&[PRIMITIVES_KEY, family], TokenNode::group());
    }
    for role in ["background", "text", "action", "status", "border"] {
        tree.insert_at(&[SEMANTIC_KEY, "color", role], TokenNode::group());
    }
    tree
}

/// Split a foreign variable name on `.`, `-`, `_` and `/`
pub fn split_name(name: &str) -> Vec<String> {
    name.split(|c| matches!(c, '.' | '-' | '_' | '/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `neutral/950` -> `{primitives.colors.neutral.950}`
pub fn slash_reference(value: &str) -> Option<String> {
    let parts: Vec<&str> = value.split('/').collect();
    match parts.as_slice() {
        [group, member] if !group.is_empty() && !member.is_empty() => Some(make_reference(&format!(
            "{}.colors.{}.{}",
            PRIMITIVES_KEY, group, member
        ))),
        _ => None,
    }
}

/// Numeric spacing / radius values gain a `px` unit
pub fn with_px(number: &Number) -> TokenValue {
    TokenValue::Text(format!("{}px", format_number(number)))
}

pub fn takes_px(token_type: &str) -> bool {
    token_type == "spacing" || token_type == "borderRadius"
}

/// Colour objects (`{hex}`, `{components, alpha}`, `{r, g, b, a}`) to CSS text
pub fn convert_color(value: &Value) -> Option<TokenValue> {
    match value {
        Value::String(s) => Some(TokenValue::Text(s.clone())),
        Value::Object(object) => {
            if let Some(hex) = object.get("hex").and_then(Value::as_str) {
                return Some(TokenValue::Text(hex.to_string()));
            }
            let channels: Vec<f64> = match object.get("components").and_then(Value::as_array) {
                Some(components) => components.iter().take(3).filter_map(Value::as_f64).collect(),
                None => ["r", "g", "b"]
                    .iter()
                    .filter_map(|k| object.get(*k).and_then(Value::as_f64))
                    .collect(),
            };
            let [r, g, b] = channels.as_slice() else {
                return None;
            };
            let alpha = object
                .get("alpha")
                .or_else(|| object.get("a"))
                .and_then(Value::as_f64)
                .unwrap_or(1.0);
            Some(TokenValue::Text(rgb_to_css(*r, *g, *b, alpha)))
        }
        _ => None,
    }
}

fn rgb_to_css(r: f64, g: f64, b: f64, alpha: f64) -> String {
    let channel = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    if alpha < 1.0 {
        format!("rgba({}, {}, {}, {})", channel(r), channel(g), channel(b), alpha)
    } else {
        format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
    }
}
