//! The canonical `primitives` + `semantic` token document

use crate::error::{Result, TokenError};
use crate::normalizer::{detect_format, normalize};
use crate::types::*;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenDocument {
    /// Normalized root group (`primitives`, `semantic`, any extra groups)
    pub tree: TokenNode,
    /// `$themes`, carried without inspection
    pub themes: Option<Value>,
    /// `$metadata`, carried without inspection
    pub metadata: Option<Value>,
    /// Key convention used for tokens written into the document
    pub format: TokenFormat,
    /// The document as parsed; merges edit it so untouched keys survive a write
    pub raw: Value,
}

impl TokenDocument {
    /// Parse and validate a canonical document
    pub fn parse(text: &str, file: &str) -> Result<Self> {
        let value = parse_json(text, file)?;
        Self::from_value(&value, file)
    }

    pub fn from_value(value: &Value, file: &str) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| TokenError::parse(file, "top-level value must be a JSON object"))?;

        for key in [PRIMITIVES_KEY, SEMANTIC_KEY] {
            match object.get(key) {
                Some(Value::Object(_)) => {}
                Some(_) => {
                    return Err(TokenError::invalid_format(format!(
                        "'{}' in {} must be an object",
                        key, file
                    )))
                }
                None => return Err(TokenError::missing_key(file, key)),
            }
        }

        Ok(Self {
            tree: normalize(value),
            themes: object.get(THEMES_KEY).cloned(),
            metadata: object.get(METADATA_KEY).cloned(),
            format: detect_format(value).unwrap_or_default(),
            raw: value.clone(),
        })
    }

    pub fn primitives(&self) -> Option<&TokenNode> {
        self.tree.child(PRIMITIVES_KEY)
    }

    pub fn semantic(&self) -> Option<&TokenNode> {
        self.tree.child(SEMANTIC_KEY)
    }

    /// Collection names listed in `$metadata.tokenSetOrder`
    pub fn token_set_order(&self) -> Vec<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(TOKEN_SET_ORDER_KEY))
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Value {
        self.raw.clone()
    }

    /// Two-space indented JSON
    pub fn to_pretty_string(&self) -> Result<String> {
        to_pretty_json(&self.to_json())
    }
}

pub fn parse_json(text: &str, file: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| TokenError::parse(file, e.to_string()))
}

pub fn to_pretty_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| TokenError::invalid_format(format!("Failed to serialize JSON: {}", e)))
}
