//! Schema normalization between legacy (`value`/`type`) and DTCG (`$value`/`$type`) tokens
//!
//! A JSON object is a token iff it carries a non-null `$value` or `value`.
//! DTCG keys win over legacy keys on the same object. Every other object is a
//! group; `$`-prefixed keys and scalar children at group scope are dropped.

use crate::types::*;
use serde_json::{Map, Value};

const LEGACY_VALUE: &str = "value";
const LEGACY_TYPE: &str = "type";
const LEGACY_DESCRIPTION: &str = "description";
const DTCG_VALUE: &str = "$value";
const DTCG_TYPE: &str = "$type";
const DTCG_DESCRIPTION: &str = "$description";

/// Normalize an arbitrary JSON token tree
pub fn normalize(value: &Value) -> TokenNode {
    normalize_node(value, "")
}

/// Normalize a single object into a token if it is one
pub fn normalize_token(object: &Map<String, Value>) -> Option<Token> {
    let value = non_null(object, DTCG_VALUE)
        .or_else(|| non_null(object, LEGACY_VALUE))
        .and_then(TokenValue::from_json)?;

    let token_type = string_field(object, DTCG_TYPE).or_else(|| string_field(object, LEGACY_TYPE));
    let description = string_field(object, DTCG_DESCRIPTION)
        .or_else(|| string_field(object, LEGACY_DESCRIPTION));

    Some(Token {
        value,
        token_type,
        description,
    })
}

/// True if the JSON object would normalize to a token
pub fn is_token_object(value: &Value) -> bool {
    value
        .as_object()
        .map(|object| non_null(object, DTCG_VALUE).is_some() || non_null(object, LEGACY_VALUE).is_some())
        .unwrap_or(false)
}

fn normalize_node(value: &Value, path: &str) -> TokenNode {
    let Some(object) = value.as_object() else {
        log::debug!("Ignoring non-object token node at '{}'", path);
        return TokenNode::group();
    };

    if let Some(token) = normalize_token(object) {
        let stray = object.keys().filter(|k| !is_marker_key(k)).count();
        if stray > 0 {
            log::debug!("Token '{}' carries {} extra key(s); they are ignored", path, stray);
        }
        return TokenNode::Leaf(token);
    }

    let mut children = Group::new();
    for (key, child) in object {
        if key.starts_with('$') {
            continue;
        }
        if !child.is_object() {
            log::debug!("Dropping scalar '{}' at group '{}'", key, path);
            continue;
        }
        children.insert(key.clone(), normalize_node(child, &join_path(path, key)));
    }
    TokenNode::Group(children)
}

fn is_marker_key(key: &str) -> bool {
    key.starts_with('$') || key == LEGACY_VALUE || key == LEGACY_TYPE || key == LEGACY_DESCRIPTION
}

fn non_null<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Serialize a normalized tree back to JSON in the requested key convention
pub fn to_json(node: &TokenNode, format: TokenFormat) -> Value {
    match node {
        TokenNode::Leaf(token) => token_to_json(token, format),
        TokenNode::Group(children) => Value::Object(
            children
                .iter()
                .map(|(key, child)| (key.clone(), to_json(child, format)))
                .collect(),
        ),
    }
}

pub fn token_to_json(token: &Token, format: TokenFormat) -> Value {
    let mut object = Map::new();
    match format {
        TokenFormat::Legacy => {
            object.insert(LEGACY_VALUE.to_string(), token.value.to_json());
            if let Some(token_type) = &token.token_type {
                object.insert(LEGACY_TYPE.to_string(), Value::String(token_type.clone()));
            }
            if let Some(description) = &token.description {
                object.insert(LEGACY_DESCRIPTION.to_string(), Value::String(description.clone()));
            }
        }
        TokenFormat::Dtcg => {
            if let Some(token_type) = &token.token_type {
                object.insert(DTCG_TYPE.to_string(), Value::String(token_type.clone()));
            }
            object.insert(DTCG_VALUE.to_string(), token.value.to_json());
            if let Some(description) = &token.description {
                object.insert(DTCG_DESCRIPTION.to_string(), Value::String(description.clone()));
            }
        }
    }
    Value::Object(object)
}

/// Format of the first token found in document order
pub fn detect_format(value: &Value) -> Option<TokenFormat> {
    let object = value.as_object()?;
    if non_null(object, DTCG_VALUE).is_some() {
        return Some(TokenFormat::Dtcg);
    }
    if non_null(object, LEGACY_VALUE).is_some() {
        return Some(TokenFormat::Legacy);
    }
    object
        .iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .find_map(|(_, child)| detect_format(child))
}
