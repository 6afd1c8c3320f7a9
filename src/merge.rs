//! Structural deep merge of token trees
//!
//! A source leaf replaces the target node wholesale. A source group is merged
//! key by key, creating missing target groups. Target keys absent from the
//! source are never removed.

use crate::document::TokenDocument;
use crate::normalizer::{is_token_object, token_to_json};
use crate::types::*;
use serde_json::{Map, Value};

/// Merge `source` into a copy of `target`
pub fn merge(target: &TokenNode, source: &TokenNode) -> TokenNode {
    let mut merged = target.clone();
    merge_in_place(&mut merged, source);
    merged
}

fn merge_in_place(target: &mut TokenNode, source: &TokenNode) {
    match source {
        TokenNode::Leaf(_) => *target = source.clone(),
        TokenNode::Group(children) => {
            let target_children = target.ensure_group();
            for (key, child) in children {
                match child {
                    TokenNode::Leaf(_) => {
                        target_children.insert(key.clone(), child.clone());
                    }
                    TokenNode::Group(_) => {
                        let slot = target_children
                            .entry(key.clone())
                            .or_insert_with(TokenNode::group);
                        merge_in_place(slot, child);
                    }
                }
            }
        }
    }
}

/// Merge a normalized tree into raw document JSON.
///
/// Incoming leaves are written in `format`. Keys the source does not name,
/// group markers such as `$type` and token `$extensions` included, are kept.
pub fn merge_json(target: &mut Value, source: &TokenNode, format: TokenFormat) {
    match source {
        TokenNode::Leaf(token) => *target = token_to_json(token, format),
        TokenNode::Group(children) => {
            if !target.is_object() || is_token_object(target) {
                *target = Value::Object(Map::new());
            }
            let Value::Object(target_children) = target else {
                return;
            };
            for (key, child) in children {
                let slot = target_children
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                merge_json(slot, child, format);
            }
        }
    }
}

/// Merge the `primitives` and `semantic` branches of `incoming` into a copy of `document`
pub fn merge_into_document(document: &TokenDocument, incoming: &TokenNode) -> TokenDocument {
    let mut merged = document.clone();
    let root = merged.tree.ensure_group();
    for key in [PRIMITIVES_KEY, SEMANTIC_KEY] {
        if let Some(branch) = incoming.child(key) {
            let slot = root.entry(key.to_string()).or_insert_with(TokenNode::group);
            merge_in_place(slot, branch);
        }
    }

    if let Value::Object(raw_root) = &mut merged.raw {
        for key in [PRIMITIVES_KEY, SEMANTIC_KEY] {
            if let Some(branch) = incoming.child(key) {
                let slot = raw_root
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                merge_json(slot, branch, merged.format);
            }
        }
    }
    merged
}
