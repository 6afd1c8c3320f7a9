//! Flattening of a resolved token tree into dot-path entries

use crate::types::*;
use indexmap::IndexMap;

/// Full dot path -> value, in document order
pub type FlatTokenMap = IndexMap<String, TokenValue>;

pub fn flatten(node: &TokenNode) -> FlatTokenMap {
    let mut result = FlatTokenMap::new();
    flatten_into(node, "", &mut result);
    result
}

fn flatten_into(node: &TokenNode, prefix: &str, result: &mut FlatTokenMap) {
    match node {
        TokenNode::Leaf(token) => {
            result.insert(prefix.to_string(), token.value.clone());
        }
        TokenNode::Group(children) => {
            for (key, child) in children {
                flatten_into(child, &join_path(prefix, key), result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use serde_json::json;

    #[test]
    fn test_one_entry_per_leaf() {
        let tree = normalize(&json!({
            "primitives": {
                "colors": {
                    "white": {"value": "#FFFFFF", "type": "color"},
                    "grey": {"50": {"value": "#FAFAFA"}, "900": {"value": "#171717"}}
                },
                "space": {"1": {"value": 4}}
            },
            "semantic": {"empty": {}}
        }));
        let flat = flatten(&tree);
        assert_eq!(flat.len(), tree.leaf_count());
        assert_eq!(flat.len(), 4);
        assert_eq!(
            flat.get("primitives.colors.grey.900"),
            Some(&TokenValue::Text("#171717".into()))
        );
    }

    #[test]
    fn test_document_order() {
        let tree = normalize(&json!({
            "b": {"value": 1},
            "a": {"z": {"value": 2}, "y": {"value": 3}}
        }));
        let keys: Vec<_> = flatten(&tree).keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a.z", "a.y"]);
    }
}
