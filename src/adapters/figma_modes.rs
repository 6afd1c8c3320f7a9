//! Figma "Export modes" documents
//!
//! `{ collections: [ { name, variables: [ { name, type, valuesByMode } ] } ] }`

use super::*;
use crate::error::{Result, TokenError};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
pub struct FigmaExport {
    pub collections: Vec<FigmaCollection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FigmaCollection {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variables: Vec<FigmaVariable>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FigmaVariable {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub variable_type: String,
    #[serde(rename = "valuesByMode", deserialize_with = "null_as_default")]
    pub values_by_mode: IndexMap<String, Value>,
}

/// Figma writes `null` for fields it has nothing for
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for FigmaVariable {
    fn default() -> Self {
        Self {
            name: String::new(),
            variable_type: "STRING".to_string(),
            values_by_mode: IndexMap::new(),
        }
    }
}

impl FigmaVariable {
    pub fn kind(&self) -> ValueKind {
        match self.variable_type.as_str() {
            "COLOR" => ValueKind::Color,
            "FLOAT" | "NUMBER" => ValueKind::Number,
            "BOOLEAN" => ValueKind::Boolean,
            _ => ValueKind::Text,
        }
    }

    /// Value for `mode`, or for the first mode present
    pub fn value_for_mode(&self, mode: Option<&str>) -> Option<&Value> {
        let selected = mode
            .and_then(|m| self.values_by_mode.get(m))
            .or_else(|| self.values_by_mode.values().next())?;
        (!selected.is_null()).then_some(selected)
    }
}

/// Parse and validate an "Export modes" document
pub fn parse_export(value: &Value, file: &str) -> Result<FigmaExport> {
    match value.get("collections") {
        Some(Value::Array(_)) => {}
        _ => {
            return Err(TokenError::invalid_format(format!(
                "{} is not a Figma \"Export modes\" document: expected a \"collections\" array",
                file
            )))
        }
    }
    serde_json::from_value(value.clone()).map_err(|e| TokenError::parse(file, e.to_string()))
}

/// Map every collection onto the canonical tree
pub fn map_export(export: &FigmaExport, mode: Option<&str>) -> (TokenNode, ImportSummary) {
    let mut tree = canonical_skeleton();
    let mut skipped = Vec::new();

    for collection in &export.collections {
        let is_primitive = names_primitive_collection(&collection.name)
            || !names_semantic_collection(&collection.name);
        log::debug!(
            "Collection '{}' ({} variables) -> {}",
            collection.name,
            collection.variables.len(),
            if is_primitive { PRIMITIVES_KEY } else { SEMANTIC_KEY }
        );

        for variable in &collection.variables {
            let Some(raw) = variable.value_for_mode(mode) else {
                log::warn!("Skipping variable {} - no value found", variable.name);
                skipped.push(variable.name.clone());
                continue;
            };

            let token_type = infer_token_type(variable.kind(), &collection.name);
            let token = Token::new(convert_value(raw, variable.kind(), token_type), Some(token_type));
            let segments = split_name(&variable.name);

            let target = if is_primitive {
                primitive_target(token_type, &segments)
            } else if token_type == "color" {
                let mut path = vec![SEMANTIC_KEY.to_string(), "color".to_string()];
                path.extend(semantic_color_placement(&variable.name, &segments));
                Some(path)
            } else {
                None
            };

            match target {
                Some(path) if path.len() > 2 => tree.insert_at(&path, TokenNode::leaf(token)),
                _ => {
                    log::debug!("No destination for {} ({})", variable.name, token_type);
                    skipped.push(variable.name.clone());
                }
            }
        }
    }

    let summary = ImportSummary::from_tree(&tree, skipped);
    (tree, summary)
}

fn primitive_target(token_type: &str, segments: &[String]) -> Option<Vec<String>> {
    let family = primitive_family(token_type)?;
    let mut path = vec![PRIMITIVES_KEY.to_string(), family.to_string()];
    path.extend(segments.iter().cloned());
    Some(path)
}

fn convert_value(raw: &Value, kind: ValueKind, token_type: &str) -> TokenValue {
    match raw {
        Value::String(s) => {
            let value = slash_reference(s).unwrap_or_else(|| s.clone());
            TokenValue::Text(value)
        }
        Value::Number(n) if takes_px(token_type) => with_px(n),
        Value::Number(n) => TokenValue::Text(format_number(n)),
        Value::Object(_) if kind == ValueKind::Color => {
            convert_color(raw).unwrap_or_else(|| TokenValue::Composite(raw.clone()))
        }
        other => TokenValue::from_json(other).unwrap_or_else(|| TokenValue::Composite(other.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "collections": [
                {
                    "name": "Raw Colors",
                    "variables": [
                        {"name": "neutral/950", "type": "COLOR", "valuesByMode": {"1:0": "#0A0A0A"}},
                        {"name": "white", "type": "COLOR", "valuesByMode": {"1:0": {"r": 1, "g": 1, "b": 1, "a": 1}}}
                    ]
                },
                {
                    "name": "Spacing",
                    "variables": [
                        {"name": "space-4", "type": "FLOAT", "valuesByMode": {"1:0": 16}}
                    ]
                },
                {
                    "name": "Semantic",
                    "variables": [
                        {
                            "name": "background-default",
                            "type": "COLOR",
                            "valuesByMode": {"light": "neutral/50", "dark": "neutral/950"}
                        },
                        {"name": "muted", "type": "COLOR", "valuesByMode": {"light": null}},
                        {"name": "gap", "type": "FLOAT", "valuesByMode": {"light": 8}}
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_rejects_missing_collections() {
        let err = parse_export(&json!({"variables": []}), "f.json").unwrap_err();
        assert!(matches!(err, TokenError::InvalidFormat { .. }));
        let err = parse_export(&json!({"collections": {}}), "f.json").unwrap_err();
        assert!(matches!(err, TokenError::InvalidFormat { .. }));
    }

    #[test]
    fn test_maps_primitives() {
        let export = parse_export(&sample(), "f.json").unwrap();
        let (tree, _) = map_export(&export, None);
        assert_eq!(
            tree.lookup("primitives.colors.neutral.950"),
            Some(&TokenValue::Text("#0A0A0A".into()))
        );
        assert_eq!(
            tree.lookup("primitives.colors.white"),
            Some(&TokenValue::Text("#ffffff".into()))
        );
        assert_eq!(tree.lookup("primitives.space.space.4"), Some(&TokenValue::Text("16px".into())));
        let token = tree.get_path(&["primitives", "space", "space", "4"]).and_then(TokenNode::as_leaf).unwrap();
        assert_eq!(token.token_type.as_deref(), Some("spacing"));
    }

    #[test]
    fn test_mode_selection_and_slash_references() {
        let export = parse_export(&sample(), "f.json").unwrap();
        let (first, _) = map_export(&export, None);
        assert_eq!(
            first.lookup("semantic.color.background.default"),
            Some(&TokenValue::Text("{primitives.colors.neutral.50}".into()))
        );
        let (dark, _) = map_export(&export, Some("dark"));
        assert_eq!(
            dark.lookup("semantic.color.background.default"),
            Some(&TokenValue::Text("{primitives.colors.neutral.950}".into()))
        );
        // Unknown mode falls back to the first
        let (fallback, _) = map_export(&export, Some("sepia"));
        assert_eq!(fallback, first);
    }

    #[test]
    fn test_missing_values_are_skipped_not_fatal() {
        let export = parse_export(&sample(), "f.json").unwrap();
        let (tree, summary) = map_export(&export, None);
        assert!(summary.skipped.contains(&"muted".to_string()));
        // Non-colour semantic variables have no destination
        assert!(summary.skipped.contains(&"gap".to_string()));
        assert_eq!(summary.primitive_count, 3);
        assert_eq!(summary.semantic_count, 1);
        assert_eq!(tree.leaf_count(), summary.total());
    }

    #[test]
    fn test_defaults_for_sparse_variables() {
        let export = parse_export(
            &json!({"collections": [{"name": "Fonts", "variables": [{"name": "sans", "valuesByMode": {"m": "Inter"}}]}]}),
            "f.json",
        )
        .unwrap();
        let (tree, _) = map_export(&export, None);
        assert_eq!(tree.lookup("primitives.fonts.sans"), Some(&TokenValue::Text("Inter".into())));
    }

    #[test]
    fn test_null_fields_skip_only_that_variable() {
        let export = parse_export(
            &json!({"collections": [{
                "name": "Raw Colors",
                "variables": [
                    {"name": "a", "type": null, "valuesByMode": null},
                    {"name": "b", "type": "COLOR", "valuesByMode": {"1:0": "#111111"}}
                ]
            }]}),
            "f.json",
        )
        .unwrap();
        let (tree, summary) = map_export(&export, None);
        assert_eq!(summary.skipped, vec!["a"]);
        assert_eq!(tree.lookup("primitives.colors.b"), Some(&TokenValue::Text("#111111".into())));
    }
}
