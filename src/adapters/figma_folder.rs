//! Folder of per-collection DTCG files exported from Figma
//!
//! Each file holds one collection (one mode). Semantic colour collections come
//! with one file per mode, of which exactly one is imported.

use super::*;
use crate::merge::merge;
use serde_json::Map;

/// A parsed `*.json` file found while scanning the export folder
#[derive(Debug, Clone)]
pub struct FolderFile {
    /// Path relative to the scanned folder, `/`-separated
    pub relative_path: String,
    pub file_name: String,
    /// Containing directory name, or the file stem at the folder root
    pub collection: String,
    pub document: Value,
}

impl FolderFile {
    pub fn new(relative_path: &str, document: Value) -> Self {
        let relative_path = relative_path.replace('\\', "/");
        let mut parts: Vec<&str> = relative_path.split('/').collect();
        let file_name = parts.pop().unwrap_or_default().to_string();
        let collection = match parts.last() {
            Some(dir) => dir.to_string(),
            None => file_name.strip_suffix(".json").unwrap_or(&file_name).to_string(),
        };
        Self {
            relative_path,
            file_name,
            collection,
            document,
        }
    }

    pub fn is_semantic_color_mode(&self) -> bool {
        self.relative_path.to_lowercase().contains("semantic colors")
            && self.file_name.contains(".tokens.json")
    }
}

/// Drop all but one semantic colour mode file
pub fn select_mode_files<'a>(files: &'a [FolderFile], mode: Option<&str>) -> Vec<&'a FolderFile> {
    let mode_files: Vec<&FolderFile> = files.iter().filter(|f| f.is_semantic_color_mode()).collect();

    let requested = mode.and_then(|m| mode_files.iter().copied().find(|f| f.file_name.contains(m)));
    if let (Some(m), None) = (mode, requested) {
        if !mode_files.is_empty() {
            log::warn!("No semantic colour file for mode '{}', using the default", m);
        }
    }
    let chosen = requested
        .or_else(|| {
            mode_files
                .iter()
                .copied()
                .find(|f| f.file_name.contains("shadcn") && !f.file_name.contains("dark"))
        })
        .or_else(|| mode_files.first().copied());

    if let Some(file) = chosen {
        log::info!("Using semantic colours from {}", file.file_name);
    }

    files
        .iter()
        .filter(|f| !f.is_semantic_color_mode() || chosen.is_some_and(|c| std::ptr::eq(c, *f)))
        .collect()
}

/// Extract the tokens of one file, keeping its own nesting.
/// Tokens without a value are added to `skipped`.
pub fn process_file(file: &FolderFile, skipped: &mut Vec<String>) -> TokenNode {
    let hint = format!("{} {}", file.file_name, file.collection);
    let mut tokens = TokenNode::group();
    if let Value::Object(object) = &file.document {
        collect_tokens(object, &mut Vec::new(), &hint, &mut tokens, skipped);
    }
    tokens
}

fn collect_tokens(
    object: &Map<String, Value>,
    path: &mut Vec<String>,
    hint: &str,
    out: &mut TokenNode,
    skipped: &mut Vec<String>,
) {
    for (key, value) in object {
        let Value::Object(child) = value else {
            continue;
        };
        path.push(key.clone());
        if let Some(declared) = child.get("$type").and_then(Value::as_str) {
            match folder_token(child, declared, hint) {
                Some(token) => out.insert_at(path.as_slice(), TokenNode::leaf(token)),
                None => {
                    log::warn!("Skipping {} - no value found", path.join("."));
                    skipped.push(path.join("."));
                }
            }
        } else {
            collect_tokens(child, path, hint, out, skipped);
        }
        path.pop();
    }
}

fn folder_token(object: &Map<String, Value>, declared: &str, hint: &str) -> Option<Token> {
    let token_type = match declared {
        "color" => "color",
        "number" => infer_token_type(ValueKind::Number, hint),
        "string" => infer_token_type(ValueKind::Text, hint),
        "boolean" => "boolean",
        other => other,
    };
    let raw = object.get("$value").filter(|v| !v.is_null())?;

    let value = if token_type == "color" {
        match alias_target(object).and_then(slash_reference) {
            Some(reference) => TokenValue::Text(reference),
            None => convert_color(raw).or_else(|| TokenValue::from_json(raw))?,
        }
    } else {
        match raw {
            Value::Number(n) if takes_px(token_type) => with_px(n),
            other => TokenValue::from_json(other)?,
        }
    };

    let description = object
        .get("$description")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(Token::new(value, Some(token_type)).with_description(description))
}

/// `$extensions.com.figma.aliasData.targetVariableName`
fn alias_target(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("$extensions")?
        .pointer("/com.figma/aliasData/targetVariableName")
        .or_else(|| object.get("$extensions")?.pointer("/com/figma/aliasData/targetVariableName"))
        .and_then(Value::as_str)
}

/// Route one file's tokens onto the canonical tree.
/// Tokens with no destination are added to `skipped`.
pub fn map_file(tokens: &TokenNode, collection: &str, skipped: &mut Vec<String>) -> TokenNode {
    let is_primitive = names_primitive_collection(collection);
    let mut tree = canonical_skeleton();
    let mut path = Vec::new();
    route_tokens(tokens, &mut path, is_primitive, &mut tree, skipped);
    tree
}

fn route_tokens(
    node: &TokenNode,
    path: &mut Vec<String>,
    is_primitive: bool,
    tree: &mut TokenNode,
    skipped: &mut Vec<String>,
) {
    let Some(children) = node.as_group() else {
        return;
    };
    for (key, child) in children {
        path.push(key.clone());
        match child {
            TokenNode::Group(_) => route_tokens(child, path, is_primitive, tree, skipped),
            TokenNode::Leaf(token) => {
                let token_type = token.token_type.as_deref().unwrap_or_default();
                let target = if is_primitive {
                    primitive_family(token_type).map(|family| {
                        let mut target = vec![PRIMITIVES_KEY.to_string(), family.to_string()];
                        target.extend(path.iter().cloned());
                        target
                    })
                } else if token_type == "color" {
                    let mut target = vec![SEMANTIC_KEY.to_string(), "color".to_string()];
                    target.extend(semantic_color_placement(key, path));
                    Some(target)
                } else {
                    None
                };
                match target {
                    Some(target) => tree.insert_at(&target, child.clone()),
                    None => {
                        log::debug!("No destination for {} ({})", path.join("."), token_type);
                        skipped.push(path.join("."));
                    }
                }
            }
        }
        path.pop();
    }
}

/// Import every selected file and merge them in scan order
pub fn import_folder(files: &[FolderFile], mode: Option<&str>) -> (TokenNode, ImportSummary) {
    let mut tree = canonical_skeleton();
    let mut skipped = Vec::new();
    for file in select_mode_files(files, mode) {
        log::debug!("Processing {} (collection '{}')", file.relative_path, file.collection);
        let tokens = process_file(file, &mut skipped);
        let mapped = map_file(&tokens, &file.collection, &mut skipped);
        tree = merge(&tree, &mapped);
    }
    let summary = ImportSummary::from_tree(&tree, skipped);
    (tree, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(path: &str, document: Value) -> FolderFile {
        FolderFile::new(path, document)
    }

    #[test]
    fn test_collection_from_path() {
        let nested = file("1. Raw colors/Mode 1.tokens.json", json!({}));
        assert_eq!(nested.collection, "1. Raw colors");
        assert_eq!(nested.file_name, "Mode 1.tokens.json");
        let root = file("spacing.json", json!({}));
        assert_eq!(root.collection, "spacing");
    }

    #[test]
    fn test_mode_file_selection() {
        let files = vec![
            file("raw/colors.json", json!({})),
            file("3. Semantic colors/dark.tokens.json", json!({})),
            file("3. Semantic colors/shadcn.tokens.json", json!({})),
            file("3. Semantic colors/shadcn-dark.tokens.json", json!({})),
        ];
        let names = |selected: Vec<&FolderFile>| -> Vec<String> {
            selected.iter().map(|f| f.file_name.clone()).collect()
        };
        assert_eq!(names(select_mode_files(&files, None)), vec!["colors.json", "shadcn.tokens.json"]);
        assert_eq!(
            names(select_mode_files(&files, Some("shadcn-dark"))),
            vec!["colors.json", "shadcn-dark.tokens.json"]
        );
        assert_eq!(
            names(select_mode_files(&files, Some("missing"))),
            vec!["colors.json", "shadcn.tokens.json"]
        );
    }

    #[test]
    fn test_first_mode_file_when_no_shadcn() {
        let files = vec![
            file("Semantic colors/light.tokens.json", json!({})),
            file("Semantic colors/dark.tokens.json", json!({})),
        ];
        let selected = select_mode_files(&files, None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].file_name, "light.tokens.json");
    }

    #[test]
    fn test_process_file_converts_values() {
        let f = file(
            "Raw spacing/values.json",
            json!({
                "spacing": {
                    "4": {"$type": "number", "$value": 16, "$description": "base"},
                    "empty": {"$type": "number", "$value": null}
                },
                "$extensions": "ignored"
            }),
        );
        let mut skipped = Vec::new();
        let tokens = process_file(&f, &mut skipped);
        assert_eq!(skipped, vec!["spacing.empty"]);
        let token = tokens.get_path(&["spacing", "4"]).and_then(TokenNode::as_leaf).unwrap();
        assert_eq!(token.value, TokenValue::Text("16px".into()));
        assert_eq!(token.token_type.as_deref(), Some("spacing"));
        assert_eq!(token.description.as_deref(), Some("base"));
        assert!(tokens.get_path(&["spacing", "empty"]).is_none());
    }

    #[test]
    fn test_alias_becomes_reference() {
        let f = file(
            "Semantic colors/shadcn.tokens.json",
            json!({
                "background": {
                    "$type": "color",
                    "$value": {"components": [1, 1, 1], "alpha": 1, "hex": "#FFFFFF"},
                    "$extensions": {"com.figma": {"aliasData": {"targetVariableName": "neutral/50"}}}
                },
                "ring": {"$type": "color", "$value": {"components": [0, 0, 0], "alpha": 0.5}}
            }),
        );
        let tokens = process_file(&f, &mut Vec::new());
        assert_eq!(
            tokens.lookup("background"),
            Some(&TokenValue::Text("{primitives.colors.neutral.50}".into()))
        );
        assert_eq!(tokens.lookup("ring"), Some(&TokenValue::Text("rgba(0, 0, 0, 0.5)".into())));
    }

    #[test]
    fn test_import_folder_routes_and_merges() {
        let files = vec![
            file(
                "1. Raw colors/Mode 1.tokens.json",
                json!({"neutral": {"50": {"$type": "color", "$value": {"hex": "#FAFAFA"}}}}),
            ),
            file(
                "2. Raw spacing/Mode 1.tokens.json",
                json!({"4": {"$type": "number", "$value": 16}}),
            ),
            file(
                "3. Semantic colors/shadcn.tokens.json",
                json!({
                    "background": {"$type": "color", "$value": "#FFFFFF"},
                    "foreground": {"$type": "color", "$value": "#0A0A0A"},
                    "accent": {"$type": "color", "$value": "#F5F5F5"},
                    "muted": {"$type": "color", "$value": null},
                    "gap": {"$type": "number", "$value": 8}
                }),
            ),
            file(
                "3. Semantic colors/shadcn-dark.tokens.json",
                json!({"background": {"$type": "color", "$value": "#0A0A0A"}}),
            ),
        ];
        let (tree, summary) = import_folder(&files, None);
        assert_eq!(tree.lookup("primitives.colors.neutral.50"), Some(&TokenValue::Text("#FAFAFA".into())));
        assert_eq!(tree.lookup("primitives.space.4"), Some(&TokenValue::Text("16px".into())));
        assert_eq!(
            tree.lookup("semantic.color.background.surface"),
            Some(&TokenValue::Text("#FFFFFF".into()))
        );
        assert_eq!(
            tree.lookup("semantic.color.text.foreground"),
            Some(&TokenValue::Text("#0A0A0A".into()))
        );
        assert_eq!(tree.lookup("semantic.color.accent"), Some(&TokenValue::Text("#F5F5F5".into())));
        assert_eq!(summary.primitive_count, 2);
        assert_eq!(summary.semantic_count, 3);
        assert_eq!(summary.skipped, vec!["muted", "gap"]);
    }
}
