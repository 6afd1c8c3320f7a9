//! Third-party UI kit token exports (either key convention, arbitrary nesting)

use super::*;
use crate::error::{Result, TokenError};
use crate::normalizer::normalize;
use regex::Regex;

/// Path keywords that mark a colour as part of a primitive scale
const SCALE_KEYWORDS: &[&str] = &[
    "grey",
    "gray",
    "slate",
    "neutral",
    "blue",
    "primary",
    "red",
    "destructive",
    "green",
    "success",
    "yellow",
    "warning",
];

struct FamilyRule {
    token_type: &'static str,
    family: &'static str,
    prefix: Regex,
}

pub struct KitAdapter {
    color_prefix: Regex,
    families: Vec<FamilyRule>,
}

impl KitAdapter {
    pub fn new() -> Result<Self> {
        let rules = [
            ("spacing", "space", r"(?i)^(spacing|space)\.?"),
            ("borderRadius", "radii", r"(?i)^(radius|radii|borderradius)\.?"),
            ("fontSizes", "fontSizes", r"(?i)^fontsizes?\.?"),
            ("fontWeights", "fontWeights", r"(?i)^fontweights?\.?"),
            ("lineHeights", "lineHeights", r"(?i)^lineheights?\.?"),
            ("fontFamilies", "fonts", r"(?i)^(fontfamilies|fontfamily|fonts?)\.?"),
        ];
        let families = rules
            .into_iter()
            .map(|(token_type, family, pattern)| {
                Ok(FamilyRule {
                    token_type,
                    family,
                    prefix: compile(pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            color_prefix: compile(r"(?i)^colors?\.?")?,
            families,
        })
    }

    /// Map a kit document onto the canonical tree
    pub fn map(&self, document: &Value) -> (TokenNode, ImportSummary) {
        let normalized = normalize(document);
        let mut leaves = Vec::new();
        collect_leaves(&normalized, String::new(), &mut leaves);

        let mut tree = canonical_skeleton();
        let mut skipped = Vec::new();
        for (path, token) in leaves {
            match self.target(&path, token) {
                Some(target) => tree.insert_at(&target, TokenNode::leaf(token.clone())),
                None => {
                    log::debug!("No destination for kit token {}", path);
                    skipped.push(path);
                }
            }
        }

        let summary = ImportSummary::from_tree(&tree, skipped);
        (tree, summary)
    }

    fn target(&self, path: &str, token: &Token) -> Option<Vec<String>> {
        let token_type = token.token_type.as_deref()?;

        if token_type == "color" {
            let lower = path.to_lowercase();
            if SCALE_KEYWORDS.iter().any(|k| lower.contains(k)) {
                return family_path("colors", &self.color_prefix, path);
            }
            let segments: Vec<String> = path.split('.').map(str::to_string).collect();
            let mut target = vec![SEMANTIC_KEY.to_string(), "color".to_string()];
            target.extend(semantic_color_placement(&lower, &segments));
            return Some(target);
        }

        self.families
            .iter()
            .find(|rule| rule.token_type == token_type)
            .and_then(|rule| family_path(rule.family, &rule.prefix, path))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| TokenError::config(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// `colors.blue-500` -> `primitives.colors.blue.500`
fn family_path(family: &str, prefix: &Regex, path: &str) -> Option<Vec<String>> {
    let stripped = prefix.replace(path, "");
    let segments: Vec<String> = stripped
        .split(|c| c == '.' || c == '-')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.is_empty() {
        return None;
    }
    let mut target = vec![PRIMITIVES_KEY.to_string(), family.to_string()];
    target.extend(segments);
    Some(target)
}

fn collect_leaves<'a>(node: &'a TokenNode, prefix: String, out: &mut Vec<(String, &'a Token)>) {
    match node {
        TokenNode::Leaf(token) => out.push((prefix, token)),
        TokenNode::Group(children) => {
            for (key, child) in children {
                collect_leaves(child, join_path(&prefix, key), out);
            }
        }
    }
}

/// Build the adapter and map `document` in one step
pub fn import_kit(document: &Value) -> Result<(TokenNode, ImportSummary)> {
    Ok(KitAdapter::new()?.map(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scale_colors_become_primitives() {
        let (tree, _) = import_kit(&json!({
            "colors": {
                "slate-100": {"$type": "color", "$value": "#F1F5F9"},
                "blue": {"500": {"type": "color", "value": "#3B82F6"}}
            }
        }))
        .unwrap();
        assert_eq!(tree.lookup("primitives.colors.slate.100"), Some(&TokenValue::Text("#F1F5F9".into())));
        assert_eq!(tree.lookup("primitives.colors.blue.500"), Some(&TokenValue::Text("#3B82F6".into())));
    }

    #[test]
    fn test_role_colors_become_semantic() {
        let (tree, summary) = import_kit(&json!({
            "background": {"$type": "color", "$value": "#FFFFFF"},
            "foreground-muted": {"$type": "color", "$value": "#737373"},
            "input-border": {"$type": "color", "$value": "#E5E5E5"},
            "ring": {"$type": "color", "$value": "#A3A3A3", "$description": "focus"}
        }))
        .unwrap();
        assert_eq!(tree.lookup("semantic.color.background.surface"), Some(&TokenValue::Text("#FFFFFF".into())));
        assert_eq!(tree.lookup("semantic.color.text.secondary"), Some(&TokenValue::Text("#737373".into())));
        assert_eq!(tree.lookup("semantic.color.border.default"), Some(&TokenValue::Text("#E5E5E5".into())));
        let ring = tree.get_path(&["semantic", "color", "ring"]).and_then(TokenNode::as_leaf).unwrap();
        assert_eq!(ring.description.as_deref(), Some("focus"));
        assert_eq!(summary.semantic_count, 4);
    }

    #[test]
    fn test_typed_families_strip_prefixes() {
        let (tree, summary) = import_kit(&json!({
            "spacing": {"4": {"$type": "spacing", "$value": "16px"}},
            "radius-lg": {"$type": "borderRadius", "$value": "8px"},
            "fontSizes": {"sm": {"$type": "fontSizes", "$value": "14px"}},
            "fontWeight": {"bold": {"$type": "fontWeights", "$value": 700}},
            "lineHeights": {"tight": {"$type": "lineHeights", "$value": 1.25}},
            "fonts": {"sans": {"$type": "fontFamilies", "$value": "Inter"}},
            "opacity": {"50": {"$type": "opacity", "$value": 0.5}},
            "untyped": {"$value": "x"}
        }))
        .unwrap();
        assert_eq!(tree.lookup("primitives.space.4"), Some(&TokenValue::Text("16px".into())));
        assert_eq!(tree.lookup("primitives.radii.lg"), Some(&TokenValue::Text("8px".into())));
        assert_eq!(tree.lookup("primitives.fontSizes.sm"), Some(&TokenValue::Text("14px".into())));
        assert!(tree.lookup("primitives.fontWeights.bold").is_some());
        assert!(tree.lookup("primitives.lineHeights.tight").is_some());
        assert_eq!(tree.lookup("primitives.fonts.sans"), Some(&TokenValue::Text("Inter".into())));
        assert_eq!(summary.primitive_count, 6);
        assert_eq!(summary.skipped, vec!["opacity.50", "untyped"]);
    }

    #[test]
    fn test_family_prefix_alone_is_skipped() {
        let (_, summary) = import_kit(&json!({"spacing": {"$type": "spacing", "$value": "4px"}})).unwrap();
        assert_eq!(summary.skipped, vec!["spacing"]);
    }
}
