//! Core types and constants for the token compiler

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

// Canonical document keys
pub const PRIMITIVES_KEY: &str = "primitives";
pub const SEMANTIC_KEY: &str = "semantic";
pub const THEMES_KEY: &str = "$themes";
pub const METADATA_KEY: &str = "$metadata";
pub const TOKEN_SET_ORDER_KEY: &str = "tokenSetOrder";

// Pipeline defaults
pub const DEFAULT_NAMESPACE: &str = "joe";
pub const DEFAULT_MAX_PASSES: usize = 10;
pub const DEFAULT_SET_NAME: &str = "joe";
pub const DEFAULT_SOURCE_LABEL: &str = "joe-tokens.json";

/// Ordered children of a group; insertion order is document order
pub type Group = IndexMap<String, TokenNode>;

/// A node of the token tree
#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Leaf(Token),
    Group(Group),
}

/// A leaf token after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: TokenValue,
    pub token_type: Option<String>,
    pub description: Option<String>,
}

/// The value carried by a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Text(String),
    Number(Number),
    Bool(bool),
    /// Arrays and objects (shadow stacks, typography composites)
    Composite(Value),
}

/// Key convention a document is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenFormat {
    /// `value` / `type` / `description`
    Legacy,
    /// W3C DTCG `$value` / `$type` / `$description`
    #[default]
    Dtcg,
}

/// Output grouping descriptor for the CSS emitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub prefix: String,
    pub name: String,
    pub presenter: String,
}

impl Category {
    pub fn new(prefix: &str, name: &str, presenter: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            presenter: presenter.to_string(),
        }
    }

    /// True if `path` is the prefix itself or lies below it
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

/// Categories consumed by the documentation tool, in declaration order
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("primitives.colors", "Colors - Primitives", "Color"),
        Category::new("semantic.color", "Colors - Semantic", "Color"),
        Category::new("primitives.space", "Spacing", "Spacing"),
        Category::new("primitives.radii", "Border Radius", "BorderRadius"),
        Category::new("primitives.fontSizes", "Font Size", "FontSize"),
        Category::new("primitives.fontWeights", "Font Weight", "FontWeight"),
        Category::new("primitives.lineHeights", "Line Height", "LineHeight"),
        Category::new("primitives.fonts", "Font Family", "FontFamily"),
    ]
}

impl Token {
    pub fn new(value: TokenValue, token_type: Option<&str>) -> Self {
        Self {
            value,
            token_type: token_type.map(str::to_string),
            description: None,
        }
    }

    pub fn text(value: &str, token_type: &str) -> Self {
        Self::new(TokenValue::Text(value.to_string()), Some(token_type))
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

impl TokenValue {
    /// Build a value from JSON; `null` is not a value
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            other => Some(Self::Composite(other.clone())),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Composite(v) => v.clone(),
        }
    }

    /// Dot path inside a `{...}` reference
    pub fn reference_path(&self) -> Option<&str> {
        match self {
            Self::Text(s) => reference_path(s),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference_path().is_some()
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            Self::Bool(b) => *b,
            Self::Composite(v) => !v.is_null(),
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", format_number(n)),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Composite(v) => write!(f, "{}", v),
        }
    }
}

/// Plain decimal rendering: integral floats drop their fraction
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        Some(f) => format!("{}", f),
        None => n.to_string(),
    }
}

/// Path inside `{...}` if `text` is a whole-value reference
pub fn reference_path(text: &str) -> Option<&str> {
    if text.len() >= 2 && text.starts_with('{') && text.ends_with('}') {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

pub fn make_reference(path: &str) -> String {
    format!("{{{}}}", path)
}

pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

impl TokenNode {
    pub fn group() -> Self {
        Self::Group(Group::new())
    }

    pub fn leaf(token: Token) -> Self {
        Self::Leaf(token)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Token> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Self::Group(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    pub fn child(&self, key: &str) -> Option<&TokenNode> {
        self.as_group().and_then(|children| children.get(key))
    }

    /// Descend key by key
    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&TokenNode> {
        segments
            .iter()
            .try_fold(self, |node, key| node.child(key.as_ref()))
    }

    pub fn get_path_mut<S: AsRef<str>>(&mut self, segments: &[S]) -> Option<&mut TokenNode> {
        let mut node = self;
        for key in segments {
            node = node.as_group_mut()?.get_mut(key.as_ref())?;
        }
        Some(node)
    }

    /// Value of the leaf addressed by a dot path; groups and misses give `None`
    pub fn lookup(&self, dot_path: &str) -> Option<&TokenValue> {
        let segments: Vec<&str> = dot_path.split('.').collect();
        self.get_path(&segments)
            .and_then(TokenNode::as_leaf)
            .map(|token| &token.value)
    }

    /// Set `node` at `segments`, creating groups on the way.
    /// A leaf standing where a group is needed is replaced by a group.
    pub fn insert_at<S: AsRef<str>>(&mut self, segments: &[S], node: TokenNode) {
        let Some((last, parents)) = segments.split_last() else {
            *self = node;
            return;
        };
        let mut current = self;
        for key in parents {
            current = current
                .ensure_group()
                .entry(key.as_ref().to_string())
                .or_insert_with(TokenNode::group);
        }
        current.ensure_group().insert(last.as_ref().to_string(), node);
    }

    /// Turn this node into a group if it is not one already
    pub fn ensure_group(&mut self) -> &mut Group {
        if self.is_leaf() {
            *self = TokenNode::group();
        }
        match self {
            Self::Group(children) => children,
            Self::Leaf(_) => unreachable!("node was converted to a group above"),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group(children) => children.values().map(TokenNode::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_path() {
        assert_eq!(reference_path("{primitives.colors.white}"), Some("primitives.colors.white"));
        assert_eq!(reference_path("#FFFFFF"), None);
        assert_eq!(reference_path("{"), None);
        assert_eq!(reference_path("{}"), Some(""));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(&Number::from(16)), "16");
        assert_eq!(format_number(&Number::from_f64(4.0).unwrap()), "4");
        assert_eq!(format_number(&Number::from_f64(1.5).unwrap()), "1.5");
        assert_eq!(format_number(&Number::from(-2)), "-2");
    }

    #[test]
    fn test_truthiness() {
        assert!(!TokenValue::Text(String::new()).is_truthy());
        assert!(!TokenValue::Number(Number::from(0)).is_truthy());
        assert!(!TokenValue::Bool(false).is_truthy());
        assert!(TokenValue::Text("4px".into()).is_truthy());
        assert!(TokenValue::Number(Number::from(400)).is_truthy());
    }

    #[test]
    fn test_null_is_not_a_value() {
        assert_eq!(TokenValue::from_json(&Value::Null), None);
        assert_eq!(
            TokenValue::from_json(&json!([1, 2])),
            Some(TokenValue::Composite(json!([1, 2])))
        );
    }

    #[test]
    fn test_category_matching() {
        let category = Category::new("primitives.colors", "Colors", "Color");
        assert!(category.matches("primitives.colors"));
        assert!(category.matches("primitives.colors.white"));
        assert!(!category.matches("primitives.colorsExtra.white"));
        assert!(!category.matches("semantic.color"));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut root = TokenNode::group();
        root.insert_at(&["a", "b"], TokenNode::leaf(Token::text("1", "string")));
        assert_eq!(root.lookup("a.b"), Some(&TokenValue::Text("1".into())));
        assert_eq!(root.lookup("a"), None);
        assert_eq!(root.lookup("a.b.c"), None);

        // A leaf in the way becomes a group
        root.insert_at(&["a", "b", "c"], TokenNode::leaf(Token::text("2", "string")));
        assert_eq!(root.lookup("a.b.c"), Some(&TokenValue::Text("2".into())));
        assert_eq!(root.leaf_count(), 1);
    }
}
