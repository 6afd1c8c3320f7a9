//! Utility-CSS theme generation from the nested (unflattened) token tree
//!
//! Leaves are routed to a theme family by the branch they sit under. Colour
//! branches keep their nesting; every other family takes the direct leaf
//! children of its branch. Routes run in order, so semantic routes listed
//! after primitive ones overwrite primitive entries with the same key.

use crate::error::{Result, TokenError};
use crate::types::*;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeFamily {
    Colors,
    FontFamily,
    FontSize,
    FontWeight,
    LineHeight,
    BorderRadius,
    Spacing,
    ZIndex,
    BoxShadow,
    TransitionProperty,
    TransitionDuration,
    TransitionTimingFunction,
}

impl ThemeFamily {
    /// Declaration order of the emitted object
    pub const ALL: [ThemeFamily; 12] = [
        Self::Colors,
        Self::FontFamily,
        Self::FontSize,
        Self::FontWeight,
        Self::LineHeight,
        Self::BorderRadius,
        Self::Spacing,
        Self::ZIndex,
        Self::BoxShadow,
        Self::TransitionProperty,
        Self::TransitionDuration,
        Self::TransitionTimingFunction,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Colors => "colors",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::LineHeight => "lineHeight",
            Self::BorderRadius => "borderRadius",
            Self::Spacing => "spacing",
            Self::ZIndex => "zIndex",
            Self::BoxShadow => "boxShadow",
            Self::TransitionProperty => "transitionProperty",
            Self::TransitionDuration => "transitionDuration",
            Self::TransitionTimingFunction => "transitionTimingFunction",
        }
    }
}

/// Where the leaves of `branch.key` land in the theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRoute {
    pub branch: &'static str,
    pub key: &'static str,
    pub family: ThemeFamily,
    pub nested: bool,
    pub skip_falsy: bool,
}

impl FamilyRoute {
    const fn flat(branch: &'static str, key: &'static str, family: ThemeFamily, skip_falsy: bool) -> Self {
        Self {
            branch,
            key,
            family,
            nested: false,
            skip_falsy,
        }
    }

    const fn nested(branch: &'static str, key: &'static str, family: ThemeFamily) -> Self {
        Self {
            branch,
            key,
            family,
            nested: true,
            skip_falsy: false,
        }
    }
}

pub fn default_routes() -> Vec<FamilyRoute> {
    use ThemeFamily::*;
    vec![
        FamilyRoute::nested(PRIMITIVES_KEY, "colors", Colors),
        FamilyRoute::flat(PRIMITIVES_KEY, "fonts", FontFamily, true),
        FamilyRoute::flat(PRIMITIVES_KEY, "fontSizes", FontSize, true),
        FamilyRoute::flat(PRIMITIVES_KEY, "fontWeights", FontWeight, false),
        FamilyRoute::flat(PRIMITIVES_KEY, "lineHeights", LineHeight, true),
        FamilyRoute::flat(PRIMITIVES_KEY, "radii", BorderRadius, true),
        FamilyRoute::flat(PRIMITIVES_KEY, "space", Spacing, false),
        FamilyRoute::flat(PRIMITIVES_KEY, "shadows", BoxShadow, true),
        FamilyRoute::flat(PRIMITIVES_KEY, "durations", TransitionDuration, true),
        FamilyRoute::flat(PRIMITIVES_KEY, "easings", TransitionTimingFunction, true),
        FamilyRoute::nested(SEMANTIC_KEY, "color", Colors),
        FamilyRoute::flat(SEMANTIC_KEY, "spacing", Spacing, false),
        FamilyRoute::flat(SEMANTIC_KEY, "borderRadius", BorderRadius, true),
        FamilyRoute::flat(SEMANTIC_KEY, "zIndex", ZIndex, false),
    ]
}

/// Rendering of the theme artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleFormat {
    /// `module.exports = {...};`
    #[default]
    CommonJs,
    /// `export default {...};`
    Esm,
    /// Bare JSON object
    Json,
}

/// Nested theme object with the fixed family keys
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    families: Map<String, Value>,
}

impl Theme {
    pub fn new() -> Self {
        let families = ThemeFamily::ALL
            .iter()
            .map(|family| (family.key().to_string(), Value::Object(Map::new())))
            .collect();
        Self { families }
    }

    pub fn family(&self, family: ThemeFamily) -> Option<&Map<String, Value>> {
        self.families.get(family.key()).and_then(Value::as_object)
    }

    fn family_mut(&mut self, family: ThemeFamily) -> &mut Map<String, Value> {
        let entry = self
            .families
            .entry(family.key().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("family entry was set to an object above"),
        }
    }

    /// Value at a dot path such as `colors.background.default`
    pub fn get(&self, dot_path: &str) -> Option<&Value> {
        let mut segments = dot_path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.families.get(first)?, |value, key| value.get(key))
    }

    pub fn entry_count(&self) -> usize {
        self.families.values().map(count_leaves).sum()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.families.clone())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(count_leaves).sum(),
        _ => 1,
    }
}

pub struct ThemeEmitter {
    routes: Vec<FamilyRoute>,
}

impl ThemeEmitter {
    pub fn new() -> Self {
        Self::with_routes(default_routes())
    }

    pub fn with_routes(routes: Vec<FamilyRoute>) -> Self {
        Self { routes }
    }

    pub fn generate(&self, tree: &TokenNode) -> Theme {
        let mut theme = Theme::new();
        for route in &self.routes {
            let Some(branch) = tree.get_path(&[route.branch, route.key]) else {
                continue;
            };
            let target = theme.family_mut(route.family);
            if route.nested {
                insert_nested_leaves(target, branch, &mut Vec::new());
            } else {
                insert_direct_leaves(target, branch, route.skip_falsy);
            }
        }
        theme
    }
}

impl Default for ThemeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_direct_leaves(target: &mut Map<String, Value>, branch: &TokenNode, skip_falsy: bool) {
    let Some(children) = branch.as_group() else {
        return;
    };
    for (key, child) in children {
        let Some(token) = child.as_leaf() else {
            continue;
        };
        if skip_falsy && !token.value.is_truthy() {
            continue;
        }
        target.insert(key.clone(), token.value.to_json());
    }
}

fn insert_nested_leaves(target: &mut Map<String, Value>, node: &TokenNode, segments: &mut Vec<String>) {
    match node {
        TokenNode::Leaf(token) => insert_nested(target, segments, token.value.to_json()),
        TokenNode::Group(children) => {
            for (key, child) in children {
                segments.push(key.clone());
                insert_nested_leaves(target, child, segments);
                segments.pop();
            }
        }
    }
}

fn insert_nested(target: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = target;
    for key in parents {
        let entry = current
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        current = map;
    }
    current.insert(last.clone(), value);
}

/// Theme for a resolved tree using the default routes
pub fn generate_theme(tree: &TokenNode) -> Theme {
    ThemeEmitter::new().generate(tree)
}

/// Render the theme as a module the utility-CSS framework can load
pub fn render_module(theme: &Theme, format: ModuleFormat, source_label: &str) -> Result<String> {
    let body = serde_json::to_string_pretty(&theme.to_json())
        .map_err(|e| TokenError::invalid_format(format!("Failed to serialize theme: {}", e)))?;
    let banner = format!(
        "/**\n * Generated Tailwind theme from {}\n * Do not edit manually - this file is auto-generated\n */\n\n",
        source_label
    );
    Ok(match format {
        ModuleFormat::CommonJs => format!("{}module.exports = {};\n", banner, body),
        ModuleFormat::Esm => format!("{}export default {};\n", banner, body),
        ModuleFormat::Json => format!("{}\n", body),
    })
}
