use crate::error::{Result, TokenError};
use crate::export::ExportLayout;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::fs;

/// Optional settings file; every field falls back to the built-in default
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub namespace: Option<String>,
    pub max_passes: Option<usize>,
    pub strict_references: Option<bool>,
    /// `cjs`, `esm` or `json`
    pub theme_format: Option<String>,
    pub source_label: Option<String>,
    pub categories: Option<Vec<Category>>,

    pub tokens: Option<String>,
    pub css_output: Option<String>,
    pub theme_output: Option<String>,
    pub legacy_output: Option<String>,
    pub figma_folder: Option<String>,
    /// Default Figma mode for imports
    pub mode: Option<String>,

    pub export_layout: Option<ExportLayout>,
    pub set_name: Option<String>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path)
        .map_err(|e| TokenError::file_not_found(format!("Config file {}: {}", config_path, e)))?;
    let config = parse(config_path, &config_content)?;
    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

fn parse(config_path: &str, content: &str) -> Result<ConfigFile> {
    if config_path.ends_with(".json") {
        serde_json::from_str(content).map_err(|e| TokenError::config(format!("Invalid JSON config: {}", e)))
    } else if config_path.ends_with(".toml") {
        toml::from_str(content).map_err(|e| TokenError::config(format!("Invalid TOML config: {}", e)))
    } else {
        Err(TokenError::config("Config file must be .json or .toml format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_toml_with_categories() {
        let config = parse(
            "tokc.toml",
            r#"
namespace = "acme"
strict_references = true
export_layout = "dual"

[[categories]]
prefix = "primitives.colors"
name = "Colors"
presenter = "Color"
"#,
        )
        .unwrap();
        assert_eq!(config.namespace.as_deref(), Some("acme"));
        assert_eq!(config.strict_references, Some(true));
        assert_eq!(config.export_layout, Some(ExportLayout::Dual));
        assert_eq!(config.categories.unwrap(), vec![Category::new("primitives.colors", "Colors", "Color")]);
        assert!(config.max_passes.is_none());
    }

    #[test]
    fn test_parse_json() {
        let config = parse("tokc.json", r#"{"max_passes": 4, "theme_format": "esm"}"#).unwrap();
        assert_eq!(config.max_passes, Some(4));
        assert_eq!(config.theme_format.as_deref(), Some("esm"));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        assert!(matches!(parse("tokc.yaml", ""), Err(TokenError::Config { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokc.toml");
        assert!(load(path.to_str().unwrap()).is_err());
    }
}
