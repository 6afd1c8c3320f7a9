//! CSS custom property generation
//!
//! Category markers (`/* @tokens Name @presenter Hint */` ... `/* @tokens-end */`)
//! are parsed by the documentation tool and must keep this exact syntax.

use crate::classifier::{classify, Classification};
use crate::flatten::FlatTokenMap;
use crate::types::*;

pub struct CssEmitter {
    namespace: String,
    output: String,
}

impl CssEmitter {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            output: String::new(),
        }
    }

    /// `primitives.colors.blue.500` -> `--joe-primitives-colors-blue-500`
    pub fn variable_name(&self, path: &str) -> String {
        let dashed = path.replace('.', "-");
        if self.namespace.is_empty() {
            format!("--{}", dashed)
        } else {
            format!("--{}-{}", self.namespace, dashed)
        }
    }

    pub fn generate(&mut self, flat: &FlatTokenMap, categories: &[Category]) -> String {
        let classification = classify(flat, categories);
        self.generate_classified(&classification)
    }

    pub fn generate_classified(&mut self, classification: &Classification<'_>) -> String {
        self.output.clear();
        self.push_line(":root {");

        for block in classification.blocks.iter().filter(|b| !b.entries.is_empty()) {
            let start = format!(
                "  /* @tokens {} @presenter {} */",
                block.category.name, block.category.presenter
            );
            self.push_line(&start);
            for (path, value) in &block.entries {
                let line = format!("  {}: {};", self.variable_name(path), value);
                self.push_line(&line);
            }
            self.push_line("  /* @tokens-end */");
        }

        self.push_line("}");
        std::mem::take(&mut self.output)
    }

    fn push_line(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Stylesheet for `flat` with the given namespace and categories
pub fn generate_css(flat: &FlatTokenMap, namespace: &str, categories: &[Category]) -> String {
    CssEmitter::new(namespace).generate(flat, categories)
}
