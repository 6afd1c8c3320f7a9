//! Design Token Compiler
//!
//! Compiles a canonical design-token document (`primitives` + `semantic`,
//! legacy or W3C DTCG keys) into a CSS custom-property stylesheet and a
//! Tailwind theme module, and keeps the document in sync with Figma exports.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tokc::{build_file, BuildOptions, Result};
//!
//! fn main() -> Result<()> {
//!     build_file(
//!         Path::new("tokens/joe-tokens.json"),
//!         Path::new("tokens/output/css/variables.css"),
//!         Path::new("tokens/output/tailwind/theme.cjs"),
//!         &BuildOptions::default(),
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! # Build Pipeline
//!
//! 1. **Normalize**: legacy and DTCG keys become one `TokenNode` tree
//! 2. **Resolve**: `{dot.path}` references are substituted to a fixed point
//! 3. **Flatten**: leaves become a document-ordered dot-path map
//! 4. **Classify**: paths are grouped into the documentation categories
//! 5. **Emit**: the stylesheet and the theme module are rendered in memory
//!
//! Output files are only written once both artifacts exist.

pub mod adapters;
pub mod classifier;
pub mod cli;
pub mod css_emitter;
pub mod document;
pub mod error;
pub mod export;
pub mod flatten;
pub mod merge;
pub mod normalizer;
pub mod resolver;
pub mod storage;
pub mod theme_emitter;
pub mod types;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

// Re-export commonly used types and functions
pub use adapters::ImportSummary;
pub use classifier::{classify, Classification};
pub use cli::TokenCli;
pub use css_emitter::{generate_css, CssEmitter};
pub use document::TokenDocument;
pub use error::{Result, TokenError};
pub use export::{export_legacy, ExportLayout, ExportOptions};
pub use flatten::{flatten, FlatTokenMap};
pub use merge::{merge, merge_into_document};
pub use normalizer::normalize;
pub use resolver::{resolve_references, ReferenceResolver, ResolveReport};
pub use theme_emitter::{generate_theme, render_module, ModuleFormat, Theme, ThemeEmitter};
pub use types::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build settings
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// CSS variable namespace (`--<namespace>-...`)
    pub namespace: String,

    /// Upper bound on reference resolution passes
    pub max_passes: usize,

    /// Fail the build when references remain unresolved
    pub strict_references: bool,

    /// Stylesheet categories, in output order
    pub categories: Vec<Category>,

    pub module_format: ModuleFormat,

    /// Source name written into the theme module banner
    pub source_label: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_passes: DEFAULT_MAX_PASSES,
            strict_references: false,
            categories: default_categories(),
            module_format: ModuleFormat::CommonJs,
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
        }
    }
}

/// Default file locations, relative to the project root
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub tokens: PathBuf,
    pub css_output: PathBuf,
    pub theme_output: PathBuf,
    pub legacy_output: PathBuf,
    pub figma_folder: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tokens: PathBuf::from("tokens/joe-tokens.json"),
            css_output: PathBuf::from("tokens/output/css/variables.css"),
            theme_output: PathBuf::from("tokens/output/tailwind/theme.cjs"),
            legacy_output: PathBuf::from("tokens/joe-tokens-legacy.json"),
            figma_folder: PathBuf::from("tokens/obra-variables-figma-export"),
        }
    }
}

/// Build statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    /// Source document size in bytes
    pub source_size: u64,

    pub token_count: usize,
    pub primitive_count: usize,
    pub semantic_count: usize,

    /// Resolution passes run
    pub passes: usize,
    pub substitutions: usize,
    pub unresolved_count: usize,

    /// Tokens that landed in a stylesheet category
    pub categorized_count: usize,
    pub uncategorized_count: usize,

    /// Leaf entries in the theme object
    pub theme_entry_count: usize,

    pub css_size: u64,
    pub theme_size: u64,

    /// Build time in milliseconds
    pub build_time_ms: u64,
}

/// Everything a build produced, before anything is written
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub css: String,
    pub theme_module: String,
    pub resolution: ResolveReport,
    pub stats: BuildStats,
}

/// Run the pipeline over an already normalized tree
pub fn build_tree(tree: &TokenNode, options: &BuildOptions) -> Result<BuildReport> {
    let start_time = Instant::now();

    log::debug!("Phase 2: Resolving references (max {} passes)...", options.max_passes);
    let (resolved, resolution) = ReferenceResolver::new(options.max_passes).resolve(tree);
    log::debug!(
        "Phase 2 complete: {} substitution(s) in {} pass(es)",
        resolution.substitutions,
        resolution.passes
    );

    if options.strict_references && !resolution.is_complete() {
        return Err(TokenError::UnresolvedReferences {
            count: resolution.unresolved.len(),
            paths: resolution
                .unresolved
                .iter()
                .map(|u| format!("{} -> {}", u.path, u.reference))
                .collect(),
        });
    }

    log::debug!("Phase 3: Flattening...");
    let flat = flatten(&resolved);

    log::debug!("Phase 4: Classifying {} token(s)...", flat.len());
    let classification = classify(&flat, &options.categories);

    log::debug!("Phase 5: Emitting stylesheet and theme...");
    let css = CssEmitter::new(&options.namespace).generate_classified(&classification);
    let theme = generate_theme(&resolved);
    let theme_module = render_module(&theme, options.module_format, &options.source_label)?;

    let count = |key: &str| resolved.child(key).map(TokenNode::leaf_count).unwrap_or(0);
    let stats = BuildStats {
        source_size: 0,
        token_count: flat.len(),
        primitive_count: count(PRIMITIVES_KEY),
        semantic_count: count(SEMANTIC_KEY),
        passes: resolution.passes,
        substitutions: resolution.substitutions,
        unresolved_count: resolution.unresolved.len(),
        categorized_count: classification.categorized_count(),
        uncategorized_count: classification.uncategorized.len(),
        theme_entry_count: theme.entry_count(),
        css_size: css.len() as u64,
        theme_size: theme_module.len() as u64,
        build_time_ms: start_time.elapsed().as_millis() as u64,
    };

    Ok(BuildReport {
        css,
        theme_module,
        resolution,
        stats,
    })
}

/// Parse, normalize and build a token document held in memory
pub fn build_source(source: &str, filename: &str, options: &BuildOptions) -> Result<BuildReport> {
    log::debug!("Phase 1: Normalizing {} ({} bytes)...", filename, source.len());
    let current = TokenDocument::parse(source, filename)?;
    let mut report = build_tree(&current.tree, options)?;
    report.stats.source_size = source.len() as u64;
    Ok(report)
}

/// Build the document without writing anything
pub fn check_file(input: &Path, options: &BuildOptions) -> Result<BuildReport> {
    let source = storage::read_to_string(input)?;
    build_source(&source, &input.display().to_string(), options)
}

/// Build the document and write both artifacts
pub fn build_file(input: &Path, css_out: &Path, theme_out: &Path, options: &BuildOptions) -> Result<BuildStats> {
    let start_time = Instant::now();
    let report = check_file(input, options)?;

    storage::write_output(css_out, &report.css)?;
    storage::write_output(theme_out, &report.theme_module)?;

    let mut stats = report.stats;
    stats.build_time_ms = start_time.elapsed().as_millis() as u64;
    log::info!(
        "Built {} token(s) from {} in {}ms",
        stats.token_count,
        input.display(),
        stats.build_time_ms
    );
    Ok(stats)
}

/// Import a Figma "Export modes" file into the canonical document
pub fn import_figma_variables_file(export_path: &Path, tokens_path: &Path, mode: Option<&str>) -> Result<ImportSummary> {
    let file = export_path.display().to_string();
    let value = document::parse_json(&storage::read_to_string(export_path)?, &file)?;
    let export = adapters::figma_modes::parse_export(&value, &file)?;
    log::info!("Read Figma export ({} collections)", export.collections.len());

    let (tree, summary) = adapters::figma_modes::map_export(&export, mode);
    apply_import(tokens_path, &tree)?;
    Ok(summary)
}

/// Import a folder of per-collection Figma exports into the canonical document
pub fn import_figma_folder(folder: &Path, tokens_path: &Path, mode: Option<&str>) -> Result<ImportSummary> {
    let mut files = Vec::new();
    for (relative, path) in storage::scan_folder(folder)? {
        let value = document::parse_json(&storage::read_to_string(&path)?, &relative)?;
        files.push(adapters::figma_folder::FolderFile::new(&relative, value));
    }
    log::info!("Found {} JSON file(s) in {}", files.len(), folder.display());

    let (tree, summary) = adapters::figma_folder::import_folder(&files, mode);
    apply_import(tokens_path, &tree)?;
    Ok(summary)
}

/// Import a third-party kit export into the canonical document
pub fn import_kit_file(kit_path: &Path, tokens_path: &Path) -> Result<ImportSummary> {
    let file = kit_path.display().to_string();
    let value = document::parse_json(&storage::read_to_string(kit_path)?, &file)?;
    let (tree, summary) = adapters::kit::import_kit(&value)?;
    apply_import(tokens_path, &tree)?;
    Ok(summary)
}

/// Back up the canonical document, merge `incoming` and write it back
fn apply_import(tokens_path: &Path, incoming: &TokenNode) -> Result<()> {
    let existing = storage::read_to_string(tokens_path)?;
    let current = TokenDocument::parse(&existing, &tokens_path.display().to_string())?;
    storage::backup_file(tokens_path, &existing)?;

    let merged = merge_into_document(&current, incoming);
    storage::write_atomic(tokens_path, &merged.to_pretty_string()?)
}

/// Write the legacy Tokens Studio export of `input` to `output`
pub fn export_legacy_file(input: &Path, output: &Path, options: &ExportOptions) -> Result<()> {
    let source = storage::read_to_string(input)?;
    let current = TokenDocument::parse(&source, &input.display().to_string())?;
    let exported = export_legacy(&current, options)?;
    let mut text = document::to_pretty_json(&exported)?;
    text.push('\n');
    storage::write_output(output, &text)
}
