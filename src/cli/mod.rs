mod config;
mod handlers;

use crate::error::{Result, TokenError};
use crate::export::{ExportLayout, ExportOptions};
use crate::theme_emitter::ModuleFormat;
use crate::{BuildOptions, PathsConfig};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeFormat {
    Cjs,
    Esm,
    Json,
}

impl From<ThemeFormat> for ModuleFormat {
    fn from(format: ThemeFormat) -> Self {
        match format {
            ThemeFormat::Cjs => ModuleFormat::CommonJs,
            ThemeFormat::Esm => ModuleFormat::Esm,
            ThemeFormat::Json => ModuleFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    Single,
    Dual,
}

impl From<Layout> for ExportLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Single => ExportLayout::Single,
            Layout::Dual => ExportLayout::Dual,
        }
    }
}

pub struct TokenCli {
    config: config::ConfigFile,
    paths: PathsConfig,
    start_time: Instant,
}

impl TokenCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            paths: PathsConfig::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let matches = build_cli().get_matches();
        self.run_with(&matches)
    }

    pub fn run_with(&mut self, matches: &ArgMatches) -> Result<()> {
        self.start_time = Instant::now();

        // Global flags may land on the subcommand's matches
        let sub_matches = matches.subcommand().map(|(_, sub)| sub);
        let config_path = string_arg(matches, "config").or_else(|| sub_matches.and_then(|sub| string_arg(sub, "config")));
        if let Some(config_path) = config_path {
            self.config = config::load(&config_path)?;
        }

        let verbose = std::iter::once(matches)
            .chain(sub_matches)
            .map(|m| m.get_count("verbose"))
            .max()
            .unwrap_or(0);
        self.setup_logging(verbose);

        match matches.subcommand() {
            Some(("build", sub_matches)) => handlers::handle_build_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            Some(("import-figma", sub_matches)) => handlers::handle_import_figma_command(self, sub_matches),
            Some(("import-folder", sub_matches)) => handlers::handle_import_folder_command(self, sub_matches),
            Some(("import-kit", sub_matches)) => handlers::handle_import_kit_command(self, sub_matches),
            Some(("export-legacy", sub_matches)) => handlers::handle_export_legacy_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn setup_logging(&self, verbose_count: u8) {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        // A second run in the same process keeps the first logger
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .try_init();
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    pub fn build_options(&self, matches: &ArgMatches) -> Result<BuildOptions> {
        let mut options = BuildOptions::default();

        if let Some(namespace) = string_arg(matches, "namespace").or_else(|| self.config.namespace.clone()) {
            options.namespace = namespace;
        }
        if let Some(max_passes) = self.config.max_passes {
            if max_passes == 0 {
                return Err(TokenError::config("max_passes must be at least 1"));
            }
            options.max_passes = max_passes;
        }
        options.strict_references = flag_arg(matches, "strict") || self.config.strict_references.unwrap_or(false);

        let format = match matches.try_get_one::<ThemeFormat>("format").ok().flatten() {
            Some(format) => Some(*format),
            None => self
                .config
                .theme_format
                .as_deref()
                .map(|s| {
                    ThemeFormat::from_str(s, true)
                        .map_err(|_| TokenError::config(format!("Unknown theme format '{}'", s)))
                })
                .transpose()?,
        };
        if let Some(format) = format {
            options.module_format = format.into();
        }

        if let Some(categories) = &self.config.categories {
            options.categories = categories.clone();
        }
        if let Some(label) = &self.config.source_label {
            options.source_label = label.clone();
        }
        Ok(options)
    }

    pub fn export_options(&self, matches: &ArgMatches) -> ExportOptions {
        let mut options = ExportOptions::default();
        if let Some(layout) = matches.try_get_one::<Layout>("layout").ok().flatten() {
            options.layout = (*layout).into();
        } else if let Some(layout) = self.config.export_layout {
            options.layout = layout;
        }
        if let Some(set_name) = string_arg(matches, "set-name").or_else(|| self.config.set_name.clone()) {
            options.set_name = set_name;
        }
        options
    }

    /// Command-line value, then config value, then the built-in default
    pub fn path(&self, matches: &ArgMatches, id: &str) -> PathBuf {
        let (configured, default) = match id {
            "css-out" => (&self.config.css_output, &self.paths.css_output),
            "theme-out" => (&self.config.theme_output, &self.paths.theme_output),
            "output" => (&self.config.legacy_output, &self.paths.legacy_output),
            "folder" => (&self.config.figma_folder, &self.paths.figma_folder),
            _ => (&self.config.tokens, &self.paths.tokens),
        };
        string_arg(matches, id)
            .or_else(|| configured.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| default.clone())
    }

    pub fn mode(&self, matches: &ArgMatches) -> Option<String> {
        string_arg(matches, "mode").or_else(|| self.config.mode.clone())
    }
}

impl Default for TokenCli {
    fn default() -> Self {
        Self::new()
    }
}

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.try_get_one::<String>(id).ok().flatten().cloned()
}

fn flag_arg(matches: &ArgMatches, id: &str) -> bool {
    matches.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

fn tokens_arg() -> Arg {
    Arg::new("tokens")
        .long("tokens")
        .value_name("FILE")
        .help("Canonical token document to merge into")
}

fn mode_arg() -> Arg {
    Arg::new("mode")
        .short('m')
        .long("mode")
        .value_name("MODE")
        .help("Figma mode to import (defaults to the first mode)")
}

pub fn build_cli() -> Command {
    Command::new(crate::NAME)
        .version(crate::VERSION)
        .about(crate::DESCRIPTION)
        .author("Joe Design System Team")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (.toml or .json)")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase verbosity (can be used multiple times)")
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("build")
                .about("Compile the token document to CSS variables and a theme module")
                .arg(Arg::new("input").short('i').long("input").value_name("FILE").help("Token document"))
                .arg(Arg::new("css-out").long("css-out").value_name("FILE").help("Stylesheet output path"))
                .arg(Arg::new("theme-out").long("theme-out").value_name("FILE").help("Theme module output path"))
                .arg(Arg::new("namespace").short('n').long("namespace").value_name("NAME").help("CSS variable namespace"))
                .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(ThemeFormat)).help("Theme module format"))
                .arg(Arg::new("strict").long("strict").help("Fail on unresolved references").action(ArgAction::SetTrue))
                .arg(Arg::new("stats").long("stats").help("Show detailed build statistics").action(ArgAction::SetTrue))
                .arg(Arg::new("watch").short('w').long("watch").help("Rebuild when the token document changes").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("check")
                .about("Run the build pipeline without writing outputs")
                .arg(Arg::new("input").short('i').long("input").value_name("FILE").help("Token document"))
                .arg(Arg::new("strict").long("strict").help("Fail on unresolved references").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("import-figma")
                .about("Merge a Figma \"Export modes\" JSON file into the token document")
                .arg(Arg::new("file").help("Figma export file").required(true).index(1))
                .arg(mode_arg())
                .arg(tokens_arg()),
        )
        .subcommand(
            Command::new("import-folder")
                .about("Merge a folder of per-collection Figma exports into the token document")
                .arg(Arg::new("folder").long("folder").value_name("DIR").help("Export folder"))
                .arg(mode_arg())
                .arg(tokens_arg()),
        )
        .subcommand(
            Command::new("import-kit")
                .about("Merge a UI kit token export into the token document")
                .arg(Arg::new("file").help("Kit token file").required(true).index(1))
                .arg(tokens_arg()),
        )
        .subcommand(
            Command::new("export-legacy")
                .about("Write the legacy Tokens Studio export")
                .arg(Arg::new("input").short('i').long("input").value_name("FILE").help("Token document"))
                .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Legacy output path"))
                .arg(Arg::new("layout").short('l').long("layout").value_parser(clap::value_parser!(Layout)).help("Single collection or primitives + semantic"))
                .arg(Arg::new("set-name").long("set-name").value_name("NAME").help("Collection name for the single layout")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(args: &[&str]) -> ArgMatches {
        let matches = build_cli().try_get_matches_from(args).unwrap();
        let (_, sub_matches) = matches.subcommand().unwrap();
        sub_matches.clone()
    }

    #[test]
    fn test_build_arguments() {
        let matches = sub(&["tokc", "build", "--namespace", "acme", "--format", "esm", "--strict"]);
        let cli = TokenCli::new();
        let options = cli.build_options(&matches).unwrap();
        assert_eq!(options.namespace, "acme");
        assert_eq!(options.module_format, ModuleFormat::Esm);
        assert!(options.strict_references);
        assert_eq!(cli.path(&matches, "input"), PathBuf::from("tokens/joe-tokens.json"));
        assert_eq!(cli.path(&matches, "css-out"), PathBuf::from("tokens/output/css/variables.css"));
    }

    #[test]
    fn test_check_has_no_namespace_argument() {
        let matches = sub(&["tokc", "check", "--input", "t.json"]);
        let options = TokenCli::new().build_options(&matches).unwrap();
        assert_eq!(options.namespace, "joe");
        assert_eq!(options.module_format, ModuleFormat::CommonJs);
    }

    #[test]
    fn test_config_values_apply_below_flags() {
        let mut cli = TokenCli::new();
        cli.config.namespace = Some("fromconfig".to_string());
        cli.config.theme_format = Some("json".to_string());
        cli.config.tokens = Some("design/tokens.json".to_string());

        let plain = sub(&["tokc", "build"]);
        let options = cli.build_options(&plain).unwrap();
        assert_eq!(options.namespace, "fromconfig");
        assert_eq!(options.module_format, ModuleFormat::Json);
        assert_eq!(cli.path(&plain, "input"), PathBuf::from("design/tokens.json"));

        let flagged = sub(&["tokc", "build", "-n", "flag", "-i", "x.json"]);
        assert_eq!(cli.build_options(&flagged).unwrap().namespace, "flag");
        assert_eq!(cli.path(&flagged, "input"), PathBuf::from("x.json"));
    }

    #[test]
    fn test_bad_config_format_is_an_error() {
        let mut cli = TokenCli::new();
        cli.config.theme_format = Some("yaml".to_string());
        assert!(cli.build_options(&sub(&["tokc", "build"])).is_err());
    }

    #[test]
    fn test_export_arguments() {
        let matches = sub(&["tokc", "export-legacy", "--layout", "dual", "--set-name", "brand"]);
        let options = TokenCli::new().export_options(&matches);
        assert_eq!(options.layout, ExportLayout::Dual);
        assert_eq!(options.set_name, "brand");
    }

    #[test]
    fn test_import_requires_file() {
        assert!(build_cli().try_get_matches_from(["tokc", "import-figma"]).is_err());
        let matches = sub(&["tokc", "import-figma", "export.json", "--mode", "dark"]);
        assert_eq!(TokenCli::new().mode(&matches).as_deref(), Some("dark"));
    }
}
