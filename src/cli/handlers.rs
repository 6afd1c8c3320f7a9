use super::TokenCli;
use crate::error::{Result, TokenError};
use crate::{
    build_file, check_file, export_legacy_file, import_figma_folder, import_figma_variables_file, import_kit_file,
    storage, BuildOptions, BuildStats, ImportSummary,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::SystemTime;

// --- BUILD ---
pub fn handle_build_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<()> {
    let input = cli.path(matches, "input");
    let css_out = cli.path(matches, "css-out");
    let theme_out = cli.path(matches, "theme-out");
    let options = cli.build_options(matches)?;

    if matches.get_flag("watch") {
        watch_and_build(&input, &css_out, &theme_out, &options)
    } else {
        println!("🔨 Building tokens from {}...", input.display());
        let stats = build_file(&input, &css_out, &theme_out, &options)?;
        println!("✅ Generated: {}", css_out.display());
        println!("✅ Generated: {}", theme_out.display());
        print_build_summary(&stats);
        if matches.get_flag("stats") {
            print_detailed_stats(&stats)?;
        }
        println!("✨ Token build complete! ({}ms)", cli.elapsed_ms());
        Ok(())
    }
}

fn watch_and_build(input: &Path, css_out: &Path, theme_out: &Path, options: &BuildOptions) -> Result<()> {
    let watch_dir = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| TokenError::watch(format!("Failed to create file watcher: {}", e)))?;

    // The directory is watched so editors that replace the file are still seen
    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| TokenError::watch(format!("Failed to watch {}: {}", watch_dir.display(), e)))?;

    let mut last_modified = storage::modified_time(input);
    rebuild(input, css_out, theme_out, options, "Initial build");
    println!("👀 Watching {} for changes...", input.display());

    loop {
        match rx.recv() {
            Ok(_event) => {
                let modified = storage::modified_time(input);
                if !mtime_changed(last_modified, modified) {
                    continue;
                }
                last_modified = modified;
                println!("\n📝 Tokens file changed, rebuilding...");
                rebuild(input, css_out, theme_out, options, "Rebuild");
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn rebuild(input: &Path, css_out: &Path, theme_out: &Path, options: &BuildOptions, label: &str) {
    match build_file(input, css_out, theme_out, options) {
        Ok(stats) => println!(
            "✅ {} successful ({} tokens, {}ms)",
            label, stats.token_count, stats.build_time_ms
        ),
        Err(e) => eprintln!("❌ {} failed: {}", label, e),
    }
}

/// A deleted file never triggers a rebuild
fn mtime_changed(previous: Option<SystemTime>, current: Option<SystemTime>) -> bool {
    current.is_some() && current != previous
}

// --- CHECK ---
pub fn handle_check_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<()> {
    let input = cli.path(matches, "input");
    let options = cli.build_options(matches)?;
    println!("🔍 Checking {}", input.display());

    match check_file(&input, &options) {
        Ok(report) => {
            if report.resolution.is_complete() {
                println!("✅ {} - No issues found", input.display());
            } else {
                println!(
                    "⚠️  {} - {} unresolved reference(s)",
                    input.display(),
                    report.resolution.unresolved.len()
                );
                for unresolved in &report.resolution.unresolved {
                    println!("   {} -> {}", unresolved.path, unresolved.reference);
                }
            }
            print_build_summary(&report.stats);
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", input.display(), e);
            Err(e)
        }
    }
}

// --- IMPORT ---
pub fn handle_import_figma_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<()> {
    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| TokenError::invalid_format("missing Figma export file"))?;
    let tokens = cli.path(matches, "tokens");
    let mode = cli.mode(matches);

    println!("📥 Importing Figma variables from {}...", file);
    if let Some(mode) = &mode {
        println!("🎨 Using mode: {}", mode);
    }
    let summary = import_figma_variables_file(Path::new(file), &tokens, mode.as_deref())?;
    print_import_summary(&summary, &tokens);
    Ok(())
}

pub fn handle_import_folder_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<()> {
    let folder = cli.path(matches, "folder");
    let tokens = cli.path(matches, "tokens");
    let mode = cli.mode(matches);

    println!("📥 Importing Figma variables from folder: {}", folder.display());
    let summary = import_figma_folder(&folder, &tokens, mode.as_deref())?;
    print_import_summary(&summary, &tokens);
    Ok(())
}

pub fn handle_import_kit_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<()> {
    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| TokenError::invalid_format("missing kit token file"))?;
    let tokens = cli.path(matches, "tokens");

    println!("📥 Importing kit tokens from {}...", file);
    let summary = import_kit_file(Path::new(file), &tokens)?;
    print_import_summary(&summary, &tokens);
    Ok(())
}

// --- EXPORT ---
pub fn handle_export_legacy_command(cli: &TokenCli, matches: &clap::ArgMatches) -> Result<()> {
    let input = cli.path(matches, "input");
    let output = cli.path(matches, "output");
    let options = cli.export_options(matches);

    export_legacy_file(&input, &output, &options)?;
    println!("✅ Wrote {} ({:?} layout, set \"{}\")", output.display(), options.layout, options.set_name);
    Ok(())
}

// --- OUTPUT ---
fn print_build_summary(stats: &BuildStats) {
    println!(
        "   {} tokens ({} primitive, {} semantic), {} categorized",
        stats.token_count, stats.primitive_count, stats.semantic_count, stats.categorized_count
    );
    if stats.unresolved_count > 0 {
        println!("   ⚠️  {} unresolved reference(s)", stats.unresolved_count);
    }
}

fn print_detailed_stats(stats: &BuildStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| TokenError::invalid_format(format!("Failed to serialize stats: {}", e)))?;
    println!("\n📊 Detailed Build Statistics:");
    println!("{}", json);
    Ok(())
}

fn print_import_summary(summary: &ImportSummary, tokens: &Path) {
    println!(
        "   Found {} primitive tokens, {} semantic tokens",
        summary.primitive_count, summary.semantic_count
    );
    if !summary.skipped.is_empty() {
        println!("   Skipped {} variable(s)", summary.skipped.len());
    }
    println!("💾 Backed up existing tokens to: {}", storage::backup_path(tokens).display());
    println!("✅ Merged tokens written to: {}", tokens.display());
    println!("\n✨ Import complete!");
    println!("📝 Next steps:");
    println!("   1. Review the merged tokens in {}", tokens.display());
    println!("   2. Run: tokc build");
    println!(
        "   3. If needed, restore backup: cp {} {}",
        storage::backup_path(tokens).display(),
        tokens.display()
    );
}
