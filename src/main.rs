//! aspfmt - Formatter for Classic ASP pages

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs::File;
use std::io::{self, BufReader, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use aspfmt::{
    find_directive, parse_args, CliArgs, Config, Diagnostic, Directive, FormatService, Result,
};
use glob::Pattern;
use rayon::prelude::*;
use walkdir::WalkDir;

/// ASP file extensions to process (compared lower-cased)
const ASP_EXTENSIONS: &[&str] = &["asp", "asa", "inc"];

/// Default maximum file size in bytes (100 MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// What happened to one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Unchanged,
    Changed,
    Skipped,
}

/// Shared counters for a formatting run
#[derive(Debug, Default)]
struct RunTotals {
    changed: AtomicUsize,
    unchanged: AtomicUsize,
    skipped: AtomicUsize,
    errors: AtomicUsize,
}

impl RunTotals {
    fn record(&self, result: &Result<Outcome>) {
        let counter = match result {
            Ok(Outcome::Changed) => &self.changed,
            Ok(Outcome::Unchanged) => &self.unchanged,
            Ok(Outcome::Skipped) => &self.skipped,
            Err(_) => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    // No inputs and an interactive terminal: nothing to read
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return Ok(());
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    let base_config = build_config(&args, &cwd)?;
    let service = FormatService::new(base_config.clone());

    if !args.silent {
        if let Some(warning) = service.spec_warning() {
            eprintln!("Warning: {warning}");
        }
    }

    if args.reads_stdin() {
        let changed = process_stdin(&service, &base_config, &args)?;
        if args.check && changed {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);
    if files.is_empty() {
        if !args.silent {
            eprintln!("No ASP files found to format.");
        }
        return Ok(());
    }

    let totals = RunTotals::default();
    let per_file_config = args.config.is_none();
    let run_one = |path: &PathBuf| {
        let result = if per_file_config {
            build_config(&args, path).and_then(|config| process_file(&service, path, &config, &args))
        } else {
            process_file(&service, path, &base_config, &args)
        };
        if let Err(e) = &result {
            eprintln!("Error formatting {}: {e}", path.display());
        }
        totals.record(&result);
    };

    // Stdout output keeps file order
    if args.stdout || args.jobs == Some(1) || files.len() == 1 {
        files.iter().for_each(run_one);
    } else {
        files.par_iter().for_each(run_one);
    }

    let changed = totals.changed.load(Ordering::Relaxed);
    let errors = totals.errors.load(Ordering::Relaxed);
    if !args.silent {
        print_summary(&totals, args.check);
    }

    if (args.check && changed > 0) || errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Build configuration for a path: discovered files, then `--config`, then CLI flags
///
/// An explicit `--config` file replaces auto-discovery.
fn build_config(args: &CliArgs, for_path: &Path) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else {
        if args.debug {
            let discovered = Config::discover_config_files(for_path);
            if discovered.is_empty() {
                eprintln!(
                    "[DEBUG] No config files discovered for: {}",
                    for_path.display()
                );
            } else {
                eprintln!("[DEBUG] Discovered config files for {}:", for_path.display());
                for f in &discovered {
                    eprintln!("[DEBUG]   - {}", f.display());
                }
            }
        }
        Config::from_discovered_files(for_path)
    };

    apply_cli_overrides(&mut config, args);

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }
    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if args.no_indent {
        config.impose_indent = false;
    }
    if args.no_case {
        config.impose_case = false;
    }
    if args.no_whitespace {
        config.impose_whitespace = false;
    }
    if args.no_blank_lines {
        config.blank_lines = false;
    }
    if let Some(table) = &args.spec_table {
        config.spec_table = Some(table.clone());
    }
}

fn print_config_debug(config: &Config, source_name: &str) {
    eprintln!("[DEBUG] Configuration for {source_name}:");
    eprintln!("[DEBUG]   indent: {}", config.indent);
    eprintln!("[DEBUG]   impose_indent: {}", config.impose_indent);
    eprintln!("[DEBUG]   impose_case: {}", config.impose_case);
    eprintln!("[DEBUG]   impose_whitespace: {}", config.impose_whitespace);
    eprintln!("[DEBUG]   blank_lines: {}", config.blank_lines);
    if let Some(table) = &config.spec_table {
        eprintln!("[DEBUG]   spec_table: {}", table.display());
    }
    eprintln!("[DEBUG]   limits: {:?}", config.limits);
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                eprintln!("Warning: ignoring exclude pattern {p}: {e}");
                None
            }
        })
        .collect();

    let wanted =
        |path: &Path| is_asp_file(path, &args.extensions) && !is_excluded(path, &exclude_patterns);

    let mut files = Vec::new();
    for input in &args.inputs {
        if input.is_file() {
            // Explicit files are formatted whatever their extension
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            let max_depth = if args.recursive { 256 } else { 1 };
            files.extend(
                WalkDir::new(input)
                    .follow_links(true)
                    .max_depth(max_depth)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                    .filter(|entry| entry.file_type().is_file() && wanted(entry.path()))
                    .map(walkdir::DirEntry::into_path),
            );
        } else {
            eprintln!("Warning: no such file or directory: {}", input.display());
        }
    }
    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// Check if a file has an ASP extension or one of the extra extensions
fn is_asp_file(path: &Path, extra: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| {
            ASP_EXTENSIONS.contains(&ext.as_str()) || extra.iter().any(|e| *e == ext)
        })
}

fn report_diagnostics(source_name: &str, diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        match diag.line_number {
            Some(line) => eprintln!("Warning: {source_name}:{line}: {}", diag.message),
            None => eprintln!("Warning: {source_name}: {}", diag.message),
        }
    }
}

fn report_directive(contents: &str, source_name: &str) {
    match find_directive(&mut BufReader::new(Cursor::new(contents))) {
        Some(Directive::Off) => eprintln!("[DEBUG] Formatting disabled by directive in {source_name}"),
        Some(Directive::Overrides(overrides)) => {
            eprintln!("[DEBUG] Found file directive in {source_name}: {overrides:?}");
        }
        None => {}
    }
}

fn print_stats(service: &FormatService, source_name: &str, contents: &str) {
    let analysis = service.analyze(source_name, contents);
    let stats = &analysis.statistics;
    eprintln!("{source_name}:");
    eprintln!(
        "  regions: {}, lines: {} (script {}, markup {}, comment {})",
        analysis.regions.len(),
        stats.total_lines,
        stats.script_lines,
        stats.markup_lines,
        stats.comment_lines
    );
    eprintln!(
        "  blocks: {} (max depth {}, unclosed {}, unmatched ends {})",
        stats.total_blocks, stats.max_depth, stats.unclosed_blocks, stats.unmatched_ends
    );
    for (kind, count) in &stats.blocks_by_type {
        eprintln!("    {kind}: {count}");
    }
}

/// Format one document's contents and report what the caller should know
fn format_contents(
    service: &FormatService,
    config: &Config,
    args: &CliArgs,
    source_name: &str,
    contents: &str,
) -> (String, bool) {
    if args.debug {
        print_config_debug(config, source_name);
        report_directive(contents, source_name);
    }
    if args.stats || args.debug {
        print_stats(service, source_name, contents);
    }

    let output = service.format_document_with(config, source_name, contents);
    if !args.silent {
        report_diagnostics(source_name, &output.diagnostics);
    }
    (output.text, output.changed)
}

/// Process a single file
fn process_file(
    service: &FormatService,
    path: &Path,
    config: &Config,
    args: &CliArgs,
) -> Result<Outcome> {
    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        if !args.silent {
            eprintln!(
                "Skipping {} ({} MB exceeds limit of {} MB)",
                path.display(),
                file_size / (1024 * 1024),
                DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
            );
        }
        return Ok(Outcome::Skipped);
    }

    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    let Ok(contents) = String::from_utf8(bytes) else {
        if !args.silent {
            eprintln!("Skipping {} (not valid UTF-8)", path.display());
        }
        return Ok(Outcome::Skipped);
    };

    let source_name = path.display().to_string();
    let (text, changed) = format_contents(service, config, args, &source_name, &contents);

    if args.check {
        if changed && !args.silent {
            println!("Would reformat: {source_name}");
        }
    } else if args.stdout {
        io::stdout().lock().write_all(text.as_bytes())?;
    } else if changed {
        std::fs::write(path, text.as_bytes())?;
        if !args.silent {
            eprintln!("Formatted: {source_name}");
        }
    }

    Ok(if changed {
        Outcome::Changed
    } else {
        Outcome::Unchanged
    })
}

/// Process input from stdin, output to stdout; returns whether it changed
fn process_stdin(service: &FormatService, config: &Config, args: &CliArgs) -> Result<bool> {
    let mut contents = String::new();
    io::stdin().read_to_string(&mut contents)?;

    #[allow(clippy::cast_possible_truncation)]
    let size = contents.len() as u64;
    if size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let (text, changed) = format_contents(service, config, args, "stdin", &contents);
    if args.check {
        if changed && !args.silent {
            println!("Would reformat: stdin");
        }
    } else {
        io::stdout().lock().write_all(text.as_bytes())?;
    }
    Ok(changed)
}

fn print_summary(totals: &RunTotals, check: bool) {
    let changed = totals.changed.load(Ordering::Relaxed);
    let unchanged = totals.unchanged.load(Ordering::Relaxed);
    let skipped = totals.skipped.load(Ordering::Relaxed);
    let errors = totals.errors.load(Ordering::Relaxed);

    let verb = if check { "would be reformatted" } else { "reformatted" };
    eprint!("{changed} files {verb}, {unchanged} unchanged");
    if skipped > 0 {
        eprint!(", {skipped} skipped");
    }
    if errors > 0 {
        eprint!(", {errors} errors");
    }
    eprintln!(".");
}

fn print_usage() {
    println!(
        "aspfmt v{} - Classic ASP page formatter",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Re-indents VBScript inside <% %> regions and leaves markup untouched.");
    println!();
    println!("Usage:");
    println!("  aspfmt [OPTIONS] <PATH>...");
    println!("  aspfmt [OPTIONS] -r <DIRECTORY>");
    println!("  aspfmt [OPTIONS] -              # Read from stdin");
    println!();
    println!("Examples:");
    println!("  aspfmt default.asp              # Format single file in-place");
    println!("  aspfmt -r site/                 # Recursively format directory");
    println!("  aspfmt --check -r site/         # List files that would change");
    println!("  aspfmt -i 2 --no-case page.asp  # 2-space indent, keep keyword case");
    println!("  cat page.asp | aspfmt           # Pipe through aspfmt");
    println!();
    println!("Run `aspfmt --help` for every option.");
    println!();
    println!("Supported extensions: .asp, .asa, .inc (plus --ext)");
    println!();
    println!("Config file auto-discovery:");
    println!("  Searches for aspfmt.toml in parent directories");
    println!("  starting from the file being formatted up to the root directory.");
    println!("  Also checks aspfmt.toml in the home directory.");
    println!("  More specific configs (closer to file) override less specific ones.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_asp_file() {
        assert!(is_asp_file(Path::new("site/default.asp"), &[]));
        assert!(is_asp_file(Path::new("global.ASA"), &[]));
        assert!(is_asp_file(Path::new("lib/header.inc"), &[]));
        assert!(!is_asp_file(Path::new("style.css"), &[]));
        assert!(is_asp_file(Path::new("page.aspx"), &["aspx".to_string()]));
    }

    #[test]
    fn test_is_excluded() {
        let patterns = vec![Pattern::new("vendor").unwrap(), Pattern::new("*.inc").unwrap()];
        assert!(is_excluded(Path::new("site/vendor/x.asp"), &patterns));
        assert!(is_excluded(Path::new("site/header.inc"), &patterns));
        assert!(!is_excluded(Path::new("site/default.asp"), &patterns));
        assert!(!is_excluded(Path::new("site/default.asp"), &[]));
    }

    #[test]
    fn test_cli_overrides() {
        let args = aspfmt::parse_args_from(vec![
            "aspfmt",
            "-i",
            "2",
            "--no-case",
            "--no-blank-lines",
            "page.asp",
        ]);
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &args);
        assert_eq!(config.indent, 2);
        assert!(!config.impose_case);
        assert!(!config.blank_lines);
        assert!(config.impose_whitespace);
    }

    #[test]
    fn test_totals_record() {
        let totals = RunTotals::default();
        totals.record(&Ok(Outcome::Changed));
        totals.record(&Ok(Outcome::Unchanged));
        totals.record(&Err(anyhow::anyhow!("boom")));
        assert_eq!(totals.changed.load(Ordering::Relaxed), 1);
        assert_eq!(totals.unchanged.load(Ordering::Relaxed), 1);
        assert_eq!(totals.errors.load(Ordering::Relaxed), 1);
    }
}
