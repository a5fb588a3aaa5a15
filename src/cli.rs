//! Command-line interface for aspfmt.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to format (`-` or none reads stdin)
    pub inputs: Vec<PathBuf>,

    /// Number of spaces per indent level
    pub indent: Option<usize>,

    /// Keep the author's indentation
    pub no_indent: bool,

    /// Disable keyword and member casing
    pub no_case: bool,

    /// Disable operator spacing
    pub no_whitespace: bool,

    /// Disable blank lines around procedures
    pub no_blank_lines: bool,

    /// External case table replacing the bundled one
    pub spec_table: Option<PathBuf>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Output to stdout instead of in-place
    pub stdout: bool,

    /// Report files that would change without writing them
    pub check: bool,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Extra file extensions (in addition to asp, asa, inc)
    pub extensions: Vec<String>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Print region and block statistics per file
    pub stats: bool,

    /// Silent mode (no output)
    pub silent: bool,

    /// Enable debug output
    pub debug: bool,
}

impl CliArgs {
    /// True when input comes from stdin
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.inputs.is_empty() || self.inputs.iter().any(|p| p.as_os_str() == "-")
    }
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("aspfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Formatter for Classic ASP pages (VBScript embedded in HTML)")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format (use - for stdin)")
                .value_name("PATH")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("indent")
                .short('i')
                .long("indent")
                .help("Number of spaces per indent level [default: 4]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("no-indent")
                .long("no-indent")
                .help("Keep existing indentation of script lines")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-case")
                .long("no-case")
                .help("Do not normalize keyword and object member case")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-whitespace")
                .long("no-whitespace")
                .help("Do not normalize spacing around operators")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-blank-lines")
                .long("no-blank-lines")
                .help("Do not insert blank lines around procedures")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("spec-table")
                .long("spec-table")
                .help("Path to a keyword table replacing the bundled one")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("stdout")
                .short('s')
                .long("stdout")
                .help("Output to stdout instead of modifying files in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Write nothing; list files that would change and exit 1 if any")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively format directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("ext")
                .long("ext")
                .help("Additional file extension to format (can be repeated, e.g., --ext aspx)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print region and block statistics for each file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no output, for editor integration)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config, statistics, diagnostics)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

fn strings(matches: &clap::ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        indent: matches.get_one::<usize>("indent").copied(),
        no_indent: matches.get_flag("no-indent"),
        no_case: matches.get_flag("no-case"),
        no_whitespace: matches.get_flag("no-whitespace"),
        no_blank_lines: matches.get_flag("no-blank-lines"),
        spec_table: matches.get_one::<PathBuf>("spec-table").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        stdout: matches.get_flag("stdout"),
        check: matches.get_flag("check"),
        recursive: matches.get_flag("recursive"),
        exclude: strings(matches, "exclude"),
        extensions: strings(matches, "ext")
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        stats: matches.get_flag("stats"),
        silent: matches.get_flag("silent"),
        debug: matches.get_flag("debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds() {
        let cmd = build_cli();
        assert_eq!(cmd.get_name(), "aspfmt");
        cmd.debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse_args_from(vec!["aspfmt"]);
        assert!(args.inputs.is_empty());
        assert!(args.reads_stdin());
        assert_eq!(args.indent, None);
        assert!(!args.no_indent);
        assert!(!args.no_case);
        assert!(!args.check);
        assert!(!args.stdout);
    }

    #[test]
    fn test_dash_reads_stdin() {
        let args = parse_args_from(vec!["aspfmt", "-"]);
        assert!(args.reads_stdin());
        let args = parse_args_from(vec!["aspfmt", "page.asp"]);
        assert!(!args.reads_stdin());
    }

    #[test]
    fn test_indent_and_toggles() {
        let args = parse_args_from(vec![
            "aspfmt",
            "-i",
            "2",
            "--no-case",
            "--no-whitespace",
            "--no-blank-lines",
            "page.asp",
        ]);
        assert_eq!(args.indent, Some(2));
        assert!(args.no_case);
        assert!(args.no_whitespace);
        assert!(args.no_blank_lines);
        assert!(!args.no_indent);
    }

    #[test]
    fn test_exclude_multiple() {
        let args = parse_args_from(vec![
            "aspfmt",
            "-e",
            "*/vendor/*",
            "--exclude",
            "*.inc",
            "src",
        ]);
        assert_eq!(args.exclude, vec!["*/vendor/*", "*.inc"]);
    }

    #[test]
    fn test_extensions_normalized() {
        let args = parse_args_from(vec!["aspfmt", "--ext", ".ASPX", "--ext", "vbs", "src"]);
        assert_eq!(args.extensions, vec!["aspx", "vbs"]);
    }

    #[test]
    fn test_spec_table_and_config() {
        let args = parse_args_from(vec![
            "aspfmt",
            "--spec-table",
            "words.toml",
            "-c",
            "aspfmt.toml",
            "page.asp",
        ]);
        assert_eq!(args.spec_table, Some(PathBuf::from("words.toml")));
        assert_eq!(args.config, Some(PathBuf::from("aspfmt.toml")));
    }

    #[test]
    fn test_mode_flags() {
        let args = parse_args_from(vec![
            "aspfmt", "--check", "--stats", "-S", "-D", "-r", "-j", "4", "site",
        ]);
        assert!(args.check);
        assert!(args.stats);
        assert!(args.silent);
        assert!(args.debug);
        assert!(args.recursive);
        assert_eq!(args.jobs, Some(4));
    }

    #[test]
    fn test_invalid_indent_rejected() {
        let result = build_cli().try_get_matches_from(vec!["aspfmt", "-i", "two"]);
        assert!(result.is_err());
    }
}
