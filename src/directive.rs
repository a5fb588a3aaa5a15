//! Inline directive parsing for `' aspfmt:` comments
//!
//! Supports in-file configuration overrides via special VBScript comments,
//! either on their own line inside a script region or as a one-line region:
//! `' aspfmt: --indent 2 --no-case` or `<% ' aspfmt: off %>`

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern to match aspfmt directives
static ASPFMT_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:<%)?\s*'\s*aspfmt:\s*(.*?)\s*(?:%>)?\s*$")
        .unwrap_or_else(|_| panic!("Invalid directive pattern"))
});

/// Parsed directive options that can override config
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveOverrides {
    pub indent: Option<usize>,
    pub impose_indent: Option<bool>,
    pub impose_case: Option<bool>,
    pub impose_whitespace: Option<bool>,
    pub blank_lines: Option<bool>,
}

impl DirectiveOverrides {
    /// Check if any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indent.is_none()
            && self.impose_indent.is_none()
            && self.impose_case.is_none()
            && self.impose_whitespace.is_none()
            && self.blank_lines.is_none()
    }
}

/// A recognized directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `' aspfmt: off` leaves the whole document untouched
    Off,
    Overrides(DirectiveOverrides),
}

/// Check if a line contains an aspfmt directive
#[must_use]
pub fn is_directive_line(line: &str) -> bool {
    ASPFMT_DIRECTIVE_RE.is_match(line)
}

/// Parse an aspfmt directive line
///
/// Returns `None` if the line is not a directive or sets nothing.
#[must_use]
pub fn parse_directive(line: &str) -> Option<Directive> {
    let caps = ASPFMT_DIRECTIVE_RE.captures(line)?;
    let args_str = caps.get(1)?.as_str();

    if args_str.eq_ignore_ascii_case("off") {
        return Some(Directive::Off);
    }
    parse_directive_args(args_str).map(Directive::Overrides)
}

/// Parse directive arguments into overrides
fn parse_directive_args(args_str: &str) -> Option<DirectiveOverrides> {
    let mut overrides = DirectiveOverrides::default();
    let tokens: Vec<&str> = args_str.split_whitespace().collect();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            "-i" | "--indent" => {
                i += 1;
                if i < tokens.len() {
                    overrides.indent = tokens[i].parse().ok();
                }
            }
            "--no-indent" => overrides.impose_indent = Some(false),
            "--enable-indent" => overrides.impose_indent = Some(true),
            "--no-case" => overrides.impose_case = Some(false),
            "--enable-case" => overrides.impose_case = Some(true),
            "--no-whitespace" => overrides.impose_whitespace = Some(false),
            "--enable-whitespace" => overrides.impose_whitespace = Some(true),
            "--no-blank-lines" => overrides.blank_lines = Some(false),
            "--enable-blank-lines" => overrides.blank_lines = Some(true),
            _ => {
                // Unknown option, skip
            }
        }
        i += 1;
    }

    if overrides.is_empty() {
        None
    } else {
        Some(overrides)
    }
}

/// Scan input for aspfmt directives and return the first found
///
/// Only the first directive line counts, even when it sets nothing usable.
pub fn find_directive<R: BufRead>(input: &mut R) -> Option<Directive> {
    let mut buffer = String::new();

    while input.read_line(&mut buffer).ok()? > 0 {
        if is_directive_line(&buffer) {
            return parse_directive(&buffer);
        }
        buffer.clear();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_directive_line() {
        assert!(is_directive_line("' aspfmt: --indent 2"));
        assert!(is_directive_line("    'aspfmt: --no-case"));
        assert!(is_directive_line("<% ' ASPFMT: off %>"));
        assert!(!is_directive_line("' regular comment"));
        assert!(!is_directive_line("x = 1 ' aspfmt: off"));
    }

    #[test]
    fn test_parse_directive_indent() {
        let Some(Directive::Overrides(overrides)) = parse_directive("' aspfmt: -i 2") else {
            panic!("expected overrides");
        };
        assert_eq!(overrides.indent, Some(2));
    }

    #[test]
    fn test_parse_directive_multiple() {
        let Some(Directive::Overrides(overrides)) =
            parse_directive("<% ' aspfmt: --indent 3 --no-case --no-blank-lines %>")
        else {
            panic!("expected overrides");
        };
        assert_eq!(overrides.indent, Some(3));
        assert_eq!(overrides.impose_case, Some(false));
        assert_eq!(overrides.blank_lines, Some(false));
        assert_eq!(overrides.impose_whitespace, None);
    }

    #[test]
    fn test_parse_directive_toggles() {
        let Some(Directive::Overrides(overrides)) =
            parse_directive("' aspfmt: --no-indent --enable-whitespace")
        else {
            panic!("expected overrides");
        };
        assert_eq!(overrides.impose_indent, Some(false));
        assert_eq!(overrides.impose_whitespace, Some(true));
    }

    #[test]
    fn test_parse_directive_off() {
        assert_eq!(parse_directive("' aspfmt: off"), Some(Directive::Off));
        assert_eq!(parse_directive("<%' aspfmt: OFF%>"), Some(Directive::Off));
    }

    #[test]
    fn test_parse_invalid_directive() {
        assert!(parse_directive("' aspfmt:").is_none());
        assert!(parse_directive("' aspfmt: --bogus").is_none());
    }

    #[test]
    fn test_find_first_directive() {
        let text = "<html>\n<%\n' aspfmt: --indent 2\n' aspfmt: off\n%>\n";
        let Some(Directive::Overrides(overrides)) = find_directive(&mut text.as_bytes()) else {
            panic!("expected overrides");
        };
        assert_eq!(overrides.indent, Some(2));
        assert!(find_directive(&mut "<p>no directive</p>".as_bytes()).is_none());
    }
}
