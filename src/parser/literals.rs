//! Literal masking for VBScript lines
//!
//! String literals (`"..."`, with `""` as an escaped quote) and date
//! literals (`#1/1/2000#`) are replaced by opaque placeholders so that
//! keyword and operator rewriting never touches their contents. A trailing
//! `'` comment, or a `Rem` comment after a `:` separator, outside any
//! literal is split off and kept verbatim.
//!
//! Placeholders use private-use code points, which never occur in real
//! source. A line that already contains them is rejected.
use std::fmt::Write as _;

use crate::error::{Stage, StageError};
use crate::limits::{IterationBudget, LimitKind};

/// Opening character of a literal placeholder
pub const PLACEHOLDER_OPEN: char = '\u{E000}';
/// Closing character of a literal placeholder
pub const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// A line split into masked code, protected literals and trailing comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedLine {
    /// Code with every literal replaced by a placeholder
    pub code: String,
    /// Trailing comment including its leading `'` or `Rem`
    pub comment: Option<String>,
    literals: Vec<String>,
}

impl MaskedLine {
    /// Number of protected literals
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// Put the protected literals back into (possibly rewritten) masked code
    pub fn restore(&self, code: &str, max_steps: usize) -> Result<String, StageError> {
        let mut out = String::with_capacity(code.len() + 16);
        let mut budget = IterationBudget::new(max_steps);
        let mut rest = code;

        while let Some(open) = rest.find(PLACEHOLDER_OPEN) {
            if !budget.tick() {
                return Err(StageError::LimitExceeded {
                    stage: Stage::Normalize,
                    limit: LimitKind::LoopIterations,
                    value: budget.spent(),
                });
            }
            out.push_str(&rest[..open]);
            let after = &rest[open + PLACEHOLDER_OPEN.len_utf8()..];
            let close = after
                .find(PLACEHOLDER_CLOSE)
                .ok_or_else(|| unsafe_input("unclosed placeholder"))?;
            let literal = after[..close]
                .parse::<usize>()
                .ok()
                .and_then(|idx| self.literals.get(idx))
                .ok_or_else(|| unsafe_input("unknown placeholder"))?;
            out.push_str(literal);
            rest = &after[close + PLACEHOLDER_CLOSE.len_utf8()..];
        }
        out.push_str(rest);

        if out.contains(PLACEHOLDER_CLOSE) {
            return Err(unsafe_input("stray placeholder"));
        }
        Ok(out)
    }
}

fn unsafe_input(reason: &str) -> StageError {
    StageError::UnsafeInput {
        stage: Stage::Normalize,
        reason: reason.to_string(),
    }
}

/// Characters allowed between the `#` delimiters of a date literal
fn is_date_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | ':' | '.' | ',' | ' ')
}

/// Length in bytes of a date literal starting at `#`, if one is present
fn date_literal_len(text: &str) -> Option<usize> {
    let body = &text[1..];
    let close = body.find('#')?;
    let inner = &body[..close];
    if inner.trim().is_empty() || !inner.chars().all(is_date_char) {
        return None;
    }
    if !inner.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(close + 2)
}

/// Length in bytes of a string literal starting at `"`
///
/// An unterminated string runs to the end of the line.
fn string_literal_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut pos = 1;
    while pos < bytes.len() {
        if bytes[pos] == b'"' {
            if bytes.get(pos + 1) == Some(&b'"') {
                pos += 2;
                continue;
            }
            return pos + 1;
        }
        pos += 1;
    }
    bytes.len()
}

/// Offset of a `Rem` comment following the `:` at the start of `rest`
fn rem_after_separator(rest: &str) -> Option<usize> {
    let after = &rest[1..];
    let body = after.trim_start();
    let word = body.get(..3)?;
    if !word.eq_ignore_ascii_case("rem") {
        return None;
    }
    let boundary = body[3..]
        .chars()
        .next()
        .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
    boundary.then(|| 1 + after.len() - body.len())
}

/// Mask literals and split off the trailing comment of one line
pub fn mask_literals(line: &str) -> Result<MaskedLine, StageError> {
    if line.contains(PLACEHOLDER_OPEN) || line.contains(PLACEHOLDER_CLOSE) {
        return Err(unsafe_input("reserved placeholder character"));
    }

    let mut code = String::with_capacity(line.len());
    let mut literals = Vec::new();
    let mut comment = None;
    let mut pos = 0;

    while pos < line.len() {
        let rest = &line[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };
        let literal_len = match c {
            '"' => Some(string_literal_len(rest)),
            '#' => date_literal_len(rest),
            '\'' => {
                comment = Some(rest.to_string());
                break;
            }
            ':' => {
                if let Some(offset) = rem_after_separator(rest) {
                    code.push(':');
                    comment = Some(rest[offset..].to_string());
                    break;
                }
                None
            }
            _ => None,
        };
        match literal_len {
            Some(len) => {
                let _ = write!(code, "{PLACEHOLDER_OPEN}{}{PLACEHOLDER_CLOSE}", literals.len());
                literals.push(rest[..len].to_string());
                pos += len;
            }
            None => {
                code.push(c);
                pos += c.len_utf8();
            }
        }
    }

    Ok(MaskedLine {
        code,
        comment,
        literals,
    })
}

/// Code portion of a line with literals masked and the comment removed
///
/// Used for structural classification, where literal contents are irrelevant.
/// Lines that cannot be masked are classified as-is.
#[must_use]
pub fn classification_code(line: &str) -> String {
    match mask_literals(line) {
        Ok(masked) => masked.code.trim().to_string(),
        Err(_) => line.trim().to_string(),
    }
}

/// Split masked code into `:`-separated statements
#[must_use]
pub fn split_statements(code: &str) -> Vec<&str> {
    code.split(':').map(str::trim).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        let masked = mask_literals(r#"Response.Write "if then end if""#).unwrap();
        assert_eq!(masked.code, "Response.Write \u{E000}0\u{E001}");
        assert_eq!(masked.literal_count(), 1);
        assert!(masked.comment.is_none());
    }

    #[test]
    fn test_escaped_quotes_stay_inside_literal() {
        let masked = mask_literals(r#"x = "say ""hi"" ' not a comment""#).unwrap();
        assert_eq!(masked.code, "x = \u{E000}0\u{E001}");
        assert!(masked.comment.is_none());
    }

    #[test]
    fn test_trailing_comment_split() {
        let masked = mask_literals(r#"x = "a'b" ' real comment"#).unwrap();
        assert_eq!(masked.code, "x = \u{E000}0\u{E001} ");
        assert_eq!(masked.comment.as_deref(), Some("' real comment"));
    }

    #[test]
    fn test_rem_after_separator_split() {
        let masked = mask_literals("x=1 : rem if a=b then").unwrap();
        assert_eq!(masked.code, "x=1 :");
        assert_eq!(masked.comment.as_deref(), Some("rem if a=b then"));

        let tight = mask_literals("x = 1:Rem").unwrap();
        assert_eq!(tight.code, "x = 1:");
        assert_eq!(tight.comment.as_deref(), Some("Rem"));
    }

    #[test]
    fn test_rem_prefix_word_is_code() {
        let masked = mask_literals("x = 1 : remove = 2").unwrap();
        assert_eq!(masked.code, "x = 1 : remove = 2");
        assert!(masked.comment.is_none());

        let quoted = mask_literals(r#"s = ": rem" : y = 2"#).unwrap();
        assert_eq!(quoted.code, "s = \u{E000}0\u{E001} : y = 2");
        assert!(quoted.comment.is_none());
    }

    #[test]
    fn test_rem_comment_ignored_for_classification() {
        assert_eq!(classification_code("x = 1 : Rem If a Then"), "x = 1 :");
    }

    #[test]
    fn test_date_literal() {
        let masked = mask_literals("d = #1/15/2024# + 1").unwrap();
        assert_eq!(masked.code, "d = \u{E000}0\u{E001} + 1");
        let plain = mask_literals("x = a # b").unwrap();
        assert_eq!(plain.code, "x = a # b");
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let masked = mask_literals(r#"x = "open ' still string"#).unwrap();
        assert_eq!(masked.code, "x = \u{E000}0\u{E001}");
        assert!(masked.comment.is_none());
    }

    #[test]
    fn test_restore_round_trip() {
        let line = r#"If a = "x" Then b = #1/1/2000#"#;
        let masked = mask_literals(line).unwrap();
        let restored = masked.restore(&masked.code, 1000).unwrap();
        assert_eq!(restored, line);
    }

    #[test]
    fn test_restore_rejects_unknown_placeholder() {
        let masked = mask_literals("x = 1").unwrap();
        assert!(masked.restore("x = \u{E000}7\u{E001}", 1000).is_err());
    }

    #[test]
    fn test_reserved_character_rejected() {
        assert!(mask_literals("x = \u{E000}").is_err());
    }

    #[test]
    fn test_classification_code() {
        assert_eq!(classification_code("  If x Then ' check  "), "If x Then");
        assert_eq!(
            classification_code(r#"s = "end if""#),
            "s = \u{E000}0\u{E001}"
        );
    }

    #[test]
    fn test_split_statements() {
        assert_eq!(
            split_statements("For i = 1 To 3: s = s + i: Next"),
            vec!["For i = 1 To 3", "s = s + i", "Next"]
        );
        assert!(split_statements("  ").is_empty());
    }
}
