//! Regex patterns for VBScript block structure
//!
//! All patterns are compiled once at startup using `LazyLock`.
//!
//! All regexes use case-insensitive + unicode flags and are applied to a
//! single trimmed statement with string literals masked and any trailing
//! comment removed.
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a case-insensitive regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this module are compile-time constants that are verified by tests.
/// The panic occurs at first access of the `LazyLock` static.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// Optional access modifier in front of procedure declarations
const ACCESS_STR: &str = r"^(?:(?:public(?:\s+default)?|private)\s+)?";

// ===== BLOCK STARTS =====

// IF only opens a block when THEN ends the statement
pub static IF_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^if\b.+\bthen\s*$"));
pub static ELSEIF_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(?:elseif|else\s+if)\b"));
pub static ELSE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^else(?:\s|:|$)"));

pub static FOR_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^for\s+\S"));
pub static WHILE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^while\b"));
pub static DO_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^do(?:\s+(?:while|until)\b.*)?\s*$"));

pub static FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{ACCESS_STR}function\s+\w")));
pub static SUB_RE: LazyLock<Regex> = LazyLock::new(|| build_re(&format!(r"{ACCESS_STR}sub\s+\w")));
pub static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{ACCESS_STR}property\s+(?:get|let|set)\s+\w")));

pub static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^select\s+case\b"));
pub static CASE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^case\b"));

pub static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^class\s+\w"));

// ===== BLOCK ENDS =====

pub static END_IF_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end\s+if\b"));
pub static NEXT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^next\b"));
pub static WEND_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^wend\b"));
pub static LOOP_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^loop\b"));
pub static END_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end\s+function\b"));
pub static END_SUB_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end\s+sub\b"));
pub static END_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end\s+property\b"));
pub static END_SELECT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end\s+select\b"));
pub static END_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^end\s+class\b"));

// ===== COMMENTS AND CONTINUATION =====

// Whole-line comment: apostrophe or REM statement
pub static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^(?:'|rem(?:\s|$))"));

// Trailing ` _` joins the next physical line
pub static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"(?:^|\s)_$"));

// Bare open marker, optionally followed by whitespace only
pub static BARE_OPEN_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^<%\s*$"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_if_block_requires_trailing_then() {
        assert!(IF_BLOCK_RE.is_match("if x then"));
        assert!(IF_BLOCK_RE.is_match("If (a = 1) And b Then"));
        assert!(IF_BLOCK_RE.is_match("IF x THEN  "));
        assert!(!IF_BLOCK_RE.is_match("if x then y = 1"));
        assert!(!IF_BLOCK_RE.is_match("if x"));
        assert!(!IF_BLOCK_RE.is_match("ifx then"));
    }

    #[test]
    fn test_else_variants() {
        assert!(ELSEIF_RE.is_match("ElseIf b Then"));
        assert!(ELSEIF_RE.is_match("else if b then"));
        assert!(ELSE_RE.is_match("Else"));
        assert!(ELSE_RE.is_match("else: x = 1"));
        assert!(!ELSE_RE.is_match("elseif b then"));
        assert!(!ELSE_RE.is_match("elsewhere = 1"));
    }

    #[test]
    fn test_loop_starts() {
        assert!(FOR_RE.is_match("For i = 1 To 10"));
        assert!(FOR_RE.is_match("for each item in list"));
        assert!(!FOR_RE.is_match("format = 1"));
        assert!(WHILE_RE.is_match("While x < 3"));
        assert!(!WHILE_RE.is_match("whilst = 3"));
        assert!(DO_RE.is_match("Do"));
        assert!(DO_RE.is_match("do while x"));
        assert!(DO_RE.is_match("Do Until rs.EOF"));
        assert!(!DO_RE.is_match("DoSomething"));
        assert!(!DO_RE.is_match("document.write 1"));
    }

    #[test]
    fn test_procedure_starts_with_modifiers() {
        assert!(FUNCTION_RE.is_match("Function Foo()"));
        assert!(FUNCTION_RE.is_match("public function foo(a)"));
        assert!(FUNCTION_RE.is_match("Public Default Function Item(i)"));
        assert!(SUB_RE.is_match("Private Sub Init"));
        assert!(!SUB_RE.is_match("Submit = 1"));
        assert!(PROPERTY_RE.is_match("Public Property Get Name"));
        assert!(PROPERTY_RE.is_match("property let value(v)"));
        assert!(!FUNCTION_RE.is_match("end function"));
    }

    #[test]
    fn test_select_and_case() {
        assert!(SELECT_RE.is_match("Select Case v"));
        assert!(CASE_RE.is_match("Case 1, 2"));
        assert!(CASE_RE.is_match("case else"));
        assert!(!CASE_RE.is_match("select case v"));
        assert!(!CASE_RE.is_match("case_id = 1"));
    }

    #[test]
    fn test_block_ends() {
        assert!(END_IF_RE.is_match("End If"));
        assert!(END_IF_RE.is_match("end   if"));
        assert!(NEXT_RE.is_match("Next"));
        assert!(NEXT_RE.is_match("next i"));
        assert!(!NEXT_RE.is_match("next_page = 2"));
        assert!(LOOP_RE.is_match("Loop Until x > 3"));
        assert!(WEND_RE.is_match("wend"));
        assert!(END_FUNCTION_RE.is_match("End Function"));
        assert!(END_SUB_RE.is_match("end sub"));
        assert!(END_PROPERTY_RE.is_match("End Property"));
        assert!(END_SELECT_RE.is_match("End Select"));
        assert!(END_CLASS_RE.is_match("End Class"));
    }

    #[test]
    fn test_comment_and_continuation() {
        assert!(COMMENT_RE.is_match("' note"));
        assert!(COMMENT_RE.is_match("Rem note"));
        assert!(COMMENT_RE.is_match("rem"));
        assert!(!COMMENT_RE.is_match("remaining = 1"));
        assert!(CONTINUATION_RE.is_match("x = a & _"));
        assert!(!CONTINUATION_RE.is_match("x = my_"));
        assert!(BARE_OPEN_MARKER_RE.is_match("<%"));
        assert!(!BARE_OPEN_MARKER_RE.is_match("<% x = 1"));
    }
}
