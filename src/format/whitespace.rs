//! Operator spacing for VBScript statements
//!
//! Works on masked code (literals already replaced by placeholders, comment
//! split off). The line is scanned into tokens and re-emitted:
//! - operators from the spaced set get exactly one space on each side
//! - keyword operators (`And`, `Mod`, ...) are treated the same way
//! - unary `+`/`-` keep the space before them and lose the one after
//! - every other run of whitespace collapses to a single space

use crate::parser::literals::{PLACEHOLDER_CLOSE, PLACEHOLDER_OPEN};
use crate::spec::builtin::UNARY_CONTEXT_KEYWORDS;
use crate::spec::CanonicalCaseTable;

/// Every operator symbol, two-character forms first
const OPERATORS: &[&str] = &[
    "<>", "<=", ">=", "=", "<", ">", "+", "-", "*", "/", "\\", "^", "&",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Number,
    Op,
    Open,
    Close,
    Comma,
    Colon,
    Dot,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    /// Whitespace preceded the token in the source
    spaced: bool,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte length of a word starting at the beginning of `rest`
fn word_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(rest.len(), |(i, _)| i)
}

/// Byte length of a decimal number, with optional fraction and exponent
fn number_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let digits = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };
    let mut pos = digits(0);
    if bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        pos = digits(pos + 1);
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            pos = digits(exp);
        }
    }
    pos
}

/// Byte length of an `&H..` / `&O..` literal, if `rest` starts with one
///
/// A radix prefix followed by further word characters is a concatenation
/// with an identifier instead (`a &Hello`).
fn radix_literal_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let is_digit: fn(&u8) -> bool = match bytes.get(1) {
        Some(b'h' | b'H') => u8::is_ascii_hexdigit,
        Some(b'o' | b'O') => |b: &u8| (b'0'..=b'7').contains(b),
        _ => return None,
    };
    let mut pos = 2;
    while pos < bytes.len() && is_digit(&bytes[pos]) {
        pos += 1;
    }
    if pos == 2 {
        return None;
    }
    if bytes.get(pos) == Some(&b'&') {
        pos += 1;
    }
    match rest[pos..].chars().next() {
        Some(c) if is_word_char(c) => None,
        _ => Some(pos),
    }
}

fn tokenize(code: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut spaced = false;

    while pos < code.len() {
        let rest = &code[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };
        if c.is_whitespace() {
            spaced = true;
            pos += c.len_utf8();
            continue;
        }

        let (kind, len) = if c == PLACEHOLDER_OPEN {
            let len = rest
                .find(PLACEHOLDER_CLOSE)
                .map_or(rest.len(), |i| i + PLACEHOLDER_CLOSE.len_utf8());
            (TokenKind::Word, len)
        } else if c == '[' {
            let len = rest.find(']').map_or(rest.len(), |i| i + 1);
            (TokenKind::Word, len)
        } else if c.is_ascii_digit()
            || (c == '.' && rest[1..].starts_with(|d: char| d.is_ascii_digit()))
        {
            let len = if c == '.' { 1 + number_len(&rest[1..]) } else { number_len(rest) };
            (TokenKind::Number, len)
        } else if is_word_char(c) {
            (TokenKind::Word, word_len(rest))
        } else if let Some(len) = (c == '&').then(|| radix_literal_len(rest)).flatten() {
            (TokenKind::Number, len)
        } else if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            (TokenKind::Op, op.len())
        } else {
            let kind = match c {
                '(' => TokenKind::Open,
                ')' => TokenKind::Close,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                '.' => TokenKind::Dot,
                _ => TokenKind::Other,
            };
            (kind, c.len_utf8())
        };

        tokens.push(Token {
            kind,
            text: &rest[..len],
            spaced,
        });
        spaced = false;
        pos += len;
    }
    tokens
}

/// Whether a `+`/`-` after `prev` is a sign rather than a binary operator
fn is_unary_position(prev: Option<&Token<'_>>) -> bool {
    match prev {
        None => true,
        Some(t) => match t.kind {
            TokenKind::Op | TokenKind::Open | TokenKind::Comma | TokenKind::Colon => true,
            TokenKind::Word => {
                let lower = t.text.to_lowercase();
                UNARY_CONTEXT_KEYWORDS.contains(&lower.as_str())
            }
            _ => false,
        },
    }
}

/// Normalize operator spacing on one masked statement line
#[must_use]
pub fn space_operators(code: &str, table: &CanonicalCaseTable) -> String {
    let spaced_ops = table.spaced_operators();
    let tokens = tokenize(code);
    let mut out = String::with_capacity(code.len() + 8);
    let mut prev: Option<&Token<'_>> = None;
    // Spacing demanded by the previous token for whatever follows it
    let mut after: Option<bool> = None;

    for (pos, token) in tokens.iter().enumerate() {
        // Spacing before a final `_` decides whether the line continues
        if pos + 1 == tokens.len() && token.text == "_" {
            if token.spaced && !out.is_empty() {
                out.push(' ');
            }
            out.push('_');
            break;
        }

        let unary = token.kind == TokenKind::Op
            && matches!(token.text, "+" | "-")
            && is_unary_position(prev);
        let spaced_op = !unary
            && match token.kind {
                TokenKind::Op => spaced_ops.contains(&token.text),
                TokenKind::Word => {
                    table.is_spaced_keyword(token.text)
                        && !prev.is_some_and(|p| p.kind == TokenKind::Dot)
                }
                _ => false,
            };

        let before = if spaced_op {
            Some(!matches!(prev, None | Some(Token { kind: TokenKind::Open, .. })))
        } else {
            None
        };
        let space = before.or(after).unwrap_or(token.spaced);
        if space && !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token.text);

        after = if spaced_op {
            Some(true)
        } else if unary {
            Some(false)
        } else {
            None
        };
        prev = Some(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecRegistry;
    use pretty_assertions::assert_eq;

    fn fallback(code: &str) -> String {
        space_operators(code, &CanonicalCaseTable::builtin())
    }

    fn bundled(code: &str) -> String {
        space_operators(code, &SpecRegistry::bundled().table())
    }

    #[test]
    fn test_comparison_spacing() {
        assert_eq!(fallback("x=1"), "x = 1");
        assert_eq!(fallback("If a<>b Then"), "If a <> b Then");
        assert_eq!(fallback("If a<=b And c>=d Then"), "If a <= b And c >= d Then");
        assert_eq!(fallback("x   =    1"), "x = 1");
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(fallback("s = a&b&c"), "s = a & b & c");
        assert_eq!(fallback("& \u{E000}0\u{E001}"), "& \u{E000}0\u{E001}");
    }

    #[test]
    fn test_arithmetic_follows_table() {
        assert_eq!(fallback("y = a-b"), "y = a-b");
        assert_eq!(bundled("y = a-b*c"), "y = a - b * c");
        assert_eq!(bundled("y = (a+b)/2"), "y = (a + b) / 2");
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(bundled("x = - 1"), "x = -1");
        assert_eq!(bundled("x = -a"), "x = -a");
        assert_eq!(bundled("f(-1, - 2)"), "f(-1, -2)");
        assert_eq!(bundled("For i = 10 To 1 Step - 1"), "For i = 10 To 1 Step -1");
        assert_eq!(bundled("x = a * -b"), "x = a * -b");
        assert_eq!(bundled("-x"), "-x");
    }

    #[test]
    fn test_numbers_keep_exponent_and_radix() {
        assert_eq!(bundled("x = 1e-5"), "x = 1e-5");
        assert_eq!(bundled("x = .5+1"), "x = .5 + 1");
        assert_eq!(fallback("c = &H1F"), "c = &H1F");
        assert_eq!(fallback("c=&O17"), "c = &O17");
        assert_eq!(fallback("s = a &Hello"), "s = a & Hello");
    }

    #[test]
    fn test_keyword_operators() {
        let table = SpecRegistry::bundled().table();
        assert_eq!(space_operators("r = a  Mod  b", &table), "r = a Mod b");
        assert_eq!(space_operators("If x Is Nothing Then", &table), "If x Is Nothing Then");
        assert_eq!(space_operators("If (Not x) Then", &table), "If (Not x) Then");
        assert_eq!(space_operators("y = obj.And", &table), "y = obj.And");
    }

    #[test]
    fn test_no_space_after_open_paren() {
        assert_eq!(fallback("f( =x)"), "f(= x)");
    }

    #[test]
    fn test_other_punctuation_preserved() {
        assert_eq!(fallback("Call Foo(a,b)"), "Call Foo(a,b)");
        assert_eq!(fallback("Response.Write x"), "Response.Write x");
        assert_eq!(fallback("x = 1 + _"), "x = 1 + _");
        assert_eq!(bundled("x = a &_"), "x = a &_");
        assert_eq!(bundled("x = a&  _"), "x = a & _");
        assert_eq!(fallback("a = arr(1):b = 2"), "a = arr(1):b = 2");
    }

    #[test]
    fn test_bracketed_identifier() {
        assert_eq!(fallback("[my var]=1"), "[my var] = 1");
    }

    #[test]
    fn test_idempotent() {
        for code in ["x=a<>b&c", "y = a-b*-c", "If a>=1 And b<2 Then"] {
            let once = bundled(code);
            assert_eq!(bundled(&once), once);
        }
    }
}
