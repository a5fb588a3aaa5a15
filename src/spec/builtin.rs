//! Minimal case table used when no other table can be loaded.

/// Operator symbols spaced when the table does not name any
pub const FALLBACK_SPACED_OPERATORS: &[&str] = &["<>", "<=", ">=", "=", "<", ">", "&"];

/// Keywords that leave a following `+`/`-` in unary position
pub const UNARY_CONTEXT_KEYWORDS: &[&str] = &[
    "to", "step", "then", "else", "case", "until", "while", "return", "in", "and", "or", "not",
    "xor", "eqv", "imp", "mod", "is",
];

/// Lower-case keyword -> canonical spelling
pub const BUILTIN_CASE_MAP: &[(&str, &str)] = &[
    // declarations
    ("dim", "Dim"),
    ("set", "Set"),
    ("const", "Const"),
    ("redim", "ReDim"),
    ("preserve", "Preserve"),
    ("public", "Public"),
    ("private", "Private"),
    ("class", "Class"),
    ("end class", "End Class"),
    ("option", "Option"),
    ("explicit", "Explicit"),
    // procedures
    ("function", "Function"),
    ("sub", "Sub"),
    ("property", "Property"),
    ("end function", "End Function"),
    ("end sub", "End Sub"),
    ("end property", "End Property"),
    ("call", "Call"),
    ("exit", "Exit"),
    // conditions
    ("if", "If"),
    ("then", "Then"),
    ("else", "Else"),
    ("elseif", "ElseIf"),
    ("end if", "End If"),
    ("end", "End"),
    ("select", "Select"),
    ("case", "Case"),
    ("end select", "End Select"),
    // loops
    ("for", "For"),
    ("each", "Each"),
    ("in", "In"),
    ("to", "To"),
    ("step", "Step"),
    ("next", "Next"),
    ("while", "While"),
    ("wend", "Wend"),
    ("do", "Do"),
    ("loop", "Loop"),
    ("until", "Until"),
    // error handling
    ("on error resume next", "On Error Resume Next"),
    ("on error goto", "On Error GoTo"),
    ("on", "On"),
    ("resume", "Resume"),
    ("err", "Err"),
    // operators and literals
    ("and", "And"),
    ("or", "Or"),
    ("not", "Not"),
    ("xor", "Xor"),
    ("eqv", "Eqv"),
    ("imp", "Imp"),
    ("mod", "Mod"),
    ("is", "Is"),
    ("empty", "Empty"),
    ("nothing", "Nothing"),
    ("null", "Null"),
    ("true", "True"),
    ("false", "False"),
    // ASP objects
    ("response", "Response"),
    ("request", "Request"),
    ("server", "Server"),
    ("session", "Session"),
    ("application", "Application"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_are_lower_case() {
        for (key, canonical) in BUILTIN_CASE_MAP {
            assert_eq!(*key, key.to_lowercase());
            assert_eq!(key.to_lowercase(), canonical.to_lowercase());
        }
    }

    #[test]
    fn test_unary_context_lower_case() {
        assert!(UNARY_CONTEXT_KEYWORDS
            .iter()
            .all(|k| *k == k.to_lowercase()));
    }
}
