//! Canonical casing and spacing for VBScript statements
//!
//! Rewrites keywords, built-in functions and intrinsic object members to the
//! spelling listed in the case table, then normalizes operator spacing.
//! String and date literals are masked first and the trailing comment is
//! carried over verbatim, so neither is ever touched.

use std::borrow::Cow;

use regex::Captures;

use crate::error::{Stage, StageError};
use crate::format::whitespace::space_operators;
use crate::limits::{LimitKind, SafetyLimits};
use crate::parser::literals::mask_literals;
use crate::spec::CanonicalCaseTable;

/// Which rewrites the normalizer applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub impose_case: bool,
    pub impose_whitespace: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            impose_case: true,
            impose_whitespace: true,
        }
    }
}

/// Whether the match starting at `start` is a member access (`x.Next`)
fn follows_dot(code: &str, start: usize) -> bool {
    code[..start].trim_end().ends_with('.')
}

/// Rewrite every case-map word or phrase to its canonical spelling
///
/// Words reached through `.` are members, not keywords, and are left alone.
#[must_use]
pub fn rewrite_keywords<'a>(code: &'a str, table: &CanonicalCaseTable) -> Cow<'a, str> {
    let Some(re) = table.keyword_pattern() else {
        return Cow::Borrowed(code);
    };
    re.replace_all(code, |caps: &Captures<'_>| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        if follows_dot(code, m.start()) {
            return m.as_str().to_string();
        }
        table
            .canonical(m.as_str())
            .map_or_else(|| m.as_str().to_string(), str::to_string)
    })
}

/// Rewrite `object . member` on intrinsic objects to `Object.Member`
#[must_use]
pub fn rewrite_members<'a>(code: &'a str, table: &CanonicalCaseTable) -> Cow<'a, str> {
    let Some(re) = table.object_pattern() else {
        return Cow::Borrowed(code);
    };
    re.replace_all(code, |caps: &Captures<'_>| {
        let object = &caps[1];
        let member = &caps[2];
        let object = table.canonical(object).unwrap_or(object);
        let member = table.canonical_member(object, member).unwrap_or(member);
        format!("{object}.{member}")
    })
}

/// Per-line case and whitespace normalizer
pub struct CaseNormalizer<'a> {
    table: &'a CanonicalCaseTable,
    options: NormalizeOptions,
    limits: SafetyLimits,
}

impl<'a> CaseNormalizer<'a> {
    #[must_use]
    pub fn new(table: &'a CanonicalCaseTable, limits: SafetyLimits) -> Self {
        Self::with_options(table, NormalizeOptions::default(), limits)
    }

    #[must_use]
    pub fn with_options(
        table: &'a CanonicalCaseTable,
        options: NormalizeOptions,
        limits: SafetyLimits,
    ) -> Self {
        Self {
            table,
            options,
            limits,
        }
    }

    /// Normalize one script statement line
    ///
    /// The result is trimmed. A trailing comment is separated from the code
    /// by exactly one space.
    ///
    /// # Errors
    ///
    /// Fails when the line is longer than the token-length ceiling, contains
    /// reserved placeholder characters, or its literals cannot be restored.
    pub fn normalize(&self, line: &str) -> Result<String, StageError> {
        let line = line.trim();
        if self.limits.exceeds(LimitKind::TokenLength, line.len()) {
            return Err(StageError::LimitExceeded {
                stage: Stage::Normalize,
                limit: LimitKind::TokenLength,
                value: line.len(),
            });
        }

        let masked = mask_literals(line)?;
        let mut code = masked.code.trim().to_string();

        if self.options.impose_case {
            code = rewrite_members(&code, self.table).into_owned();
            code = rewrite_keywords(&code, self.table).into_owned();
        }
        if self.options.impose_whitespace {
            code = space_operators(&code, self.table);
        }

        let code = masked.restore(&code, self.limits.max_loop_iterations)?;
        let out = match masked.comment {
            Some(comment) if code.is_empty() => comment,
            Some(comment) => format!("{code} {comment}"),
            None => code,
        };
        Ok(out.trim_end().to_string())
    }
}
