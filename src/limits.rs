//! Safety ceilings that bound every structural walk.
//!
//! Exceeding a ceiling is never fatal: the stage that hit it degrades
//! (treats the remainder as flat or unformatted) and reports a warning.

use std::fmt;

use serde::{Deserialize, Serialize};

fn default_max_loop_iterations() -> usize {
    1000
}
fn default_max_lines() -> usize {
    10_000
}
fn default_max_token_length() -> usize {
    10_000
}
fn default_max_text_length() -> usize {
    1_000_000
}
fn default_max_nesting_depth() -> usize {
    500
}

/// Which ceiling was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitKind {
    LoopIterations,
    DocumentLines,
    TokenLength,
    TextLength,
    NestingDepth,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitKind::LoopIterations => "max loop iterations",
            LimitKind::DocumentLines => "max document lines",
            LimitKind::TokenLength => "max token length",
            LimitKind::TextLength => "max text length",
            LimitKind::NestingDepth => "max nesting depth",
        };
        write!(f, "{name}")
    }
}

/// Configurable safety ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyLimits {
    /// Upper bound on the steps of a single bounded scan
    #[serde(default = "default_max_loop_iterations")]
    pub max_loop_iterations: usize,

    /// Lines past this index are passed through verbatim
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Script lines longer than this (in bytes) are only re-indented
    #[serde(default = "default_max_token_length")]
    pub max_token_length: usize,

    /// Documents longer than this (in bytes) are echoed unchanged
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Block starts beyond this depth are treated as plain lines
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_loop_iterations: default_max_loop_iterations(),
            max_lines: default_max_lines(),
            max_token_length: default_max_token_length(),
            max_text_length: default_max_text_length(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

impl SafetyLimits {
    /// Ceiling value for a given kind
    #[must_use]
    pub fn ceiling(&self, kind: LimitKind) -> usize {
        match kind {
            LimitKind::LoopIterations => self.max_loop_iterations,
            LimitKind::DocumentLines => self.max_lines,
            LimitKind::TokenLength => self.max_token_length,
            LimitKind::TextLength => self.max_text_length,
            LimitKind::NestingDepth => self.max_nesting_depth,
        }
    }

    /// Check `value` against the ceiling for `kind`
    #[must_use]
    pub fn exceeds(&self, kind: LimitKind, value: usize) -> bool {
        value > self.ceiling(kind)
    }
}

/// Step counter for a single bounded loop
#[derive(Debug)]
pub struct IterationBudget {
    remaining: usize,
    spent: usize,
}

impl IterationBudget {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            spent: 0,
        }
    }

    /// Consume one step; returns false once the budget is exhausted
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.spent += 1;
        true
    }

    /// Steps consumed so far
    #[must_use]
    pub fn spent(&self) -> usize {
        self.spent
    }
}
