//! Error types, result aliases and diagnostics for aspfmt.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used by the CLI, config and I/O layers
//! - [`StageError`]: Typed failure of a single formatting stage
//! - [`Diagnostic`]: A warning collected during formatting and returned to the caller
//!
//! Formatting stages never propagate failures to the caller. They return a
//! [`StageError`] and the pipeline falls back to the original input for the
//! affected line or document, recording a [`Diagnostic`] instead.

use std::fmt;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

use crate::limits::LimitKind;

pub type Result<T> = AnyhowResult<T>;

/// Pipeline stage that produced an error or diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Split,
    Regions,
    Structure,
    Indent,
    Normalize,
    BlankLines,
    Join,
    SpecTable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Split => "split",
            Stage::Regions => "regions",
            Stage::Structure => "structure",
            Stage::Indent => "indent",
            Stage::Normalize => "normalize",
            Stage::BlankLines => "blank-lines",
            Stage::Join => "join",
            Stage::SpecTable => "spec-table",
        };
        write!(f, "{name}")
    }
}

/// Failure of one stage on one unit of work (a line or the whole document)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// A safety ceiling was hit
    #[error("Safety limit reached in {stage} - {limit}: {value}")]
    LimitExceeded {
        stage: Stage,
        limit: LimitKind,
        value: usize,
    },

    /// Input cannot be processed without risking content corruption
    #[error("Unsafe input in {stage}: {reason}")]
    UnsafeInput { stage: Stage, reason: String },

    /// The canonical case table could not be loaded
    #[error("Spec table unavailable: {reason}")]
    SpecTable { reason: String },

    /// A pattern derived from the spec table failed to compile
    #[error("Invalid pattern in {stage}: {reason}")]
    Pattern { stage: Stage, reason: String },
}

impl StageError {
    /// Stage that produced this error
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            StageError::LimitExceeded { stage, .. }
            | StageError::UnsafeInput { stage, .. }
            | StageError::Pattern { stage, .. } => *stage,
            StageError::SpecTable { .. } => Stage::SpecTable,
        }
    }
}

/// Classification of a [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A safety ceiling was hit and processing degraded
    LimitReached,
    /// The spec table fell back to the built-in minimal table
    SpecFallback,
    /// A stage failed and its unit of work was echoed unchanged
    StageFailure,
}

/// A warning produced while formatting a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number, if the warning concerns a single line
    pub line_number: Option<usize>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(line_number: Option<usize>, kind: DiagnosticKind, message: String) -> Self {
        Self {
            line_number,
            kind,
            message,
        }
    }

    /// Build a diagnostic from a stage error, classifying it by variant
    #[must_use]
    pub fn from_stage_error(line_number: Option<usize>, err: &StageError) -> Self {
        let kind = match err {
            StageError::LimitExceeded { .. } => DiagnosticKind::LimitReached,
            StageError::SpecTable { .. } => DiagnosticKind::SpecFallback,
            StageError::UnsafeInput { .. } | StageError::Pattern { .. } => {
                DiagnosticKind::StageFailure
            }
        };
        Self::new(line_number, kind, err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
