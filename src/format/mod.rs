//! VBScript line formatting.
//!
//! This module turns the structural classification of a document into output:
//! - [`indenter`]: Maps scope events to indent levels, resolves comment levels
//! - [`blank_lines`]: Plans the blank line above procedure declarations
//! - [`case_convert`]: Rewrites keywords and object members to canonical case
//! - [`whitespace`]: Normalizes spacing around operators

pub mod blank_lines;
pub mod case_convert;
pub mod indenter;
pub mod whitespace;

pub use blank_lines::plan_blank_lines;
pub use case_convert::{rewrite_keywords, rewrite_members, CaseNormalizer, NormalizeOptions};
pub use indenter::{materialize, IndentationEngine};
pub use whitespace::space_operators;
