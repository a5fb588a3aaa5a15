//! VBScript-in-HTML parsing utilities.
//!
//! This module provides the line model the formatter works on:
//! - [`document`]: Splits text into lines and assigns each to script or markup
//! - [`literals`]: Masks string and date literals and splits off trailing comments
//! - [`patterns`]: Precompiled regex patterns for VBScript block statements
//!
//! Line terminators are kept with each line so that markup can be emitted
//! byte-for-byte.

pub mod document;
pub mod literals;
pub mod patterns;

pub use document::{Document, Line, LineEnding, Ownership};
pub use literals::{classification_code, mask_literals, split_statements, MaskedLine};
