//! Document processing.
//!
//! This module orchestrates formatting of whole documents:
//! - [`pipeline`]: Runs region detection, structure analysis, indentation,
//!   blank-line planning and case normalization over one document
//! - [`cache`]: Memoizes structural analyses by document id and content hash
//! - [`service`]: The [`FormatService`] entry point that owns the case table
//!   registry and the cache, and contains every failure
//!
//! The main entry point is [`FormatService::format_document`].

pub mod cache;
pub mod pipeline;
pub mod service;

pub use cache::{content_hash, AnalysisCache};
pub use pipeline::{
    analyze_text, format_text, AnalysisResult, FormatOutput, HierarchyInfo, PositionInfo,
};
pub use service::FormatService;
