//! aspfmt - Formatter for Classic ASP pages
//!
//! Re-indents and normalizes the VBScript inside `<% ... %>` regions while
//! leaving the surrounding markup byte-for-byte untouched.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod format;
pub mod limits;
pub mod parser;
pub mod process;
pub mod region;
pub mod scope;
pub mod spec;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use directive::{find_directive, parse_directive, Directive, DirectiveOverrides};
pub use error::{Diagnostic, DiagnosticKind, Result, Stage, StageError};
pub use limits::SafetyLimits;
pub use process::{AnalysisResult, FormatOutput, FormatService, HierarchyInfo, PositionInfo};
pub use region::{detect_regions, is_in_script_region, RegionSpan};
pub use spec::{CanonicalCaseTable, SpecRegistry, SpecSource};
