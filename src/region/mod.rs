//! Script region detection.
//!
//! An ASP document is HTML with VBScript embedded between `<%` and `%>`
//! markers. Everything outside a region is markup and is never modified.

pub mod detector;

pub use detector::{
    contains_script, detect_regions, is_in_script_region, is_line_in_script_region,
    line_statistics, region_at, LineStatistics, RegionSpan, CLOSE_MARKER, OPEN_MARKER,
};
