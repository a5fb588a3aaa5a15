//! `RegionDetector` - locates `<% ... %>` script regions in a document
//!
//! Regions do not nest: an open marker seen while already inside a region is
//! plain text, and a close marker seen outside a region is plain text. An
//! open marker without a matching close marker leaves the rest of the
//! document inside a region.

/// Script region open marker
pub const OPEN_MARKER: &str = "<%";
/// Script region close marker
pub const CLOSE_MARKER: &str = "%>";

/// A script region as a half-open byte range `[start, end)`
///
/// For a terminated region the range covers both markers. An unterminated
/// region ends at the end of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpan {
    pub start: usize,
    pub end: usize,
    pub terminated: bool,
}

impl RegionSpan {
    /// Check whether a byte offset lies inside this region
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check whether the byte range `[start, end)` overlaps this region
    #[must_use]
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && end > self.start
    }

    /// Byte range of the script interior (markers excluded)
    #[must_use]
    pub fn interior(&self) -> (usize, usize) {
        let start = self.start + OPEN_MARKER.len();
        let end = if self.terminated {
            self.end - CLOSE_MARKER.len()
        } else {
            self.end
        };
        (start, end.max(start))
    }
}

/// Line counts split by ownership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStatistics {
    pub script_lines: usize,
    pub markup_lines: usize,
    pub total_lines: usize,
}

/// Scan the document and return every script region in document order
///
/// A final region with no close marker is included with `terminated = false`.
#[must_use]
pub fn detect_regions(text: &str) -> Vec<RegionSpan> {
    let bytes = text.as_bytes();
    let mut regions = Vec::new();
    let mut open_at: Option<usize> = None;
    let mut pos = 0;

    while pos + 1 < bytes.len() {
        let pair = (bytes[pos], bytes[pos + 1]);
        match (open_at, pair) {
            (None, (b'<', b'%')) => {
                open_at = Some(pos);
                pos += 2;
            }
            (Some(start), (b'%', b'>')) => {
                regions.push(RegionSpan {
                    start,
                    end: pos + 2,
                    terminated: true,
                });
                open_at = None;
                pos += 2;
            }
            _ => pos += 1,
        }
    }

    if let Some(start) = open_at {
        regions.push(RegionSpan {
            start,
            end: bytes.len(),
            terminated: false,
        });
    }

    regions
}

/// Check whether a byte offset lies inside a script region
#[must_use]
pub fn is_in_script_region(text: &str, offset: usize) -> bool {
    if offset >= text.len() {
        return false;
    }
    region_at(&detect_regions(text), offset).is_some()
}

/// Find the region containing `offset` in a sorted region list
#[must_use]
pub fn region_at(regions: &[RegionSpan], offset: usize) -> Option<&RegionSpan> {
    let idx = regions.partition_point(|r| r.end <= offset);
    regions.get(idx).filter(|r| r.contains(offset))
}

/// Check whether the line with the given 0-based index starts inside a region
#[must_use]
pub fn is_line_in_script_region(text: &str, line_index: usize) -> bool {
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if idx == line_index {
            return is_in_script_region(text, offset);
        }
        offset += line.len();
    }
    false
}

/// Fast check: does the document contain an open marker followed by a close marker?
#[must_use]
pub fn contains_script(text: &str) -> bool {
    text.find(OPEN_MARKER)
        .is_some_and(|open| text[open + OPEN_MARKER.len()..].contains(CLOSE_MARKER))
}

/// Count script-owned and markup-owned lines
///
/// A line is script-owned when any of its bytes lie inside a region.
#[must_use]
pub fn line_statistics(text: &str) -> LineStatistics {
    let regions = detect_regions(text);
    let mut stats = LineStatistics::default();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let content_end = offset + line.trim_end_matches(['\r', '\n']).len();
        let end = content_end.max(offset + 1);
        let first = regions.partition_point(|r| r.end <= offset);
        let owned = regions
            .get(first)
            .is_some_and(|r| r.overlaps(offset, end));
        if owned {
            stats.script_lines += 1;
        } else {
            stats.markup_lines += 1;
        }
        stats.total_lines += 1;
        offset += line.len();
    }

    stats
}
