//! Line model of an ASP document.
//!
//! A [`Document`] is the input text split into [`Line`]s, each tagged with the
//! region it belongs to. Line terminators are kept per line so output can
//! reproduce them exactly.

use crate::parser::patterns::{BARE_OPEN_MARKER_RE, COMMENT_RE};
use crate::region::{detect_regions, RegionSpan};
use crate::scope::types::{BlockType, ScopeEvent};

/// Line terminator of a physical line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    None,
    Lf,
    Crlf,
}

impl LineEnding {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// Which side of the region boundary a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Script,
    Markup,
}

/// One physical line plus everything the analysis learns about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 0-based line index
    pub index: usize,
    /// Line content without its terminator
    pub raw: String,
    pub ending: LineEnding,
    /// Byte offset of the line start in the document
    pub offset: usize,
    pub ownership: Ownership,
    /// Script line that holds a region marker; emitted verbatim
    pub is_marker: bool,
    /// Script text between the markers of a marker line
    pub fragments: Vec<String>,
    pub is_comment: bool,
    pub is_blank: bool,
    /// Past a safety ceiling; emitted verbatim and never analyzed
    pub frozen: bool,
    /// Index of the statement's first line when this line continues it
    pub continuation_of: Option<usize>,
    pub is_block_start: bool,
    pub is_block_end: bool,
    pub block_type: Option<BlockType>,
    pub is_case: bool,
    pub dedent_one: bool,
    /// Nesting depth in effect before this line is applied
    pub nesting_level: usize,
    /// Stack changes caused by this line, in order
    pub events: Vec<ScopeEvent>,
    /// Indent level assigned by the indentation engine
    pub indent_level: usize,
}

impl Line {
    fn new(index: usize, raw: &str, ending: LineEnding, offset: usize) -> Self {
        Self {
            index,
            raw: raw.to_string(),
            ending,
            offset,
            ownership: Ownership::Markup,
            is_marker: false,
            fragments: Vec::new(),
            is_comment: false,
            is_blank: raw.trim().is_empty(),
            frozen: false,
            continuation_of: None,
            is_block_start: false,
            is_block_end: false,
            block_type: None,
            is_case: false,
            dedent_one: false,
            nesting_level: 0,
            events: Vec::new(),
            indent_level: 0,
        }
    }

    /// Content with surrounding whitespace removed
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }

    /// Script line wholly inside a region (no markers on it)
    #[must_use]
    pub fn is_script_body(&self) -> bool {
        self.ownership == Ownership::Script && !self.is_marker && !self.frozen
    }

    /// Script body line carrying a statement
    #[must_use]
    pub fn is_code(&self) -> bool {
        self.is_script_body() && !self.is_comment && !self.is_blank
    }

    /// Marker line holding nothing but an open marker
    #[must_use]
    pub fn is_bare_open_marker(&self) -> bool {
        self.is_marker && BARE_OPEN_MARKER_RE.is_match(self.trimmed())
    }
}

/// A document split into lines with region ownership assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub lines: Vec<Line>,
    pub regions: Vec<RegionSpan>,
    /// Terminator used for inserted lines
    pub dominant_ending: LineEnding,
}

impl Document {
    /// Split `text` into lines and tag each line's ownership
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let regions = detect_regions(text);
        let mut lines = split_lines(text);
        for line in &mut lines {
            assign_ownership(line, text, &regions);
        }
        let dominant_ending = dominant_ending(&lines);
        Self {
            lines,
            regions,
            dominant_ending,
        }
    }

    /// Mark every line from `index` on as frozen
    pub fn freeze_from(&mut self, index: usize) {
        for line in self.lines.iter_mut().skip(index) {
            line.frozen = true;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split text into lines, keeping each line's terminator
#[must_use]
pub fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let (content, ending, next_start) = match text[start..].find('\n') {
            Some(rel) => {
                let end = start + rel;
                if end > start && text.as_bytes()[end - 1] == b'\r' {
                    (&text[start..end - 1], LineEnding::Crlf, end + 1)
                } else {
                    (&text[start..end], LineEnding::Lf, end + 1)
                }
            }
            None => (&text[start..], LineEnding::None, text.len()),
        };
        lines.push(Line::new(lines.len(), content, ending, start));
        start = next_start;
    }

    lines
}

/// The terminator most lines use; LF when there is none
#[must_use]
pub fn dominant_ending(lines: &[Line]) -> LineEnding {
    let crlf = lines.iter().filter(|l| l.ending == LineEnding::Crlf).count();
    let lf = lines.iter().filter(|l| l.ending == LineEnding::Lf).count();
    if crlf > lf {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    }
}

fn assign_ownership(line: &mut Line, text: &str, regions: &[RegionSpan]) {
    let start = line.offset;
    let end = start + line.raw.len();
    // an empty line still owns its terminator byte
    let probe_end = end.max(start + 1);

    let first = regions.partition_point(|r| r.end <= start);
    let overlapping: Vec<&RegionSpan> = regions[first..]
        .iter()
        .take_while(|r| r.start < probe_end)
        .collect();

    if overlapping.is_empty() {
        line.ownership = Ownership::Markup;
        return;
    }

    line.ownership = Ownership::Script;
    let body = overlapping.len() == 1 && {
        let (inner_start, inner_end) = overlapping[0].interior();
        inner_start <= start && end <= inner_end
    };

    if body {
        line.is_comment = COMMENT_RE.is_match(line.trimmed());
        return;
    }

    line.is_marker = true;
    for region in overlapping {
        let (inner_start, inner_end) = region.interior();
        let from = inner_start.max(start);
        let to = inner_end.min(end);
        if from < to {
            line.fragments.push(text[from..to].to_string());
        }
    }
}
