//! Single-pass formatting pipeline
//!
//! split lines -> mark region ownership -> analyze block structure ->
//! assign indent levels -> plan blank lines -> normalize script lines -> join
//!
//! Markup lines and lines carrying a region marker are emitted byte-for-byte.
//! A stage that fails on one line leaves that line's original text in place;
//! a failure that affects the whole document echoes the input.

use std::time::Instant;

use crate::config::Config;
use crate::directive::{find_directive, Directive};
use crate::error::{Diagnostic, Stage, StageError};
use crate::format::{materialize, plan_blank_lines, CaseNormalizer, IndentationEngine};
use crate::limits::{LimitKind, SafetyLimits};
use crate::parser::document::{Document, Line, LineEnding, Ownership};
use crate::region::{region_at, RegionSpan, OPEN_MARKER};
use crate::scope::{Block, BlockStatistics, BlockStructureAnalyzer};
use crate::spec::CanonicalCaseTable;

/// Formatted text plus everything worth reporting about the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutput {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Output differs from input
    pub changed: bool,
}

impl FormatOutput {
    /// Output identical to the input
    #[must_use]
    pub fn unchanged(text: &str, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            text: text.to_string(),
            diagnostics,
            changed: false,
        }
    }
}

/// Structural position of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyInfo {
    pub indent_level: usize,
    /// Open blocks in effect before the line
    pub depth: usize,
    /// Innermost block containing the line, as an arena index
    pub block: Option<usize>,
}

/// What lies at one byte offset of an analyzed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionInfo {
    /// 0-based line index
    pub line: usize,
    pub in_script: bool,
    pub region: Option<RegionSpan>,
    pub hierarchy: HierarchyInfo,
}

/// Cached result of the structural passes
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub regions: Vec<RegionSpan>,
    pub blocks: Vec<Block>,
    pub lines: Vec<HierarchyInfo>,
    /// Byte offset of each line start
    pub line_offsets: Vec<usize>,
    pub text_len: usize,
    pub statistics: BlockStatistics,
    pub diagnostics: Vec<Diagnostic>,
    pub created_at: Instant,
}

impl AnalysisResult {
    /// Analysis of a document that was not examined
    #[must_use]
    pub fn empty(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            regions: Vec::new(),
            blocks: Vec::new(),
            lines: Vec::new(),
            line_offsets: Vec::new(),
            text_len: 0,
            statistics: BlockStatistics::default(),
            diagnostics,
            created_at: Instant::now(),
        }
    }

    /// Hierarchy info for a 0-based line index
    #[must_use]
    pub fn hierarchy_at(&self, line: usize) -> Option<HierarchyInfo> {
        self.lines.get(line).copied()
    }

    /// Innermost block containing `line`
    #[must_use]
    pub fn block_at(&self, line: usize) -> Option<&Block> {
        self.hierarchy_at(line)?.block.map(|idx| &self.blocks[idx])
    }

    /// Line, region and block at a byte offset
    ///
    /// `None` past the end of the text or for a document that was not analyzed.
    #[must_use]
    pub fn position_at(&self, offset: usize) -> Option<PositionInfo> {
        if offset > self.text_len {
            return None;
        }
        let line = self
            .line_offsets
            .partition_point(|&start| start <= offset)
            .checked_sub(1)?;
        let region = region_at(&self.regions, offset).copied();
        Some(PositionInfo {
            line,
            in_script: region.is_some(),
            region,
            hierarchy: self.hierarchy_at(line)?,
        })
    }
}

fn limit_warning(stage: Stage, limit: LimitKind, value: usize) -> Diagnostic {
    Diagnostic::from_stage_error(
        None,
        &StageError::LimitExceeded {
            stage,
            limit,
            value,
        },
    )
}

struct AnalysisParts {
    blocks: Vec<Block>,
    statistics: BlockStatistics,
    diagnostics: Vec<Diagnostic>,
}

/// Parse and run the structure and indent passes
fn run_structure(text: &str, limits: SafetyLimits) -> (Document, AnalysisParts) {
    let mut diagnostics = Vec::new();
    let mut doc = Document::parse(text);
    if limits.exceeds(LimitKind::DocumentLines, doc.len()) {
        diagnostics.push(limit_warning(
            Stage::Split,
            LimitKind::DocumentLines,
            doc.len(),
        ));
        doc.freeze_from(limits.max_lines);
    }

    let structure = BlockStructureAnalyzer::new(limits).analyze(&mut doc);
    diagnostics.extend(structure.diagnostics);
    diagnostics.extend(IndentationEngine::new(limits).assign(&mut doc.lines));

    let parts = AnalysisParts {
        blocks: structure.blocks,
        statistics: structure.statistics,
        diagnostics,
    };
    (doc, parts)
}

/// Innermost block index for every line
fn innermost_blocks(blocks: &[Block], line_count: usize) -> Vec<Option<usize>> {
    let mut innermost = vec![None; line_count];
    // Arena order is document order of starts, so deeper blocks come later
    for (idx, block) in blocks.iter().enumerate() {
        let end = block.end_line.min(line_count.saturating_sub(1));
        for slot in innermost.iter_mut().take(end + 1).skip(block.start_line) {
            *slot = Some(idx);
        }
    }
    innermost
}

/// Run the structural analysis of `text` without formatting it
#[must_use]
pub fn analyze_text(text: &str, limits: SafetyLimits) -> AnalysisResult {
    if limits.exceeds(LimitKind::TextLength, text.len()) {
        let warning = limit_warning(Stage::Regions, LimitKind::TextLength, text.len());
        return AnalysisResult::empty(vec![warning]);
    }

    let (doc, parts) = run_structure(text, limits);
    let innermost = innermost_blocks(&parts.blocks, doc.len());
    let lines = doc
        .lines
        .iter()
        .zip(innermost)
        .map(|(line, block)| HierarchyInfo {
            indent_level: line.indent_level,
            depth: line.nesting_level,
            block,
        })
        .collect();

    let line_offsets = doc.lines.iter().map(|line| line.offset).collect();
    AnalysisResult {
        regions: doc.regions,
        blocks: parts.blocks,
        lines,
        line_offsets,
        text_len: text.len(),
        statistics: parts.statistics,
        diagnostics: parts.diagnostics,
        created_at: Instant::now(),
    }
}

/// Format a whole document
///
/// The first `' aspfmt:` directive in the text overrides `config`.
#[must_use]
pub fn format_text(text: &str, config: &Config, table: &CanonicalCaseTable) -> FormatOutput {
    if config.limits.exceeds(LimitKind::TextLength, text.len()) {
        let warning = limit_warning(Stage::Regions, LimitKind::TextLength, text.len());
        return FormatOutput::unchanged(text, vec![warning]);
    }

    let mut config = config.clone();
    match find_directive(&mut text.as_bytes()) {
        Some(Directive::Off) => return FormatOutput::unchanged(text, Vec::new()),
        Some(Directive::Overrides(overrides)) => config.apply_directive(&overrides),
        None => {}
    }

    // An open marker alone starts a region that runs to the end
    if !text.contains(OPEN_MARKER) {
        return FormatOutput::unchanged(text, Vec::new());
    }

    let (doc, parts) = run_structure(text, config.limits);
    let mut diagnostics = parts.diagnostics;
    let inserts = if config.blank_lines {
        plan_blank_lines(&doc.lines)
    } else {
        Vec::new()
    };

    let normalizer = CaseNormalizer::with_options(table, config.normalize_options(), config.limits);
    let inserted_ending = match doc.dominant_ending {
        LineEnding::None => LineEnding::Lf,
        ending => ending,
    };

    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut next_insert = inserts.iter().peekable();
    for line in &doc.lines {
        if next_insert.peek() == Some(&&line.index) {
            next_insert.next();
            out.push_str(inserted_ending.as_str());
        }
        emit_line(&mut out, line, &config, &normalizer, &mut diagnostics);
    }

    let changed = out != text;
    FormatOutput {
        text: out,
        diagnostics,
        changed,
    }
}

/// Leading whitespace of a raw line
fn leading_whitespace(raw: &str) -> &str {
    &raw[..raw.len() - raw.trim_start().len()]
}

fn emit_line(
    out: &mut String,
    line: &Line,
    config: &Config,
    normalizer: &CaseNormalizer<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if line.ownership == Ownership::Markup || line.is_marker || line.frozen {
        out.push_str(&line.raw);
        out.push_str(line.ending.as_str());
        return;
    }
    if line.is_blank {
        out.push_str(line.ending.as_str());
        return;
    }

    if config.impose_indent {
        out.push_str(&materialize(line.indent_level, config.indent));
    } else {
        out.push_str(leading_whitespace(&line.raw));
    }

    let trimmed = line.trimmed();
    if line.is_comment || !(config.impose_case || config.impose_whitespace) {
        out.push_str(trimmed);
    } else {
        match normalizer.normalize(trimmed) {
            Ok(normalized) => out.push_str(&normalized),
            Err(err) => {
                diagnostics.push(Diagnostic::from_stage_error(Some(line.index + 1), &err));
                out.push_str(trimmed);
            }
        }
    }
    out.push_str(line.ending.as_str());
}
