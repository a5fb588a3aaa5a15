//! `BlockStructureAnalyzer` - single-pass nesting scan over script lines
//!
//! Walks the document once, classifying every script statement and tracking
//! open blocks on an explicit bounded stack. Blocks are stored in a flat
//! arena; parent/child links are arena indices.
use std::collections::BTreeMap;

use crate::error::{Diagnostic, Stage, StageError};
use crate::limits::{IterationBudget, LimitKind, SafetyLimits};
use crate::parser::document::{Document, Line, Ownership};
use crate::parser::literals::classification_code;
use crate::parser::patterns::CONTINUATION_RE;
use crate::scope::parser_builder::{BlockParser, BLOCK_PARSER};
use crate::scope::types::{BlockType, Construct, LineRole, ScopeEvent};

/// One block in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockType,
    pub construct: Construct,
    pub start_line: usize,
    /// Closing line, or the last document line for an unclosed block
    pub end_line: usize,
    /// Number of enclosing blocks
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub closed: bool,
}

/// Counts gathered while analyzing a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStatistics {
    pub total_blocks: usize,
    pub max_depth: usize,
    pub blocks_by_type: BTreeMap<BlockType, usize>,
    pub unclosed_blocks: usize,
    pub unmatched_ends: usize,
    pub script_lines: usize,
    pub markup_lines: usize,
    pub comment_lines: usize,
    pub total_lines: usize,
}

/// Result of the structural pass
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub blocks: Vec<Block>,
    pub statistics: BlockStatistics,
    pub diagnostics: Vec<Diagnostic>,
}

/// Stack-based structure scanner
pub struct BlockStructureAnalyzer<'a> {
    parser: &'a BlockParser,
    limits: SafetyLimits,
    /// Open blocks as arena indices
    stack: Vec<usize>,
    /// Starts ignored because the depth ceiling was reached
    overflow: usize,
    blocks: Vec<Block>,
    unmatched_ends: usize,
    diagnostics: Vec<Diagnostic>,
}

impl BlockStructureAnalyzer<'static> {
    #[must_use]
    pub fn new(limits: SafetyLimits) -> Self {
        Self::with_parser(&BLOCK_PARSER, limits)
    }
}

impl<'a> BlockStructureAnalyzer<'a> {
    #[must_use]
    pub fn with_parser(parser: &'a BlockParser, limits: SafetyLimits) -> Self {
        Self {
            parser,
            limits,
            stack: Vec::new(),
            overflow: 0,
            blocks: Vec::new(),
            unmatched_ends: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Current nesting depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top_kind(&self) -> Option<BlockType> {
        self.stack.last().map(|&idx| self.blocks[idx].kind)
    }

    /// Annotate every line of `doc` and return the block arena
    pub fn analyze(mut self, doc: &mut Document) -> Structure {
        let mut idx = 0;
        while idx < doc.lines.len() {
            let line = &doc.lines[idx];
            if line.frozen || line.continuation_of.is_some() {
                idx += 1;
                continue;
            }
            if line.is_marker {
                self.analyze_marker_line(&mut doc.lines[idx]);
                idx += 1;
                continue;
            }
            if !line.is_code() {
                let depth = self.depth();
                doc.lines[idx].nesting_level = depth;
                idx += 1;
                continue;
            }

            let (code, last) = self.gather_logical_line(doc, idx);
            let role = self.parser.classify(&code);
            doc.lines[idx].nesting_level = self.depth();
            self.apply_role(&mut doc.lines[idx], role);
            let depth_after = self.depth();
            for line in &mut doc.lines[idx + 1..=last] {
                line.nesting_level = depth_after;
            }
            idx = last + 1;
        }

        let last_line = doc.lines.len().saturating_sub(1);
        for &open in &self.stack {
            self.blocks[open].end_line = last_line;
        }

        let statistics = self.statistics(doc);
        Structure {
            blocks: self.blocks,
            statistics,
            diagnostics: self.diagnostics,
        }
    }

    /// Join a statement's continuation lines, marking them on the way
    ///
    /// Returns the joined code and the index of the statement's last line.
    fn gather_logical_line(&mut self, doc: &mut Document, head: usize) -> (String, usize) {
        let mut code = classification_code(&doc.lines[head].raw);
        let mut last = head;
        let mut budget = IterationBudget::new(self.limits.max_loop_iterations);

        while CONTINUATION_RE.is_match(&code) {
            let next = last + 1;
            let continues = doc.lines.get(next).is_some_and(Line::is_code);
            if !continues {
                break;
            }
            if !budget.tick() {
                self.warn(
                    Some(next),
                    StageError::LimitExceeded {
                        stage: Stage::Structure,
                        limit: LimitKind::LoopIterations,
                        value: budget.spent(),
                    },
                );
                break;
            }
            code.truncate(code.len() - 1);
            code.push(' ');
            code.push_str(&classification_code(&doc.lines[next].raw));
            doc.lines[next].continuation_of = Some(head);
            last = next;
        }

        (code, last)
    }

    /// Apply every script fragment of a marker line in order
    fn analyze_marker_line(&mut self, line: &mut Line) {
        line.nesting_level = self.depth();
        let fragments = std::mem::take(&mut line.fragments);
        for fragment in &fragments {
            let fragment = fragment.trim();
            if fragment.starts_with('=') || fragment.starts_with('@') {
                continue;
            }
            let role = self.parser.classify(&classification_code(fragment));
            self.apply_role(line, role);
        }
        line.fragments = fragments;
    }

    /// Update the stack for one classified statement and annotate its line
    fn apply_role(&mut self, line: &mut Line, role: LineRole) {
        match role {
            LineRole::Plain => {}
            LineRole::Branch => line.dedent_one = true,
            LineRole::Case => {
                if self.top_kind() == Some(BlockType::Selection) {
                    line.is_case = true;
                    line.block_type = Some(BlockType::Selection);
                }
            }
            LineRole::Start(construct) => self.open(line, construct),
            LineRole::End(construct) => self.close(line, construct),
        }
    }

    fn open(&mut self, line: &mut Line, construct: Construct) {
        if self.depth() + self.overflow >= self.limits.max_nesting_depth {
            if self.overflow == 0 {
                self.warn(
                    Some(line.index),
                    StageError::LimitExceeded {
                        stage: Stage::Structure,
                        limit: LimitKind::NestingDepth,
                        value: self.depth() + 1,
                    },
                );
            }
            self.overflow += 1;
            return;
        }

        let kind = construct.block_type();
        let idx = self.blocks.len();
        let parent = self.stack.last().copied();
        self.blocks.push(Block {
            kind,
            construct,
            start_line: line.index,
            end_line: line.index,
            depth: self.depth(),
            parent,
            children: Vec::new(),
            closed: false,
        });
        if let Some(parent) = parent {
            self.blocks[parent].children.push(idx);
        }
        self.stack.push(idx);

        line.is_block_start = true;
        line.block_type = Some(kind);
        line.events.push(ScopeEvent::Open(kind));
    }

    fn close(&mut self, line: &mut Line, construct: Construct) {
        if self.overflow > 0 {
            self.overflow -= 1;
            return;
        }

        let kind = construct.block_type();
        if self.top_kind() != Some(kind) {
            self.unmatched_ends += 1;
            return;
        }

        if let Some(idx) = self.stack.pop() {
            let block = &mut self.blocks[idx];
            block.end_line = line.index;
            block.closed = true;
        }
        line.is_block_end = true;
        line.block_type = Some(kind);
        line.events.push(ScopeEvent::Close);
    }

    fn warn(&mut self, line: Option<usize>, err: StageError) {
        self.diagnostics
            .push(Diagnostic::from_stage_error(line.map(|l| l + 1), &err));
    }

    fn statistics(&self, doc: &Document) -> BlockStatistics {
        let mut stats = BlockStatistics {
            total_blocks: self.blocks.len(),
            unmatched_ends: self.unmatched_ends,
            total_lines: doc.lines.len(),
            ..BlockStatistics::default()
        };
        for block in &self.blocks {
            *stats.blocks_by_type.entry(block.kind).or_insert(0) += 1;
            stats.max_depth = stats.max_depth.max(block.depth + 1);
            if !block.closed {
                stats.unclosed_blocks += 1;
            }
        }
        for line in &doc.lines {
            match line.ownership {
                Ownership::Script => stats.script_lines += 1,
                Ownership::Markup => stats.markup_lines += 1,
            }
            if line.is_comment {
                stats.comment_lines += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> (Document, Structure) {
        let mut doc = Document::parse(text);
        let structure = BlockStructureAnalyzer::new(SafetyLimits::default()).analyze(&mut doc);
        (doc, structure)
    }

    #[test]
    fn test_balanced_if() {
        let (doc, structure) = analyze("<%\nif x then\ny = 1\nend if\n%>");
        assert!(doc.lines[1].is_block_start);
        assert_eq!(doc.lines[2].nesting_level, 1);
        assert!(doc.lines[3].is_block_end);
        assert_eq!(structure.blocks.len(), 1);
        assert_eq!(structure.blocks[0].start_line, 1);
        assert_eq!(structure.blocks[0].end_line, 3);
        assert!(structure.blocks[0].closed);
    }

    #[test]
    fn test_else_marks_dedent() {
        let (doc, _) = analyze("<%\nIf a Then\nx = 1\nElse\nx = 2\nEnd If\n%>");
        assert!(doc.lines[3].dedent_one);
        assert_eq!(doc.lines[3].nesting_level, 1);
        assert!(doc.lines[3].events.is_empty());
    }

    #[test]
    fn test_case_inside_select() {
        let (doc, structure) = analyze("<%\nSelect Case v\nCase 1\nx = 1\nEnd Select\n%>");
        assert!(doc.lines[2].is_case);
        assert_eq!(doc.lines[2].nesting_level, 1);
        assert_eq!(structure.blocks.len(), 1);
        assert_eq!(structure.blocks[0].kind, BlockType::Selection);
    }

    #[test]
    fn test_case_outside_select_is_plain() {
        let (doc, _) = analyze("<%\nCase 1\n%>");
        assert!(!doc.lines[1].is_case);
    }

    #[test]
    fn test_unterminated_block_runs_to_eof() {
        let (_, structure) = analyze("<%\nfor i=1 to 10\nx = i\n");
        assert_eq!(structure.blocks.len(), 1);
        assert!(!structure.blocks[0].closed);
        assert_eq!(structure.blocks[0].end_line, 2);
        assert_eq!(structure.statistics.unclosed_blocks, 1);
    }

    #[test]
    fn test_mismatched_end_leaves_stack() {
        let (doc, structure) = analyze("<%\nFunction F()\nEnd If\nEnd Function\n%>");
        assert!(!doc.lines[2].is_block_end);
        assert!(doc.lines[3].is_block_end);
        assert_eq!(structure.statistics.unmatched_ends, 1);
        assert!(structure.blocks[0].closed);
    }

    #[test]
    fn test_end_on_empty_stack() {
        let (doc, structure) = analyze("<%\nEnd If\nx = 1\n%>");
        assert_eq!(doc.lines[1].nesting_level, 0);
        assert_eq!(doc.lines[2].nesting_level, 0);
        assert_eq!(structure.statistics.unmatched_ends, 1);
    }

    #[test]
    fn test_arena_parent_child() {
        let (_, structure) =
            analyze("<%\nSub A()\nFor i = 1 To 2\nIf i Then\nEnd If\nNext\nEnd Sub\n%>");
        let blocks = &structure.blocks;
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].children, vec![1]);
        assert_eq!(blocks[1].parent, Some(0));
        assert_eq!(blocks[2].parent, Some(1));
        assert_eq!(blocks[2].depth, 2);
        assert_eq!(structure.statistics.max_depth, 3);
        assert_eq!(
            structure.statistics.blocks_by_type.get(&BlockType::Loop),
            Some(&1)
        );
    }

    #[test]
    fn test_marker_lines_drive_structure() {
        let text = "<% If x Then %>\n<p>a</p>\n<%\nResponse.Write 1\n%>\n<% End If %>\n";
        let (doc, structure) = analyze(text);
        assert_eq!(doc.lines[0].events, vec![ScopeEvent::Open(BlockType::Control)]);
        assert_eq!(doc.lines[3].nesting_level, 1);
        assert_eq!(doc.lines[5].events, vec![ScopeEvent::Close]);
        assert!(structure.blocks[0].closed);
    }

    #[test]
    fn test_expression_fragment_is_plain() {
        let (doc, structure) = analyze("<%= If_value %>\n");
        assert!(doc.lines[0].events.is_empty());
        assert!(structure.blocks.is_empty());
    }

    #[test]
    fn test_continuation_lines() {
        let text = "<%\nIf a And _\n   b Then\nx = 1\nEnd If\n%>";
        let (doc, structure) = analyze(text);
        assert!(doc.lines[1].is_block_start);
        assert_eq!(doc.lines[2].continuation_of, Some(1));
        assert_eq!(doc.lines[3].nesting_level, 1);
        assert!(structure.blocks[0].closed);
    }

    #[test]
    fn test_trailing_comment_does_not_hide_then() {
        let (doc, _) = analyze("<%\nIf x Then ' check\ny = 1\nEnd If\n%>");
        assert!(doc.lines[1].is_block_start);
    }

    #[test]
    fn test_nesting_ceiling() {
        let limits = SafetyLimits {
            max_nesting_depth: 2,
            ..SafetyLimits::default()
        };
        let mut doc = Document::parse("<%\nDo\nDo\nDo\nLoop\nLoop\nLoop\nx = 1\n%>");
        let structure = BlockStructureAnalyzer::new(limits).analyze(&mut doc);
        assert_eq!(structure.blocks.len(), 2);
        assert_eq!(structure.diagnostics.len(), 1);
        assert!(structure.blocks.iter().all(|b| b.closed));
        assert_eq!(doc.lines[7].nesting_level, 0);
    }

    #[test]
    fn test_statistics_line_counts() {
        let (_, structure) = analyze("<p>\n<%\n' note\nx = 1\n%>\n");
        let stats = structure.statistics;
        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.markup_lines, 1);
        assert_eq!(stats.script_lines, 4);
        assert_eq!(stats.comment_lines, 1);
    }
}
