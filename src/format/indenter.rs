//! `IndentationEngine` - maps structural classification to indent levels
//!
//! Replays the scope events recorded by the structure analyzer on a stack of
//! absolute indent levels. Levels are counted in indent units; they are
//! turned into spaces only when a line is emitted.
use crate::error::{Diagnostic, Stage, StageError};
use crate::limits::{IterationBudget, LimitKind, SafetyLimits};
use crate::parser::document::{Line, Ownership};
use crate::scope::types::ScopeEvent;

/// Indentation tracker
pub struct IndentationEngine {
    /// Stack of absolute indent levels; the bottom entry is the document level
    indent_storage: Vec<usize>,
    limits: SafetyLimits,
    diagnostics: Vec<Diagnostic>,
}

impl IndentationEngine {
    #[must_use]
    pub fn new(limits: SafetyLimits) -> Self {
        Self {
            indent_storage: vec![0],
            limits,
            diagnostics: Vec::new(),
        }
    }

    /// Level of the innermost open body
    fn current(&self) -> usize {
        *self.indent_storage.last().unwrap_or(&0)
    }

    fn replay(&mut self, events: &[ScopeEvent]) {
        for event in events {
            match event {
                ScopeEvent::Open(kind) => {
                    let body = self.current() + kind.body_indent();
                    self.indent_storage.push(body);
                }
                ScopeEvent::Close => {
                    if self.indent_storage.len() > 1 {
                        self.indent_storage.pop();
                    }
                }
            }
        }
    }

    /// Level for a statement line, replaying its events
    fn statement_level(&mut self, line: &Line) -> usize {
        if line.is_block_end {
            self.replay(&line.events);
            return self.current();
        }
        let level = if line.dedent_one || line.is_case {
            self.current().saturating_sub(1)
        } else {
            self.current()
        };
        self.replay(&line.events);
        level
    }

    /// Assign `indent_level` to every line
    ///
    /// Markup and frozen lines get level 0. Comment lines take the level of
    /// the next statement they document. Marker lines are emitted verbatim,
    /// their level only feeds hierarchy queries.
    pub fn assign(mut self, lines: &mut [Line]) -> Vec<Diagnostic> {
        for idx in 0..lines.len() {
            let line = &lines[idx];
            let level = if line.ownership == Ownership::Markup || line.frozen {
                0
            } else if let Some(head) = line.continuation_of {
                lines[head].indent_level + 1
            } else if line.is_comment || line.is_blank {
                self.current()
            } else {
                self.statement_level(line)
            };
            lines[idx].indent_level = level;
        }

        for idx in 0..lines.len() {
            if lines[idx].is_script_body() && lines[idx].is_comment {
                if let Some(level) = self.look_ahead(lines, idx) {
                    lines[idx].indent_level = level;
                }
            }
        }

        self.diagnostics
    }

    /// Level of the next statement after comment line `idx`
    ///
    /// Blank lines, comments and bare open markers are skipped. Any other
    /// marker line, markup or the end of the document stops the search.
    fn look_ahead(&mut self, lines: &[Line], idx: usize) -> Option<usize> {
        let mut budget = IterationBudget::new(self.limits.max_loop_iterations);
        for next in &lines[idx + 1..] {
            if !budget.tick() {
                let err = StageError::LimitExceeded {
                    stage: Stage::Indent,
                    limit: LimitKind::LoopIterations,
                    value: budget.spent(),
                };
                self.diagnostics
                    .push(Diagnostic::from_stage_error(Some(idx + 1), &err));
                return None;
            }
            if next.is_bare_open_marker() {
                continue;
            }
            if !next.is_script_body() {
                return None;
            }
            if next.is_blank || next.is_comment {
                continue;
            }
            return Some(next.indent_level);
        }
        None
    }
}

/// Spaces for an indent level
#[must_use]
pub fn materialize(level: usize, width: usize) -> String {
    " ".repeat(level * width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::document::Document;
    use crate::scope::analyzer::BlockStructureAnalyzer;

    fn levels(text: &str) -> Vec<usize> {
        let mut doc = Document::parse(text);
        BlockStructureAnalyzer::new(SafetyLimits::default()).analyze(&mut doc);
        IndentationEngine::new(SafetyLimits::default()).assign(&mut doc.lines);
        doc.lines.iter().map(|l| l.indent_level).collect()
    }

    #[test]
    fn test_balanced_if() {
        assert_eq!(levels("<%\nif x then\ny = 1\nend if\n%>"), vec![0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_else_elseif() {
        assert_eq!(
            levels("<%\nif a then\nx=1\nelseif b then\nx=2\nelse\nx=3\nend if\n%>"),
            vec![0, 0, 1, 0, 1, 0, 1, 0, 0]
        );
    }

    #[test]
    fn test_select_case() {
        assert_eq!(
            levels("<%\nselect case v\ncase 1\nx=1\ncase else\nx=2\nend select\n%>"),
            vec![0, 0, 1, 2, 1, 2, 0, 0]
        );
    }

    #[test]
    fn test_nested_procedure() {
        assert_eq!(
            levels("<%\nFunction F()\nFor i = 1 To 3\nx = i\nNext\nEnd Function\n%>"),
            vec![0, 0, 1, 2, 1, 0, 0]
        );
    }

    #[test]
    fn test_comment_takes_next_level() {
        assert_eq!(
            levels("<%\nIf a Then\nx = 1\n' closing soon\nEnd If\n%>"),
            vec![0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_comment_before_else() {
        assert_eq!(
            levels("<%\nIf a Then\nx = 1\n' other\n\nElse\nx = 2\nEnd If\n%>"),
            vec![0, 0, 1, 0, 1, 0, 1, 0, 0]
        );
    }

    #[test]
    fn test_comment_before_close_marker_keeps_own_level() {
        assert_eq!(
            levels("<%\nSub A()\nx = 1\n' trailing\n%>\n<% End Sub %>"),
            vec![0, 0, 1, 1, 1, 0]
        );
    }

    #[test]
    fn test_continuation_indent() {
        assert_eq!(
            levels("<%\nIf a Then\nx = 1 + _\n2\nEnd If\n%>"),
            vec![0, 0, 1, 2, 0, 0]
        );
    }

    #[test]
    fn test_structure_across_regions() {
        assert_eq!(
            levels("<% For Each x In xs %>\n<li>\n<%\nResponse.Write x\n%>\n<% Next %>"),
            vec![0, 0, 1, 1, 1, 0]
        );
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(levels("<%\nfor i=1 to 10\nx = i\n"), vec![0, 0, 1]);
    }

    #[test]
    fn test_stray_end_stays_at_zero() {
        assert_eq!(levels("<%\nend if\nx = 1\n%>"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_materialize() {
        assert_eq!(materialize(0, 4), "");
        assert_eq!(materialize(2, 4), "        ");
        assert_eq!(materialize(1, 2), "  ");
    }
}
