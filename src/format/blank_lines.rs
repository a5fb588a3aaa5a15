//! Blank-line policy around procedure declarations.
//!
//! A `Function`, `Sub` or `Property` declaration gets exactly one blank line
//! above it. Nothing is inserted when the line above is already blank, is a
//! comment documenting the declaration, or is the region's opening marker
//! line. Nothing is ever inserted after a block end.

use crate::parser::document::Line;
use crate::scope::types::BlockType;

/// Indices of the lines that need a blank line inserted above them
#[must_use]
pub fn plan_blank_lines(lines: &[Line]) -> Vec<usize> {
    let mut inserts = Vec::new();
    for idx in 1..lines.len() {
        let line = &lines[idx];
        let is_declaration = line.is_code()
            && line.is_block_start
            && line.block_type == Some(BlockType::Procedure);
        if !is_declaration {
            continue;
        }
        let prev = &lines[idx - 1];
        if prev.is_blank || prev.is_comment || prev.is_marker || prev.frozen {
            continue;
        }
        inserts.push(idx);
    }
    inserts
}
