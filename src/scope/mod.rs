//! VBScript block structure.
//!
//! Tracks nested constructs to determine indentation:
//! - Control: IF ... END IF
//! - Loops: FOR/NEXT, WHILE/WEND, DO/LOOP
//! - Procedures: FUNCTION, SUB, PROPERTY
//! - Selection: SELECT CASE ... END SELECT
//! - Classes: CLASS ... END CLASS
//!
//! The [`BlockParser`] classifies statements with regex tables and the
//! [`BlockStructureAnalyzer`] walks the document, one stack across all
//! script regions.

pub mod analyzer;
pub mod parser_builder;
pub mod types;

pub use analyzer::{Block, BlockStatistics, BlockStructureAnalyzer, Structure};
pub use parser_builder::{build_block_parser, BlockParser, ParserRe, BLOCK_PARSER};
pub use types::{BlockType, Construct, LineRole, ScopeEvent};
