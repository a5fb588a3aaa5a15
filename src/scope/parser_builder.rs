//! Block parser builder - regex tables for classifying VBScript statements
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::literals::split_statements;
use crate::parser::patterns::{
    CASE_RE, CLASS_RE, DO_RE, ELSEIF_RE, ELSE_RE, END_CLASS_RE, END_FUNCTION_RE, END_IF_RE,
    END_PROPERTY_RE, END_SELECT_RE, END_SUB_RE, FOR_RE, FUNCTION_RE, IF_BLOCK_RE, LOOP_RE,
    NEXT_RE, PROPERTY_RE, SELECT_RE, SUB_RE, WEND_RE, WHILE_RE,
};
use crate::scope::types::{Construct, LineRole};

/// Wrapper around a regex bound to the construct it recognizes
#[derive(Clone)]
pub struct ParserRe {
    re: &'static Regex,
    pub construct: Construct,
}

impl ParserRe {
    #[must_use]
    pub fn new(re: &'static Regex, construct: Construct) -> Self {
        Self { re, construct }
    }

    #[must_use]
    pub fn is_match(&self, statement: &str) -> bool {
        self.re.is_match(statement)
    }
}

/// Regex tables for block openers and closers
#[derive(Clone)]
pub struct BlockParser {
    /// Openers other than IF, which is matched against the whole line
    pub opening: Vec<ParserRe>,
    /// Closers, keyed by the construct they close
    pub closing: Vec<ParserRe>,
}

/// Shared parser instance
pub static BLOCK_PARSER: LazyLock<BlockParser> = LazyLock::new(build_block_parser);

/// Build the block parser tables
#[must_use]
pub fn build_block_parser() -> BlockParser {
    let opening = vec![
        ParserRe::new(&FOR_RE, Construct::For),
        ParserRe::new(&WHILE_RE, Construct::While),
        ParserRe::new(&DO_RE, Construct::Do),
        ParserRe::new(&FUNCTION_RE, Construct::Function),
        ParserRe::new(&SUB_RE, Construct::Sub),
        ParserRe::new(&PROPERTY_RE, Construct::Property),
        ParserRe::new(&SELECT_RE, Construct::Select),
        ParserRe::new(&CLASS_RE, Construct::Class),
    ];

    let closing = vec![
        ParserRe::new(&END_IF_RE, Construct::If),
        ParserRe::new(&NEXT_RE, Construct::For),
        ParserRe::new(&WEND_RE, Construct::While),
        ParserRe::new(&LOOP_RE, Construct::Do),
        ParserRe::new(&END_FUNCTION_RE, Construct::Function),
        ParserRe::new(&END_SUB_RE, Construct::Sub),
        ParserRe::new(&END_PROPERTY_RE, Construct::Property),
        ParserRe::new(&END_SELECT_RE, Construct::Select),
        ParserRe::new(&END_CLASS_RE, Construct::Class),
    ];

    BlockParser { opening, closing }
}

impl BlockParser {
    fn closer(&self, statement: &str) -> Option<Construct> {
        self.closing
            .iter()
            .find(|p| p.is_match(statement))
            .map(|p| p.construct)
    }

    /// Classify one line of masked, comment-free code
    ///
    /// Only the first `:`-separated statement decides the role. An opener
    /// whose closer appears later on the same line is balanced and plain.
    #[must_use]
    pub fn classify(&self, code: &str) -> LineRole {
        let code = code.trim();
        let statements = split_statements(code);
        let Some(first) = statements.first() else {
            return LineRole::Plain;
        };

        // Check closing FIRST so "end function" never reaches the openers
        if let Some(construct) = self.closer(first) {
            return LineRole::End(construct);
        }

        if ELSEIF_RE.is_match(first) || ELSE_RE.is_match(first) {
            return LineRole::Branch;
        }
        if CASE_RE.is_match(first) {
            return LineRole::Case;
        }

        if IF_BLOCK_RE.is_match(code) {
            return LineRole::Start(Construct::If);
        }

        let Some(opener) = self.opening.iter().find(|p| p.is_match(first)) else {
            return LineRole::Plain;
        };

        let block_type = opener.construct.block_type();
        let balanced = statements[1..]
            .iter()
            .filter_map(|s| self.closer(s))
            .any(|c| c.block_type() == block_type);
        if balanced {
            LineRole::Plain
        } else {
            LineRole::Start(opener.construct)
        }
    }
}
