//! Block types for VBScript constructs
use std::fmt;

/// Structural category of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum BlockType {
    /// IF ... END IF
    Control = 0,
    /// FOR/NEXT, WHILE/WEND, DO/LOOP
    Loop = 1,
    /// FUNCTION, SUB, PROPERTY
    Procedure = 2,
    /// SELECT CASE ... END SELECT
    Selection = 3,
    /// CLASS ... END CLASS
    ClassBlock = 4,
}

impl BlockType {
    pub const ALL: [BlockType; 5] = [
        BlockType::Control,
        BlockType::Loop,
        BlockType::Procedure,
        BlockType::Selection,
        BlockType::ClassBlock,
    ];

    /// Get the block type as a usize index
    #[must_use]
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// Keywords that open a block of this type
    #[must_use]
    pub fn start_keywords(self) -> &'static [&'static str] {
        match self {
            BlockType::Control => &["if"],
            BlockType::Loop => &["for", "while", "do"],
            BlockType::Procedure => &["function", "sub", "property"],
            BlockType::Selection => &["select", "case"],
            BlockType::ClassBlock => &["class"],
        }
    }

    /// Keywords that close a block of this type
    #[must_use]
    pub fn end_keywords(self) -> &'static [&'static str] {
        match self {
            BlockType::Control => &["end if"],
            BlockType::Loop => &["next", "wend", "loop"],
            BlockType::Procedure => &["end function", "end sub", "end property"],
            BlockType::Selection => &["end select"],
            BlockType::ClassBlock => &["end class"],
        }
    }

    /// Indent levels the block body sits below its opening line
    ///
    /// Select bodies hold a `Case` level plus the statements under it.
    #[must_use]
    pub fn body_indent(self) -> usize {
        match self {
            BlockType::Selection => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::Control => "CONTROL",
            BlockType::Loop => "LOOP",
            BlockType::Procedure => "PROCEDURE",
            BlockType::Selection => "SELECTION",
            BlockType::ClassBlock => "CLASS",
        };
        write!(f, "{name}")
    }
}

/// The concrete statement that opened a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    If,
    For,
    While,
    Do,
    Function,
    Sub,
    Property,
    Select,
    Class,
}

impl Construct {
    #[must_use]
    pub fn block_type(self) -> BlockType {
        match self {
            Construct::If => BlockType::Control,
            Construct::For | Construct::While | Construct::Do => BlockType::Loop,
            Construct::Function | Construct::Sub | Construct::Property => BlockType::Procedure,
            Construct::Select => BlockType::Selection,
            Construct::Class => BlockType::ClassBlock,
        }
    }

    /// Lower-case keyword that opens the construct
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Construct::If => "if",
            Construct::For => "for",
            Construct::While => "while",
            Construct::Do => "do",
            Construct::Function => "function",
            Construct::Sub => "sub",
            Construct::Property => "property",
            Construct::Select => "select",
            Construct::Class => "class",
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword().to_uppercase())
    }
}

/// Structural role of one statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// No effect on nesting
    Plain,
    /// Opens a block
    Start(Construct),
    /// Closes the block opened by the given construct
    End(Construct),
    /// ELSE / ELSEIF: rendered one level shallower, stack untouched
    Branch,
    /// CASE marker inside a SELECT
    Case,
}

/// Change to the nesting stack caused by a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEvent {
    Open(BlockType),
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_indices() {
        assert_eq!(BlockType::Control.as_index(), 0);
        assert_eq!(BlockType::ClassBlock.as_index(), 4);
    }

    #[test]
    fn test_end_keywords_are_disjoint() {
        for (i, a) in BlockType::ALL.iter().enumerate() {
            for b in &BlockType::ALL[i + 1..] {
                for kw in a.end_keywords() {
                    assert!(!b.end_keywords().contains(kw), "{kw} shared by {a} and {b}");
                }
            }
        }
    }

    #[test]
    fn test_body_indent() {
        assert_eq!(BlockType::Selection.body_indent(), 2);
        assert_eq!(BlockType::Control.body_indent(), 1);
        assert_eq!(BlockType::Procedure.body_indent(), 1);
    }

    #[test]
    fn test_construct_block_type() {
        assert_eq!(Construct::Do.block_type(), BlockType::Loop);
        assert_eq!(Construct::Property.block_type(), BlockType::Procedure);
        assert_eq!(Construct::Select.block_type(), BlockType::Selection);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BlockType::Loop), "LOOP");
        assert_eq!(format!("{}", Construct::Function), "FUNCTION");
    }
}
