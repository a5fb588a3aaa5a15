//! Canonical case table for VBScript and the ASP object model.
//!
//! The table is read from TOML. Every section is optional:
//!
//! ```toml
//! sys_functions = ["Abs", "CStr"]
//!
//! [case_map]
//! "end if" = "End If"
//!
//! [objects.response]
//! methods = ["Write", "Redirect"]
//!
//! [keywords]
//! control = ["if", "then"]
//!
//! [operators.comparison]
//! equal = "="
//!
//! [formatting]
//! operators_with_spaces = ["comparison"]
//! keywords_with_spaces = ["and", "or"]
//! ```
use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{Stage, StageError};
use crate::spec::builtin::{BUILTIN_CASE_MAP, FALLBACK_SPACED_OPERATORS};

/// Raw table layout as it appears on disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpecSchema {
    pub sys_functions: Vec<String>,
    pub case_map: HashMap<String, String>,
    pub objects: HashMap<String, ObjectSpec>,
    pub keywords: HashMap<String, Vec<String>>,
    pub operators: HashMap<String, HashMap<String, String>>,
    pub formatting: FormattingSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObjectSpec {
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormattingSpec {
    /// Operator group names from `[operators.<group>]`
    pub operators_with_spaces: Vec<String>,
    /// Keyword operators that get one space on each side
    pub keywords_with_spaces: Vec<String>,
}

/// Where a loaded table came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOrigin {
    Bundled,
    File(String),
    Builtin,
}

/// Compiled lookup tables used by the case normalizer and operator spacer
#[derive(Debug, Clone)]
pub struct CanonicalCaseTable {
    /// Lower-case word or phrase -> canonical spelling
    case_map: HashMap<String, String>,
    /// Lower-case object -> (lower-case member -> canonical member)
    object_methods: HashMap<String, HashMap<String, String>>,
    keywords: HashSet<String>,
    spaced_operators: Vec<String>,
    spaced_keywords: HashSet<String>,
    keyword_re: Option<Regex>,
    object_re: Option<Regex>,
    origin: TableOrigin,
    /// Why the bundled or configured table was replaced by the builtin one
    fallback_reason: Option<StageError>,
}

/// Lower-case a phrase and collapse inner whitespace runs to one space
#[must_use]
pub fn normalize_key(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn pattern_error(reason: impl ToString) -> StageError {
    StageError::Pattern {
        stage: Stage::SpecTable,
        reason: reason.to_string(),
    }
}

fn build_table_re(pattern: &str) -> Result<Regex, StageError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .map_err(pattern_error)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Alternation of phrases, longest first, with inner spaces matching any run
fn alternation<'a>(phrases: impl Iterator<Item = &'a String>) -> Option<String> {
    let mut phrases: Vec<&String> = phrases
        .filter(|p| {
            p.chars().next().is_some_and(is_word_char)
                && p.chars().last().is_some_and(is_word_char)
        })
        .collect();
    if phrases.is_empty() {
        return None;
    }
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alts: Vec<String> = phrases
        .iter()
        .map(|p| {
            p.split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    Some(alts.join("|"))
}

impl CanonicalCaseTable {
    /// Compile a table from its raw layout
    pub fn from_schema(schema: SpecSchema, origin: TableOrigin) -> Result<Self, StageError> {
        let mut case_map: HashMap<String, String> = schema
            .case_map
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        // Explicit case_map entries win over sys_functions
        for name in schema.sys_functions {
            let key = normalize_key(&name);
            if !key.is_empty() {
                case_map.entry(key).or_insert(name);
            }
        }

        let object_methods: HashMap<String, HashMap<String, String>> = schema
            .objects
            .into_iter()
            .map(|(object, spec)| {
                let methods = spec
                    .methods
                    .into_iter()
                    .map(|m| (m.to_lowercase(), m))
                    .collect();
                (object.to_lowercase(), methods)
            })
            .collect();

        let keywords = schema
            .keywords
            .into_values()
            .flatten()
            .map(|k| normalize_key(&k))
            .collect();

        let mut spaced_operators: Vec<String> = Vec::new();
        for group in &schema.formatting.operators_with_spaces {
            if let Some(symbols) = schema.operators.get(group) {
                for symbol in symbols.values() {
                    if !symbol.is_empty() && !spaced_operators.contains(symbol) {
                        spaced_operators.push(symbol.clone());
                    }
                }
            }
        }

        let spaced_keywords = schema
            .formatting
            .keywords_with_spaces
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        let keyword_re = alternation(case_map.keys())
            .map(|alts| build_table_re(&format!(r"\b(?:{alts})\b")))
            .transpose()?;
        let object_re = alternation(object_methods.keys())
            .map(|alts| build_table_re(&format!(r"\b({alts})\s*\.\s*([A-Za-z_]\w*)")))
            .transpose()?;

        Ok(Self {
            case_map,
            object_methods,
            keywords,
            spaced_operators,
            spaced_keywords,
            keyword_re,
            object_re,
            origin,
            fallback_reason: None,
        })
    }

    /// Parse and compile a TOML table
    pub fn parse_toml(text: &str, origin: TableOrigin) -> Result<Self, StageError> {
        let schema: SpecSchema = toml::from_str(text).map_err(|e| StageError::SpecTable {
            reason: e.message().to_string(),
        })?;
        Self::from_schema(schema, origin)
    }

    /// Minimal table compiled into the binary
    ///
    /// Holds only the case map; operator spacing uses the fallback set.
    #[must_use]
    pub fn builtin() -> Self {
        let schema = SpecSchema {
            case_map: BUILTIN_CASE_MAP
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..SpecSchema::default()
        };
        Self::from_schema(schema, TableOrigin::Builtin).unwrap_or_else(|_| Self::empty())
    }

    /// Table with no entries; formatting then only touches operator spacing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            case_map: HashMap::new(),
            object_methods: HashMap::new(),
            keywords: HashSet::new(),
            spaced_operators: Vec::new(),
            spaced_keywords: HashSet::new(),
            keyword_re: None,
            object_re: None,
            origin: TableOrigin::Builtin,
            fallback_reason: None,
        }
    }

    /// Mark this table as a replacement for one that failed to load
    #[must_use]
    pub fn with_fallback_reason(mut self, reason: StageError) -> Self {
        self.fallback_reason = Some(reason);
        self
    }

    /// Canonical spelling of a word or phrase, looked up case-insensitively
    #[must_use]
    pub fn canonical(&self, word: &str) -> Option<&str> {
        self.case_map.get(&normalize_key(word)).map(String::as_str)
    }

    /// Canonical spelling of `member` on a built-in object
    #[must_use]
    pub fn canonical_member(&self, object: &str, member: &str) -> Option<&str> {
        self.object_methods
            .get(&object.to_lowercase())?
            .get(&member.to_lowercase())
            .map(String::as_str)
    }

    /// Whether `word` is listed in any `[keywords]` category
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(&normalize_key(word))
    }

    /// Operator symbols that get one space on each side
    ///
    /// Falls back to comparison and concatenation when the table names none.
    #[must_use]
    pub fn spaced_operators(&self) -> Vec<&str> {
        if self.spaced_operators.is_empty() {
            FALLBACK_SPACED_OPERATORS.to_vec()
        } else {
            self.spaced_operators.iter().map(String::as_str).collect()
        }
    }

    /// Whether `word` is a keyword operator that gets surrounding spaces
    #[must_use]
    pub fn is_spaced_keyword(&self, word: &str) -> bool {
        self.spaced_keywords.contains(&word.to_lowercase())
    }

    /// Matches any case-map key at word boundaries, longest phrase first
    #[must_use]
    pub fn keyword_pattern(&self) -> Option<&Regex> {
        self.keyword_re.as_ref()
    }

    /// Matches `<object> . <member>`, capturing both names
    #[must_use]
    pub fn object_pattern(&self) -> Option<&Regex> {
        self.object_re.as_ref()
    }

    #[must_use]
    pub fn origin(&self) -> &TableOrigin {
        &self.origin
    }

    #[must_use]
    pub fn fallback_reason(&self) -> Option<&StageError> {
        self.fallback_reason.as_ref()
    }

    /// Number of case-map entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.case_map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.case_map.is_empty() && self.object_methods.is_empty()
    }
}
