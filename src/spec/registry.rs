//! Process-wide access to the canonical case table.
//!
//! The table is loaded on first use and shared through an `Arc`. Concurrent
//! first callers block on the write lock, so the load runs exactly once.
//! A table that fails to load is replaced by the builtin one and the reason
//! is kept for reporting.
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::StageError;
use crate::spec::table::{CanonicalCaseTable, TableOrigin};

/// Table shipped with the crate
pub const BUNDLED_TABLE: &str = include_str!("keywords.toml");

/// Where the table is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    Bundled,
    File(PathBuf),
    Inline(String),
}

fn load(source: &SpecSource) -> Result<CanonicalCaseTable, StageError> {
    match source {
        SpecSource::Bundled => CanonicalCaseTable::parse_toml(BUNDLED_TABLE, TableOrigin::Bundled),
        SpecSource::File(path) => {
            let text = fs::read_to_string(path).map_err(|e| StageError::SpecTable {
                reason: format!("{}: {e}", path.display()),
            })?;
            CanonicalCaseTable::parse_toml(&text, TableOrigin::File(path.display().to_string()))
        }
        SpecSource::Inline(text) => CanonicalCaseTable::parse_toml(text, TableOrigin::Bundled),
    }
}

/// Lazily loaded, invalidatable case table
#[derive(Debug)]
pub struct SpecRegistry {
    source: SpecSource,
    table: RwLock<Option<Arc<CanonicalCaseTable>>>,
}

impl SpecRegistry {
    #[must_use]
    pub fn new(source: SpecSource) -> Self {
        Self {
            source,
            table: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn bundled() -> Self {
        Self::new(SpecSource::Bundled)
    }

    #[must_use]
    pub fn source(&self) -> &SpecSource {
        &self.source
    }

    /// Current table, loading it on first use
    #[must_use]
    pub fn table(&self) -> Arc<CanonicalCaseTable> {
        {
            let guard = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = guard.as_ref() {
                return Arc::clone(table);
            }
        }

        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.as_ref() {
            return Arc::clone(table);
        }
        let table = match load(&self.source) {
            Ok(table) => table,
            Err(err) => CanonicalCaseTable::builtin().with_fallback_reason(err),
        };
        let table = Arc::new(table);
        *guard = Some(Arc::clone(&table));
        table
    }

    /// Whether the table has been loaded since the last invalidation
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the loaded table; the next access reloads it
    pub fn invalidate(&self) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for SpecRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_bundled_table_loads() {
        let registry = SpecRegistry::bundled();
        let table = registry.table();
        assert!(table.fallback_reason().is_none(), "{:?}", table.fallback_reason());
        assert_eq!(table.origin(), &TableOrigin::Bundled);
        assert_eq!(table.canonical("response"), Some("Response"));
        assert_eq!(table.canonical("cstr"), Some("CStr"));
        assert_eq!(table.canonical_member("server", "mappath"), Some("MapPath"));
    }

    #[test]
    fn test_loaded_once_and_shared() {
        let registry = SpecRegistry::bundled();
        let a = registry.table();
        let b = registry.table();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_concurrent_first_access() {
        let registry = Arc::new(SpecRegistry::bundled());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.table())
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
    }

    #[test]
    fn test_invalidate_reloads() {
        let registry = SpecRegistry::bundled();
        let first = registry.table();
        registry.invalidate();
        assert!(!registry.is_loaded());
        let second = registry.table();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let registry = SpecRegistry::new(SpecSource::File(PathBuf::from(
            "/nonexistent/aspfmt/keywords.toml",
        )));
        let table = registry.table();
        assert_eq!(table.origin(), &TableOrigin::Builtin);
        assert!(table.fallback_reason().is_some());
        assert_eq!(table.canonical("end if"), Some("End If"));
    }

    #[test]
    fn test_malformed_inline_falls_back() {
        let registry = SpecRegistry::new(SpecSource::Inline("case_map = [".to_string()));
        let table = registry.table();
        assert!(matches!(
            table.fallback_reason(),
            Some(StageError::SpecTable { .. })
        ));
    }
}
