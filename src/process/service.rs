//! `FormatService` - the formatter's public operation surface
//!
//! One service is built per process and shared by reference (it is
//! `Send + Sync`). It owns the case table registry and the analysis cache,
//! so there is no hidden global state. No failure crosses this boundary:
//! a panic inside the pipeline echoes the input and becomes a diagnostic.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::process::cache::{content_hash, AnalysisCache};
use crate::process::pipeline::{
    analyze_text, format_text, AnalysisResult, FormatOutput, PositionInfo,
};
use crate::region::{self, RegionSpan};
use crate::spec::{CanonicalCaseTable, SpecRegistry, SpecSource};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn aborted(payload: &(dyn Any + Send)) -> Diagnostic {
    Diagnostic::new(
        None,
        DiagnosticKind::StageFailure,
        format!(
            "Formatting aborted, input left unchanged: {}",
            panic_message(payload)
        ),
    )
}

/// Formatter entry point shared by the CLI and library callers
#[derive(Debug)]
pub struct FormatService {
    config: Config,
    registry: SpecRegistry,
    cache: AnalysisCache,
}

impl FormatService {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let source = match &config.spec_table {
            Some(path) => SpecSource::File(path.clone()),
            None => SpecSource::Bundled,
        };
        Self::with_registry(config, SpecRegistry::new(source))
    }

    #[must_use]
    pub fn with_registry(config: Config, registry: SpecRegistry) -> Self {
        let cache = AnalysisCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self {
            config,
            registry,
            cache,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current case table, loading it on first use
    #[must_use]
    pub fn spec_table(&self) -> Arc<CanonicalCaseTable> {
        self.registry.table()
    }

    /// Warning to report when the case table fell back to the builtin one
    #[must_use]
    pub fn spec_warning(&self) -> Option<Diagnostic> {
        let table = self.registry.table();
        table
            .fallback_reason()
            .map(|err| Diagnostic::from_stage_error(None, err))
    }

    #[must_use]
    pub fn detect_regions(&self, text: &str) -> Vec<RegionSpan> {
        region::detect_regions(text)
    }

    #[must_use]
    pub fn is_in_script_region(&self, text: &str, offset: usize) -> bool {
        region::is_in_script_region(text, offset)
    }

    /// Format text with the service configuration
    #[must_use]
    pub fn format(&self, text: &str) -> String {
        self.run_format(&self.config, text).text
    }

    /// Format a document known by `id`, reporting diagnostics
    ///
    /// When the text changes, cached analyses for `id` are dropped.
    #[must_use]
    pub fn format_document(&self, id: &str, text: &str) -> FormatOutput {
        self.format_document_with(&self.config, id, text)
    }

    /// Format a document with a per-document configuration
    #[must_use]
    pub fn format_document_with(&self, config: &Config, id: &str, text: &str) -> FormatOutput {
        let output = self.run_format(config, text);
        if output.changed {
            self.cache.invalidate(id);
        }
        output
    }

    fn run_format(&self, config: &Config, text: &str) -> FormatOutput {
        let table = self.registry.table();
        catch_unwind(AssertUnwindSafe(|| format_text(text, config, &table)))
            .unwrap_or_else(|payload| FormatOutput::unchanged(text, vec![aborted(&*payload)]))
    }

    /// Structural analysis of a document, served from cache when fresh
    #[must_use]
    pub fn analyze(&self, id: &str, text: &str) -> Arc<AnalysisResult> {
        let hash = content_hash(text);
        if let Some(hit) = self.cache.get(id, hash) {
            return hit;
        }
        let limits = self.config.limits;
        let analysis = catch_unwind(AssertUnwindSafe(|| analyze_text(text, limits)))
            .unwrap_or_else(|payload| AnalysisResult::empty(vec![aborted(&*payload)]));
        let analysis = Arc::new(analysis);
        self.cache.insert(id, hash, Arc::clone(&analysis));
        analysis
    }

    /// Line, region and block at a byte offset of a document
    #[must_use]
    pub fn position_at(&self, id: &str, text: &str, offset: usize) -> Option<PositionInfo> {
        self.analyze(id, text).position_at(offset)
    }

    pub fn invalidate_cache(&self, id: &str) {
        self.cache.invalidate(id);
    }

    /// Drop every cached analysis and the loaded case table
    pub fn clear_all_caches(&self) {
        self.cache.clear();
        self.registry.invalidate();
    }
}

impl Default for FormatService {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
