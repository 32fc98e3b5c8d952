//! Lookup observability: observer callbacks, severities and alerting.
//!
//! [`crate::resolve::resolve`] reports every lookup outcome to the observer configured in
//! [`crate::resolve::LookupOptions`]. Failures are classified with [`severity_for_error`] and
//! additionally raised through [`IndexObserver::on_alert`] when they reach the configured threshold.

use std::fmt;
use std::sync::Arc;

use crate::error::IndexError;
use crate::index::IndexKind;
use crate::key::Key;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LookupSeverity {
    /// Informational event.
    Info,
    /// A caller asked for something the index does not hold.
    Warning,
    /// The request itself was malformed (shape mismatch).
    Error,
    /// The index could not be built at all.
    Critical,
}

/// Context about one lookup.
#[derive(Debug, Clone)]
pub struct LookupContext {
    /// Variant of the index that was queried.
    pub kind: IndexKind,
    /// Size of the index at lookup time.
    pub size: usize,
    /// The keys that were resolved.
    pub keys: Vec<Key>,
}

impl LookupContext {
    fn keys_text(&self) -> String {
        let parts: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        format!("[{}]", parts.join(", "))
    }
}

/// Stats reported on a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    /// Number of resolved positions.
    pub positions: usize,
}

/// Observer interface for lookup outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IndexObserver: Send + Sync {
    /// Called when a lookup resolves.
    fn on_resolved(&self, _ctx: &LookupContext, _stats: LookupStats) {}

    /// Called when a lookup fails.
    fn on_failure(&self, _ctx: &LookupContext, _severity: LookupSeverity, _error: &IndexError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LookupContext, severity: LookupSeverity, error: &IndexError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Severity assigned to an error kind.
pub fn severity_for_error(error: &IndexError) -> LookupSeverity {
    match error {
        IndexError::InvalidLabel { .. } | IndexError::InvalidPosition { .. } => {
            LookupSeverity::Warning
        }
        IndexError::ShapeMismatch { .. } => LookupSeverity::Error,
        IndexError::ConstructionError { .. } => LookupSeverity::Critical,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IndexObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IndexObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IndexObserver for CompositeObserver {
    fn on_resolved(&self, ctx: &LookupContext, stats: LookupStats) {
        for o in &self.observers {
            o.on_resolved(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LookupContext, severity: LookupSeverity, error: &IndexError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LookupContext, severity: LookupSeverity, error: &IndexError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs lookup events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IndexObserver for StdErrObserver {
    fn on_resolved(&self, ctx: &LookupContext, stats: LookupStats) {
        eprintln!(
            "[index][ok] kind={} size={} keys={} positions={}",
            ctx.kind,
            ctx.size,
            ctx.keys_text(),
            stats.positions
        );
    }

    fn on_failure(&self, ctx: &LookupContext, severity: LookupSeverity, error: &IndexError) {
        eprintln!(
            "[index][{:?}] kind={} size={} keys={} err={}",
            severity,
            ctx.kind,
            ctx.size,
            ctx.keys_text(),
            error
        );
    }

    fn on_alert(&self, ctx: &LookupContext, severity: LookupSeverity, error: &IndexError) {
        eprintln!(
            "[ALERT][index][{:?}] kind={} size={} keys={} err={}",
            severity,
            ctx.kind,
            ctx.size,
            ctx.keys_text(),
            error
        );
    }
}
