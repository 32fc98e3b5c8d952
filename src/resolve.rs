//! Unified lookup entrypoint.
//!
//! Most consumers should go through [`resolve`], which resolves keys against any index variant
//! with the configured [`RangePolicy`] and reports the outcome to the configured observer.

use std::fmt;
use std::sync::Arc;

use crate::error::IndexResult;
use crate::index::{AnyIndex, Index, IndexKind, Positional, RangePolicy};
use crate::key::{Key, Positions};
use crate::observability::{
    IndexObserver, LookupContext, LookupSeverity, LookupStats, severity_for_error,
};

/// Options controlling label lookups.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LookupOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IndexObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LookupSeverity,
    /// How flat label ranges treat endpoints missing from the index.
    pub range_policy: RangePolicy,
}

impl fmt::Debug for LookupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("range_policy", &self.range_policy)
            .finish()
    }
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LookupSeverity::Error,
            range_policy: RangePolicy::default(),
        }
    }
}

/// Resolves `keys` against `index`.
///
/// When an observer is configured, this function reports:
///
/// - `on_resolved` on success, with the number of positions
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```rust
/// use std::sync::Arc;
///
/// use rust_data_index::index::{AnyIndex, Index, RangePolicy};
/// use rust_data_index::observability::{LookupSeverity, StdErrObserver};
/// use rust_data_index::resolve::{resolve, LookupOptions};
/// use rust_data_index::{keys, Positions};
///
/// let idx = AnyIndex::from(Index::new(["a", "b", "c", "d"]));
/// let opts = LookupOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     alert_at_or_above: LookupSeverity::Warning,
///     range_policy: RangePolicy::Strict,
/// };
///
/// assert_eq!(resolve(&idx, &keys!["b"..="c"], &opts).unwrap(), Positions::Multiple(vec![1, 2]));
/// // a missing range end is an error under the strict policy
/// assert!(resolve(&idx, &keys!["b"..="z"], &opts).is_err());
/// ```
pub fn resolve(index: &AnyIndex, keys: &[Key], options: &LookupOptions) -> IndexResult<Positions> {
    let result = index.pos_with(keys, options.range_policy);
    report(index.kind(), index.size(), keys, &result, options);
    result
}

/// [`resolve`] for a flat column index that is not wrapped in an [`AnyIndex`].
pub(crate) fn resolve_flat(
    index: &Index,
    keys: &[Key],
    options: &LookupOptions,
) -> IndexResult<Positions> {
    let result = index.pos_with(keys, options.range_policy);
    report(IndexKind::Flat, index.size(), keys, &result, options);
    result
}

fn report(
    kind: IndexKind,
    size: usize,
    keys: &[Key],
    result: &IndexResult<Positions>,
    options: &LookupOptions,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    let ctx = LookupContext {
        kind,
        size,
        keys: keys.to_vec(),
    };
    match result {
        Ok(positions) => obs.on_resolved(&ctx, LookupStats { positions: positions.len() }),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(&ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(&ctx, sev, e);
            }
        }
    }
}

/// Owned lookup request, for callers that queue lookups and run them later.
#[derive(Clone)]
pub struct LookupRequest {
    /// Index to resolve against.
    pub index: AnyIndex,
    /// Keys to resolve.
    pub keys: Vec<Key>,
    /// Options controlling the lookup.
    pub options: LookupOptions,
}

impl fmt::Debug for LookupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupRequest")
            .field("kind", &self.index.kind())
            .field("size", &self.index.size())
            .field("keys", &self.keys)
            .field("options", &self.options)
            .finish()
    }
}

impl LookupRequest {
    /// Execute the request by calling [`resolve`].
    pub fn run(&self) -> IndexResult<Positions> {
        resolve(&self.index, &self.keys, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{LookupOptions, LookupRequest, resolve};
    use crate::error::IndexError;
    use crate::index::{AnyIndex, CategoricalIndex, Index, RangePolicy};
    use crate::key::{Key, Positions};
    use crate::keys;
    use crate::observability::{IndexObserver, LookupContext, LookupSeverity, LookupStats};

    #[derive(Default)]
    struct Recording {
        resolved: Mutex<Vec<usize>>,
        failures: Mutex<Vec<LookupSeverity>>,
        alerts: Mutex<Vec<LookupSeverity>>,
    }

    impl IndexObserver for Recording {
        fn on_resolved(&self, _ctx: &LookupContext, stats: LookupStats) {
            self.resolved.lock().unwrap().push(stats.positions);
        }

        fn on_failure(&self, _ctx: &LookupContext, severity: LookupSeverity, _error: &IndexError) {
            self.failures.lock().unwrap().push(severity);
        }

        fn on_alert(&self, _ctx: &LookupContext, severity: LookupSeverity, _error: &IndexError) {
            self.alerts.lock().unwrap().push(severity);
        }
    }

    #[test]
    fn success_reports_position_count() {
        let obs = Arc::new(Recording::default());
        let opts = LookupOptions {
            observer: Some(obs.clone()),
            ..Default::default()
        };
        let idx = AnyIndex::from(CategoricalIndex::new(["a", "b", "a"]));
        assert_eq!(resolve(&idx, &keys!["a"], &opts).unwrap(), Positions::Multiple(vec![0, 2]));
        assert_eq!(*obs.resolved.lock().unwrap(), vec![2]);
    }

    #[test]
    fn missing_label_is_a_warning_below_default_threshold() {
        let obs = Arc::new(Recording::default());
        let opts = LookupOptions {
            observer: Some(obs.clone()),
            ..Default::default()
        };
        let idx = AnyIndex::from(Index::new(["a"]));
        assert!(resolve(&idx, &keys!["z"], &opts).is_err());
        assert_eq!(*obs.failures.lock().unwrap(), vec![LookupSeverity::Warning]);
        assert!(obs.alerts.lock().unwrap().is_empty());
    }

    #[test]
    fn lowered_threshold_raises_alerts() {
        let obs = Arc::new(Recording::default());
        let opts = LookupOptions {
            observer: Some(obs.clone()),
            alert_at_or_above: LookupSeverity::Warning,
            ..Default::default()
        };
        let idx = AnyIndex::from(Index::new(["a"]));
        assert!(resolve(&idx, &keys![4], &opts).is_err());
        assert_eq!(*obs.alerts.lock().unwrap(), vec![LookupSeverity::Warning]);
    }

    #[test]
    fn range_policy_is_applied() {
        let idx = AnyIndex::from(Index::new(["a", "b", "c"]));
        let legacy = LookupOptions::default();
        let strict = LookupOptions {
            range_policy: RangePolicy::Strict,
            ..Default::default()
        };
        assert_eq!(
            resolve(&idx, &keys!["b"..="q"], &legacy).unwrap(),
            Positions::Multiple(vec![1, 2])
        );
        assert!(resolve(&idx, &keys!["b"..="q"], &strict).is_err());
    }

    #[test]
    fn request_runs_and_debug_hides_observer() {
        let req = LookupRequest {
            index: AnyIndex::from(Index::new(["a", "b"])),
            keys: vec![Key::from("b")],
            options: LookupOptions::default(),
        };
        assert_eq!(req.run().unwrap(), Positions::Single(1));
        let text = format!("{req:?}");
        assert!(text.contains("observer_set: false"));
        assert!(text.contains("kind: Flat"));
    }
}
