//! Content-serving metrics.
//!
//! Tracks how often requested locales had to fall back to the default and
//! how the privacy-policy cache is behaving. Exposed on `/health` so that
//! misconfigured links and locale typos are visible to operators even though
//! visitors still receive default-locale content.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global content metrics singleton.
pub struct ContentMetrics {
    /// Number of locale resolutions performed
    resolutions: AtomicUsize,

    /// Number of resolutions that fell back to the default locale
    fallbacks: AtomicUsize,

    /// Number of privacy-policy lookups served from cache
    cache_hits: AtomicUsize,

    /// Number of privacy-policy lookups that populated the cache
    cache_misses: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<ContentMetrics> = OnceLock::new();

impl ContentMetrics {
    pub(crate) fn new() -> Self {
        Self {
            resolutions: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
        }
    }

    /// Get the global content metrics instance.
    pub fn global() -> &'static ContentMetrics {
        METRICS.get_or_init(ContentMetrics::new)
    }

    /// Record a locale resolution; `fell_back` marks a rejected input.
    pub fn record_resolution(&self, fell_back: bool) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        if fell_back {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let resolutions = self.resolutions();
        let fallbacks = self.fallbacks();
        let fallback_rate = if resolutions > 0 {
            (fallbacks as f64 / resolutions as f64) * 100.0
        } else {
            0.0
        };

        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            locale_resolutions: resolutions,
            locale_fallbacks: fallbacks,
            locale_fallback_rate: fallback_rate,
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
        }
    }
}

/// Snapshot of the content metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub locale_resolutions: usize,
    pub locale_fallbacks: usize,

    /// Fallback rate as a percentage (0-100)
    pub locale_fallback_rate: f64,

    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,
}
