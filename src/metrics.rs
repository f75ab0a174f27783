// Resolution metrics
//
// Lightweight counters for how much derivation work a build context performed

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-context resolution metrics
///
/// Uses atomic operations so the once cache and the derivation services can record
/// from any thread without locks.
#[derive(Debug)]
pub struct Metrics {
    /// Number of once-cache factories executed
    pub computations: AtomicU64,

    /// Number of once-cache lookups answered from a stored value
    pub cache_hits: AtomicU64,

    /// Number of global configs loaded or synthesized
    pub global_configs_resolved: AtomicU64,

    /// Number of boot image variants derived
    pub boot_images_built: AtomicU64,

    /// Context creation time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            computations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            global_configs_resolved: AtomicU64::new(0),
            boot_images_built: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_global_config_resolved(&self) {
        self.global_configs_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_boot_image_built(&self) {
        self.boot_images_built.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the owning context was created
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fraction of lookups served from the cache
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let total = hits + self.computations.load(Ordering::Relaxed);
        if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Resolution metrics: {} computations, {} cache hits ({:.0}% hit ratio)",
            self.computations.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
            self.hit_ratio() * 100.0
        );
        tracing::info!(
            "Derived {} global config(s) and {} boot image variant(s) in {:.2}ms",
            self.global_configs_resolved.load(Ordering::Relaxed),
            self.boot_images_built.load(Ordering::Relaxed),
            self.uptime().as_secs_f64() * 1000.0
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.computations.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.boot_images_built.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_hit_ratio() {
        let metrics = Metrics::new();
        assert_eq!(metrics.hit_ratio(), 0.0);

        metrics.record_computation();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();

        assert_eq!(metrics.hit_ratio(), 0.75);
    }

    #[test]
    fn test_derivation_counters() {
        let metrics = Metrics::new();

        metrics.record_global_config_resolved();
        metrics.record_boot_image_built();
        metrics.record_boot_image_built();

        assert_eq!(metrics.global_configs_resolved.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.boot_images_built.load(Ordering::Relaxed), 2);
    }
}
