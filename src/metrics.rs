// src/metrics.rs
//
// Counters for what the tracker did over its lifetime. Cheap to clone and
// hand to a render/diagnostics thread; export via logs or the summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TrackerMetrics {
    pub frames: Arc<AtomicU64>,
    pub objects_created: Arc<AtomicU64>,
    pub objects_removed: Arc<AtomicU64>,
    pub touches_started: Arc<AtomicU64>,
    pub touches_released: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            objects_created: Arc::new(AtomicU64::new(0)),
            objects_removed: Arc::new(AtomicU64::new(0)),
            touches_started: Arc::new(AtomicU64::new(0)),
            touches_released: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames: self.frames.load(Ordering::Relaxed),
            fps: self.fps(),
            objects_created: self.objects_created.load(Ordering::Relaxed),
            objects_removed: self.objects_removed.load(Ordering::Relaxed),
            touches_started: self.touches_started.load(Ordering::Relaxed),
            touches_released: self.touches_released.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for TrackerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub frames: u64,
    pub fps: f64,
    pub objects_created: u64,
    pub objects_removed: u64,
    pub touches_started: u64,
    pub touches_released: u64,
    pub elapsed_secs: f64,
}
