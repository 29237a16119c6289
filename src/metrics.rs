//! Metrics and observability for exif_trail

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use serde::{Deserialize, Serialize};

use crate::report::{ExifSection, GpsSection, Report};

/// Global metrics collector
#[derive(Default)]
pub struct Metrics {
    pub total_requests: AtomicU64,
    pub successful_requests: AtomicU64,
    pub failed_requests: AtomicU64,
    pub total_latency_ms: AtomicU64,

    // Per-operation counters
    pub exif_inspect_count: AtomicU64,
    pub gps_convert_count: AtomicU64,

    // Inspection outcomes
    pub exif_missing_count: AtomicU64,
    pub exif_error_count: AtomicU64,
    pub gps_found_count: AtomicU64,
    pub gps_incomplete_count: AtomicU64,
    pub gps_absent_count: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, op: &str, success: bool, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        match op {
            "exif.inspect" => { self.exif_inspect_count.fetch_add(1, Ordering::Relaxed); }
            "gps.convert" => { self.gps_convert_count.fetch_add(1, Ordering::Relaxed); }
            _ => {}
        }
    }

    /// Count the display states a report ended in
    pub fn record_report(&self, report: &Report) {
        match report.exif {
            ExifSection::Missing | ExifSection::Empty => {
                self.exif_missing_count.fetch_add(1, Ordering::Relaxed);
            }
            ExifSection::Error { .. } => {
                self.exif_error_count.fetch_add(1, Ordering::Relaxed);
            }
            ExifSection::Present { .. } => {}
        }

        let counter = match report.gps {
            GpsSection::CoordinatesFound { .. } => &self.gps_found_count,
            GpsSection::GpsBlockIncomplete { .. } => &self.gps_incomplete_count,
            GpsSection::NoGpsBlock => &self.gps_absent_count,
            // No verdict to count
            GpsSection::NotInspected => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            error_rate: if total > 0 { failed as f64 / total as f64 } else { 0.0 },
            avg_latency_ms: if total > 0 { total_latency / total } else { 0 },
            operations: OperationMetrics {
                exif_inspect: self.exif_inspect_count.load(Ordering::Relaxed),
                gps_convert: self.gps_convert_count.load(Ordering::Relaxed),
            },
            outcomes: OutcomeMetrics {
                exif_missing: self.exif_missing_count.load(Ordering::Relaxed),
                exif_error: self.exif_error_count.load(Ordering::Relaxed),
                gps_found: self.gps_found_count.load(Ordering::Relaxed),
                gps_incomplete: self.gps_incomplete_count.load(Ordering::Relaxed),
                gps_absent: self.gps_absent_count.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub error_rate: f64,
    pub avg_latency_ms: u64,
    pub operations: OperationMetrics,
    pub outcomes: OutcomeMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub exif_inspect: u64,
    pub gps_convert: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    pub exif_missing: u64,
    pub exif_error: u64,
    pub gps_found: u64,
    pub gps_incomplete: u64,
    pub gps_absent: u64,
}

/// Timer for tracking operation latency
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
