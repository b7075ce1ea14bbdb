//! Cycle-based measurement collection.
//!
//! This module records elapsed cycle counts for named sections of code,
//! using two reads of the probe's cycle counter around each section.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::Result;
use crate::probe::{default_probe, CpuProbe};
use crate::types::CycleCount;

/// A single cycle measurement.
#[derive(Debug, Clone)]
pub struct Measurement {
    /// Section name
    pub label: String,
    /// Elapsed cycles
    pub cycles: u64,
}

/// Summary statistics for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStats {
    /// Total count of measurements
    pub count: usize,
    /// Sum of all values
    pub sum: u64,
    /// Minimum value
    pub min: u64,
    /// Maximum value
    pub max: u64,
    /// Average value
    pub avg: f64,
}

/// In-memory collector of cycle measurements.
#[derive(Debug, Default)]
pub struct CycleCollector {
    measurements: Mutex<Vec<Measurement>>,
}

impl CycleCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an elapsed cycle count under `label`.
    pub fn record(&self, label: &str, cycles: u64) {
        trace!(label, cycles, "recorded cycles");
        self.measurements.lock().push(Measurement {
            label: label.to_string(),
            cycles,
        });
    }

    /// Number of recorded measurements.
    pub fn len(&self) -> usize {
        self.measurements.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Statistics grouped by label.
    pub fn summary(&self) -> HashMap<String, CycleStats> {
        let measurements = self.measurements.lock();
        let mut grouped: HashMap<&str, Vec<u64>> = HashMap::new();
        for m in measurements.iter() {
            grouped.entry(m.label.as_str()).or_default().push(m.cycles);
        }

        grouped
            .into_iter()
            .filter_map(|(label, values)| {
                let min = *values.iter().min()?;
                let max = *values.iter().max()?;
                let count = values.len();
                let sum = values.iter().copied().fold(0u64, u64::saturating_add);
                Some((
                    label.to_string(),
                    CycleStats {
                        count,
                        sum,
                        min,
                        max,
                        avg: sum as f64 / count as f64,
                    },
                ))
            })
            .collect()
    }

    /// Clears all collected measurements.
    pub fn clear(&self) {
        self.measurements.lock().clear();
    }
}

/// Guard that records the cycles elapsed between creation and drop.
pub struct CycleGuard<'a> {
    collector: &'a CycleCollector,
    probe: &'a CpuProbe,
    label: &'a str,
    start: CycleCount,
}

impl<'a> CycleGuard<'a> {
    /// Starts timing with the default probe.
    pub fn new(collector: &'a CycleCollector, label: &'a str) -> Result<Self> {
        Self::with_probe(collector, default_probe(), label)
    }

    /// Starts timing with a specific probe.
    ///
    /// Fails with `UnsupportedFeature` when the probe has no cycle counter.
    pub fn with_probe(
        collector: &'a CycleCollector,
        probe: &'a CpuProbe,
        label: &'a str,
    ) -> Result<Self> {
        probe.memory_fence();
        let start = probe.read_cycle_counter()?;
        Ok(Self {
            collector,
            probe,
            label,
            start,
        })
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.probe.memory_fence();
        // Drop must not panic; an unreadable counter drops the sample.
        if let Ok(end) = self.probe.read_cycle_counter() {
            self.collector
                .record(self.label, end.elapsed_since(self.start));
        }
    }
}

/// Time a block in cycles, recording under `label` when a counter exists.
#[macro_export]
macro_rules! time_cycles {
    ($collector:expr, $label:expr, $block:expr) => {{
        let _guard = $crate::profiling::metrics::CycleGuard::new($collector, $label).ok();
        $block
    }};
}
