use std::sync::Mutex;

/// Pipeline-wide counters shared by every stage runner.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    published: usize,
    completed: usize,
    faults: usize,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub published: usize,
    pub completed: usize,
    pub faults: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                published: 0,
                completed: 0,
                faults: 0,
            }),
        }
    }

    pub fn record_published(&self, samples: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.published += samples;
        }
    }

    pub fn record_completed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.completed += 1;
        }
    }

    pub fn record_fault(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.faults += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                published: metrics.published,
                completed: metrics.completed,
                faults: metrics.faults,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_published(3);
        metrics.record_published(2);
        metrics.record_completed();
        metrics.record_fault();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                published: 5,
                completed: 1,
                faults: 1,
            }
        );
    }
}
