use crate::model::TelemetryDataset;
use crate::prelude::{ProcessingStage, StageError, StageKind, StageOutput, StageResult};
use crate::processing::plot_buffer::PlotBuffer;
use crate::sync::BinaryLatch;
use crate::telemetry::{LogManager, MetricsRecorder};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

/// Lifecycle of a stage. `Complete` and `Failed` are terminal and both release the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageState {
    Pending,
    Running,
    Complete,
    Failed,
}

impl StageState {
    pub fn is_terminal(self) -> bool {
        matches!(self, StageState::Complete | StageState::Failed)
    }
}

/// Shared handle to one stage: its live plot buffer, its completion latch and, once the
/// latch fires, its outcome.
///
/// Successors reach the completed output only through [`join`](Self::join), so they never
/// observe a partial result. Live consumers read the in-progress rows through
/// [`plot`](Self::plot).
pub struct StageHandle {
    kind: StageKind,
    predecessor: Option<Arc<StageHandle>>,
    state: Mutex<StageState>,
    latch: BinaryLatch,
    outcome: OnceLock<StageResult<Arc<StageOutput>>>,
    plot: Arc<PlotBuffer>,
}

impl StageHandle {
    pub fn new(kind: StageKind, predecessor: Option<Arc<StageHandle>>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            predecessor,
            state: Mutex::new(StageState::Pending),
            latch: BinaryLatch::new(),
            outcome: OnceLock::new(),
            plot: Arc::new(PlotBuffer::new()),
        })
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn predecessor(&self) -> Option<&Arc<StageHandle>> {
        self.predecessor.as_ref()
    }

    pub fn state(&self) -> StageState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn plot(&self) -> &Arc<PlotBuffer> {
        &self.plot
    }

    /// Blocks until the stage finishes and returns its outcome.
    pub fn join(&self) -> StageResult<Arc<StageOutput>> {
        self.latch.wait();
        self.outcome.get().cloned().unwrap_or_else(|| {
            Err(StageError::Internal(format!(
                "{} released without an outcome",
                self.kind
            )))
        })
    }

    /// Completed output, or `None` while the stage is pending, running or failed.
    pub fn result(&self) -> Option<Arc<StageOutput>> {
        if !self.latch.is_released() {
            return None;
        }
        self.outcome.get().and_then(|outcome| outcome.clone().ok())
    }

    fn set_state(&self, next: StageState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn finish(&self, outcome: StageResult<Arc<StageOutput>>) {
        let next = if outcome.is_ok() {
            StageState::Complete
        } else {
            StageState::Failed
        };
        // A second finish keeps the first outcome; the latch release below is idempotent.
        let _ = self.outcome.set(outcome);
        self.set_state(next);
        self.latch.release();
    }
}

/// Runs `stage` on a dedicated thread against `handle`.
pub fn spawn_stage<S>(
    stage: S,
    handle: Arc<StageHandle>,
    metrics: Arc<MetricsRecorder>,
) -> StageResult<JoinHandle<()>>
where
    S: ProcessingStage + 'static,
{
    let name = format!("stage-{}", handle.kind().number());
    let mut stage = stage;
    thread::Builder::new()
        .name(name)
        .spawn(move || run_stage(&mut stage, &handle, &metrics))
        .map_err(|err| StageError::Internal(format!("spawning stage thread: {}", err)))
}

/// Waits for the predecessor, computes, then records the outcome and releases the latch.
///
/// The latch is released on every path, including a predecessor failure or a panic inside
/// `compute`, so successors always wake and can observe the failure.
pub fn run_stage<S>(stage: &mut S, handle: &StageHandle, metrics: &MetricsRecorder)
where
    S: ProcessingStage + ?Sized,
{
    let logger = LogManager::for_stage(handle.kind());
    handle.set_state(StageState::Running);

    let outcome = execute(stage, handle, &logger);
    metrics.record_published(handle.plot().len());

    match &outcome {
        Ok(output) => {
            metrics.record_completed();
            logger.record(&format!(
                "complete: {} samples, rms velocity error {:.4} m/s",
                output.metadata.sample_count, output.metadata.rms_velocity_error
            ));
        }
        Err(err) => {
            metrics.record_fault();
            logger.fault(&format!("aborted: {}", err));
        }
    }

    handle.finish(outcome.map(Arc::new));
}

fn execute<S>(stage: &mut S, handle: &StageHandle, logger: &LogManager) -> StageResult<StageOutput>
where
    S: ProcessingStage + ?Sized,
{
    if stage.kind() != handle.kind() {
        return Err(StageError::Internal(format!(
            "{} scheduled on the handle for {}",
            stage.kind(),
            handle.kind()
        )));
    }

    let prior = match handle.predecessor() {
        Some(predecessor) => {
            let output = predecessor
                .join()
                .map_err(|err| StageError::UpstreamFailed {
                    stage: predecessor.kind(),
                    reason: err.to_string(),
                })?;
            Some(output)
        }
        None => None,
    };

    logger.record("started");
    let plot = handle.plot().clone();
    panic::catch_unwind(AssertUnwindSafe(|| stage.compute(prior, &plot))).unwrap_or_else(|_| {
        Err(StageError::Internal(format!(
            "{} panicked during compute",
            handle.kind()
        )))
    })
}

/// `(velocity, altitude)` recorded at `t`, which every stage key is drawn from.
pub(crate) fn sample_at(dataset: &TelemetryDataset, t: f64) -> StageResult<(f64, f64)> {
    match (dataset.velocity_at(t), dataset.altitude_at(t)) {
        (Some(v), Some(alt)) => Ok((v, alt)),
        _ => Err(StageError::Internal(format!(
            "no telemetry recorded at t = {}",
            t
        ))),
    }
}
