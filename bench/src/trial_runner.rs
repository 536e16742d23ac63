use crate::analytics::aggregator::MetricsAggregator;
use crate::bench_error::BenchError;
use crate::context::SuiteContext;
use crate::input::Input;
use crate::orchestrator::state::TrialState;
use crate::orchestrator::trace::RawTrace;
use crate::orchestrator::ProcessOrchestrator;
use crate::suite_directory::{write_json, SuiteDirectory, INPUT_FILE_NAME, OUTPUT_FILE_NAME};
use crate::topology::Topology;
use crate::validatable::Validatable;
use futures::FutureExt;
use paxos_bench_report::output::Output;
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info};

/// Step of a trial in which it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Validation,
    Topology,
    Launching,
    Warmup,
    Measuring,
    Draining,
    Aggregation,
    Panic,
}

impl TrialPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialPhase::Validation => "validation",
            TrialPhase::Topology => "topology",
            TrialPhase::Launching => "launching",
            TrialPhase::Warmup => "warmup",
            TrialPhase::Measuring => "measuring",
            TrialPhase::Draining => "draining",
            TrialPhase::Aggregation => "aggregation",
            TrialPhase::Panic => "panic",
        }
    }
}

impl From<TrialState> for TrialPhase {
    fn from(state: TrialState) -> Self {
        match state {
            TrialState::Warmup => TrialPhase::Warmup,
            TrialState::Measuring => TrialPhase::Measuring,
            TrialState::Draining | TrialState::Completed => TrialPhase::Draining,
            TrialState::Created
            | TrialState::Launching
            | TrialState::Failed
            | TrialState::TimedOut => TrialPhase::Launching,
        }
    }
}

impl Display for TrialPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("trial failed during {phase}: {cause}")]
pub struct TrialError {
    pub phase: TrialPhase,
    #[source]
    pub cause: BenchError,
}

impl TrialError {
    pub fn new(phase: TrialPhase, cause: BenchError) -> Self {
        Self { phase, cause }
    }
}

/// Runs one input end to end: validation, topology, orchestration and aggregation. Every
/// failure, including a panic, comes back as a [`TrialError`].
pub struct TrialRunner<'a> {
    context: &'a SuiteContext,
    aggregator: MetricsAggregator,
}

impl<'a> TrialRunner<'a> {
    pub fn new(context: &'a SuiteContext) -> Self {
        Self {
            context,
            aggregator: MetricsAggregator::default(),
        }
    }

    /// Runs trial `index` inside `suite_root`. Its ports come from slot
    /// `index % parallelism`, so concurrently running trials never collide.
    pub async fn run(
        &self,
        index: usize,
        input: &Input,
        suite_root: &Path,
    ) -> Result<Output, TrialError> {
        guard_panics(self.run_trial(index, input, suite_root)).await
    }

    async fn run_trial(
        &self,
        index: usize,
        input: &Input,
        suite_root: &Path,
    ) -> Result<Output, TrialError> {
        input
            .validate()
            .map_err(|cause| TrialError::new(TrialPhase::Validation, cause))?;

        let slot = (index % self.context.parallelism()) as u32;
        let topology = Topology::build(input, &self.context.config.topology, slot)
            .map_err(|cause| TrialError::new(TrialPhase::Topology, cause))?;

        let launching = |cause| TrialError::new(TrialPhase::Launching, cause);
        let trial_dir = SuiteDirectory::create_trial_dir(suite_root, index).map_err(launching)?;
        write_json(&trial_dir.join(INPUT_FILE_NAME), input).map_err(launching)?;
        debug!("Trial directory: {}", trial_dir.display());

        let record = ProcessOrchestrator::new(input, &topology, &trial_dir, &self.context.config)
            .run()
            .await;
        if let Some(failure) = record.failure {
            return Err(TrialError::new(failure.during.into(), failure.error));
        }
        let measurement = record.measurement.ok_or_else(|| {
            TrialError::new(
                TrialPhase::Measuring,
                BenchError::InsufficientDataError("measurement never started".to_owned()),
            )
        })?;

        let aggregation = |cause| TrialError::new(TrialPhase::Aggregation, cause);
        let mut traces = Vec::with_capacity(record.trace_files.len());
        for path in &record.trace_files {
            traces.push(RawTrace::read(path).await.map_err(aggregation)?);
        }
        let trace = RawTrace::merge(traces);
        info!("Aggregating {} completion event(s)", trace.len());
        let output = self
            .aggregator
            .summarize(&trace, &measurement, input.workload.phase_labels())
            .map_err(aggregation)?;
        write_json(&trial_dir.join(OUTPUT_FILE_NAME), &output).map_err(aggregation)?;
        Ok(output)
    }
}

/// Turns a panic raised while polling `trial` into a failed trial.
pub async fn guard_panics<F>(trial: F) -> Result<Output, TrialError>
where
    F: Future<Output = Result<Output, TrialError>>,
{
    match AssertUnwindSafe(trial).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Trial panicked: {message}");
            Err(TrialError::new(
                TrialPhase::Panic,
                BenchError::TrialPanicked(message),
            ))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
