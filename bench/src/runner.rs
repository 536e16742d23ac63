use crate::bench_error::BenchError;
use crate::context::SuiteContext;
use crate::input::Input;
use crate::suite_directory::{SuiteDirectory, ARGS_FILE_NAME, HARDWARE_FILE_NAME};
use crate::suites::Suite;
use crate::topology::Topology;
use crate::trial_runner::{TrialError, TrialRunner};
use crate::validatable::Validatable;
use futures::stream::{self, StreamExt};
use human_repr::HumanDuration;
use paxos_bench_report::host::HostSnapshot;
use paxos_bench_report::output::Output;
use paxos_bench_report::result_row::ResultRow;
use serde_json::Map;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

/// Where a finished suite left its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub root: PathBuf,
    pub completed: usize,
    pub failed: usize,
}

/// Outcome of validating one input without running it.
#[derive(Debug)]
pub struct DryRunEntry {
    pub index: usize,
    pub input: Input,
    pub rejection: Option<BenchError>,
}

pub struct SuiteRunner {
    context: SuiteContext,
    suite: Box<dyn Suite>,
}

impl SuiteRunner {
    pub fn new(context: SuiteContext, suite: Box<dyn Suite>) -> Self {
        Self { context, suite }
    }

    /// Runs every input of the suite and appends exactly one row per input, in generation
    /// order, whatever the outcome of the trial.
    pub async fn run(&self) -> Result<SuiteReport, BenchError> {
        let inputs = self.suite.inputs();
        let mut directory =
            SuiteDirectory::acquire(&self.context.suite_directory, self.suite.name())?;
        directory.write_json(ARGS_FILE_NAME, &self.context)?;
        let host = HostSnapshot::capture(self.context.identifier.clone());
        directory.write_json(HARDWARE_FILE_NAME, &host)?;
        let idle_cores = host.idle_cores_per_trial(self.context.parallelism());
        if idle_cores < 1.0 {
            warn!(
                "Only {idle_cores:.1} idle core(s) per trial on {} ({} cores, load {:.2}), \
                latencies may reflect host contention",
                host.identifier.as_deref().unwrap_or("this host"),
                host.logical_cores,
                host.load_average
            );
        }
        directory.write_inputs(inputs.iter())?;
        info!(
            "Running suite {} with {} trial(s) ({} distinct x {}), parallelism {}",
            self.suite.name(),
            inputs.len(),
            inputs.distinct(),
            inputs.repetitions(),
            self.context.parallelism()
        );

        let trial_runner = TrialRunner::new(&self.context);
        let root = directory.root().to_path_buf();
        let mut trials = stream::iter(inputs.iter().enumerate())
            .map(|(index, input)| {
                let trial_runner = &trial_runner;
                let root = &root;
                async move {
                    info!("Starting trial {index}");
                    let started = Instant::now();
                    let result = trial_runner.run(index, &input, root).await;
                    info!("Trial {index} took {}", started.elapsed().human_duration());
                    (index, input, result)
                }
                .instrument(info_span!("trial", index))
            })
            .buffered(self.context.parallelism());

        let (mut completed, mut failed) = (0, 0);
        while let Some((index, input, result)) = trials.next().await {
            let row = self.row(index, &input, &result);
            match &result {
                Ok(output) => {
                    completed += 1;
                    output.print_summary(index);
                    info!("{}", self.suite.summarize(&input, output));
                }
                Err(trial_error) => {
                    failed += 1;
                    error!("Trial {index} failed: {trial_error}");
                }
            }
            info!("{}", row.formatted_string());
            directory.append_row(&row)?;
        }

        let root = directory.close()?;
        info!(
            "Suite {} finished: {completed} completed, {failed} failed, results in {}",
            self.suite.name(),
            root.display()
        );
        Ok(SuiteReport {
            root,
            completed,
            failed,
        })
    }

    fn row(&self, index: usize, input: &Input, result: &Result<Output, TrialError>) -> ResultRow {
        let columns = input.columns().unwrap_or_else(|error| {
            warn!("Cannot flatten input {index}: {error}");
            Map::new()
        });
        match result {
            Ok(output) => ResultRow::completed(index, columns, output),
            Err(trial_error) => {
                ResultRow::failed(index, columns, trial_error.phase, &trial_error.cause)
            }
        }
    }

    /// Validates every input and its placement without creating any directory or process.
    pub fn dry_run(&self) -> Vec<DryRunEntry> {
        self.suite
            .inputs()
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let slot = (index % self.context.parallelism()) as u32;
                let rejection = input
                    .validate()
                    .and_then(|_| Topology::build(&input, &self.context.config.topology, slot))
                    .err();
                DryRunEntry {
                    index,
                    input,
                    rejection,
                }
            })
            .collect()
    }
}
