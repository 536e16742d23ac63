pub mod control;
pub mod launch;
pub mod process;
pub mod state;
pub mod trace;

use crate::bench_error::BenchError;
use crate::configs::bench_config::BenchConfig;
use crate::input::role::RoleInstance;
use crate::input::Input;
use crate::topology::{Address, Topology};
use crate::utils::duration::BenchDuration;
use crate::utils::time::{format_unix_micros, unix_micros_now};
use control::{await_files, write_measure_file, AwaitFailure};
use launch::{config_blob, ControlPaths, LaunchPlan};
use process::{Fleet, RoleProcess};
use state::TrialState;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Measurement phase as announced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementWindow {
    pub start_unix_micros: u64,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct OrchestrationFailure {
    /// State the trial was in when it failed or timed out.
    pub during: TrialState,
    pub error: BenchError,
}

/// What a finished orchestration leaves behind for aggregation.
#[derive(Debug)]
pub struct TrialRecord {
    pub state: TrialState,
    pub failure: Option<OrchestrationFailure>,
    pub measurement: Option<MeasurementWindow>,
    pub trace_files: Vec<PathBuf>,
    /// Shutdown invocations per spawned process.
    pub shutdowns: BTreeMap<RoleInstance, u32>,
}

impl TrialRecord {
    pub fn is_completed(&self) -> bool {
        self.state == TrialState::Completed
    }
}

/// Drives the role processes of one trial through launch, warmup, measurement and drain.
pub struct ProcessOrchestrator<'a> {
    input: &'a Input,
    topology: &'a Topology,
    trial_dir: &'a Path,
    config: &'a BenchConfig,
    state: TrialState,
    measurement: Option<MeasurementWindow>,
}

impl<'a> ProcessOrchestrator<'a> {
    pub fn new(
        input: &'a Input,
        topology: &'a Topology,
        trial_dir: &'a Path,
        config: &'a BenchConfig,
    ) -> Self {
        Self {
            input,
            topology,
            trial_dir,
            config,
            state: TrialState::Created,
            measurement: None,
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    /// Runs the trial to a terminal state. The watchdog covers everything from the start of
    /// launching; processes are shut down on every path before this returns.
    pub async fn run(mut self) -> TrialRecord {
        let timeout = self.input.phases.timeout.get_duration();
        let mut fleet = Fleet::default();
        let outcome = tokio::time::timeout(timeout, self.drive(&mut fleet)).await;

        let failure = match outcome {
            Ok(Ok(())) => {
                self.transition(TrialState::Completed);
                None
            }
            Ok(Err(error)) => {
                let during = self.state;
                error!("Trial failed during {during}: {error}");
                self.transition(TrialState::Failed);
                Some(OrchestrationFailure { during, error })
            }
            Err(_) => {
                let during = self.state;
                warn!(
                    "Watchdog fired during {during} after {}",
                    BenchDuration::new(timeout)
                );
                self.transition(TrialState::TimedOut);
                Some(OrchestrationFailure {
                    during,
                    error: BenchError::TimeoutError(timeout),
                })
            }
        };

        fleet
            .shutdown_all(self.config.orchestrator.shutdown_grace.get_duration())
            .await;

        TrialRecord {
            state: self.state,
            failure,
            measurement: self.measurement,
            trace_files: self
                .topology
                .instances()
                .filter(|(instance, _)| instance.kind.is_client())
                .map(|(instance, _)| ControlPaths::new(self.trial_dir, instance).trace)
                .collect(),
            shutdowns: fleet.shutdown_counts(),
        }
    }

    fn transition(&mut self, next: TrialState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {next}",
            self.state
        );
        debug!("Trial state {} -> {next}", self.state);
        self.state = next;
    }

    async fn drive(&mut self, fleet: &mut Fleet) -> Result<(), BenchError> {
        let phases = self.input.phases;
        let poll_interval = self.config.orchestrator.poll_interval.get_duration();

        self.transition(TrialState::Launching);
        let (clients, servers): (Vec<_>, Vec<_>) = self
            .topology
            .instances()
            .map(|(instance, address)| (*instance, address.clone()))
            .partition(|(instance, _)| instance.kind.is_client());
        self.launch(fleet, &servers).await?;
        let servers_ready = Instant::now();
        info!("{} server role process(es) ready", servers.len());
        self.launch(fleet, &clients).await?;
        info!("{} client process(es) ready", clients.len());

        self.transition(TrialState::Warmup);
        let warm_files = self.control_files(&clients, |paths| paths.warm);
        await_files(
            fleet,
            &warm_files,
            phases.warmup_timeout.get_duration(),
            poll_interval,
        )
        .await
        .map_err(|failure| match failure {
            AwaitFailure::Missing(missing) => {
                warn!("Warmup incomplete for {}", join(&missing));
                BenchError::TimeoutError(phases.warmup_timeout.get_duration())
            }
            failure => Self::launch_failure(failure, phases.warmup_timeout),
        })?;
        tokio::time::sleep(phases.warmup_sleep.get_duration()).await;

        self.transition(TrialState::Measuring);
        let earliest_start = servers_ready + phases.client_lag.get_duration();
        tokio::time::sleep_until(earliest_start.max(Instant::now())).await;
        let start_unix_micros = unix_micros_now();
        for (_, path) in self.control_files(&clients, |paths| paths.measure) {
            write_measure_file(&path, start_unix_micros).await?;
        }
        self.measurement = Some(MeasurementWindow {
            start_unix_micros,
            duration: phases.duration.get_duration(),
        });
        info!(
            "Measuring for {} from {}",
            phases.duration,
            format_unix_micros(start_unix_micros)
        );
        tokio::time::sleep(phases.duration.get_duration()).await;

        self.transition(TrialState::Draining);
        let client_instances: Vec<RoleInstance> =
            clients.iter().map(|(instance, _)| *instance).collect();
        self.drain(fleet, &client_instances, phases.drain_budget(), poll_interval)
            .await
    }

    /// Spawns `instances` and waits until each of them reports ready.
    async fn launch(
        &self,
        fleet: &mut Fleet,
        instances: &[(RoleInstance, Address)],
    ) -> Result<(), BenchError> {
        for (instance, address) in instances {
            let template = self.config.roles.template_for(instance.kind);
            let plan = LaunchPlan::new(template, self.input, *instance, address, self.trial_dir);
            let blob = config_blob(self.input, self.topology, instance)?;
            tokio::fs::write(&plan.paths.config, serde_json::to_vec_pretty(&blob)?).await?;
            fleet.push(RoleProcess::spawn(&plan)?);
        }

        let launch_timeout = self.config.orchestrator.launch_timeout;
        let ready_files = self.control_files(instances, |paths| paths.ready);
        await_files(
            fleet,
            &ready_files,
            launch_timeout.get_duration(),
            self.config.orchestrator.poll_interval.get_duration(),
        )
        .await
        .map_err(|failure| Self::launch_failure(failure, launch_timeout))
    }

    async fn drain(
        &self,
        fleet: &mut Fleet,
        clients: &[RoleInstance],
        budget: BenchDuration,
        poll_interval: Duration,
    ) -> Result<(), BenchError> {
        let deadline = Instant::now() + budget.get_duration();
        loop {
            let running = fleet.running(clients)?;
            if running.is_empty() {
                debug!("All clients exited");
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(
                    "{} still running after the drain budget of {budget}, using partial traces",
                    join(&running)
                );
                return Ok(());
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn control_files(
        &self,
        instances: &[(RoleInstance, Address)],
        select: impl Fn(ControlPaths) -> PathBuf,
    ) -> Vec<(RoleInstance, PathBuf)> {
        instances
            .iter()
            .map(|(instance, _)| (*instance, select(ControlPaths::new(self.trial_dir, instance))))
            .collect()
    }

    fn launch_failure(failure: AwaitFailure, within: BenchDuration) -> BenchError {
        match failure {
            AwaitFailure::Exited(instance, status) => {
                BenchError::LaunchError(format!("{instance} exited early with {status}"))
            }
            AwaitFailure::Missing(missing) => BenchError::LaunchError(format!(
                "{} not ready within {within}",
                join(&missing)
            )),
            AwaitFailure::Io(error) => error,
        }
    }
}

fn join(instances: &[RoleInstance]) -> String {
    instances
        .iter()
        .map(|instance| instance.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
