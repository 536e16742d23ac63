pub mod options;
pub mod protocol;
pub mod role;
pub mod workload;

use crate::bench_error::BenchError;
use crate::topology::TopologyKind;
use crate::utils::duration::BenchDuration;
use crate::validatable::Validatable;
use options::RoleOptions;
use paxos_bench_report::result_row::flatten;
use protocol::Protocol;
use role::{RoleCounts, RoleKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::serde_as;
use serde_with::DisplayFromStr;
use workload::Workload;

/// Wall clock budget of one trial.
///
/// `timeout` is measured from the start of launching and covers every phase, so it must be
/// at least `duration + client_lag`; the remainder after warmup and measurement is the drain
/// budget.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    #[serde_as(as = "DisplayFromStr")]
    pub warmup_duration: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub warmup_timeout: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub warmup_sleep: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub duration: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub timeout: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub client_lag: BenchDuration,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            warmup_duration: BenchDuration::from_secs(10),
            warmup_timeout: BenchDuration::from_secs(15),
            warmup_sleep: BenchDuration::from_secs(5),
            duration: BenchDuration::from_secs(15),
            timeout: BenchDuration::from_secs(60),
            client_lag: BenchDuration::from_secs(5),
        }
    }
}

impl PhaseDurations {
    /// Time left for draining once warmup and measurement have used their share.
    pub fn drain_budget(&self) -> BenchDuration {
        BenchDuration::new(
            self.timeout
                .get_duration()
                .saturating_sub(self.duration.get_duration())
                .saturating_sub(self.warmup_duration.get_duration()),
        )
    }
}

impl Validatable<BenchError> for PhaseDurations {
    fn validate(&self) -> Result<(), BenchError> {
        if self.duration.is_zero() {
            return Err(BenchError::ConfigurationError(
                "measurement duration cannot be zero".to_owned(),
            ));
        }
        let required = self.duration.get_duration() + self.client_lag.get_duration();
        if self.timeout.get_duration() < required {
            return Err(BenchError::ConfigurationError(format!(
                "timeout ({}) must be at least duration + client_lag ({})",
                self.timeout,
                BenchDuration::new(required)
            )));
        }
        if self.warmup_timeout <= self.warmup_duration {
            return Err(BenchError::ConfigurationError(format!(
                "warmup_timeout ({}) must exceed warmup_duration ({})",
                self.warmup_timeout, self.warmup_duration
            )));
        }
        Ok(())
    }
}

/// Immutable configuration of one trial.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub protocol: Protocol,
    pub f: u32,
    pub roles: RoleCounts,
    pub num_clients_per_proc: u32,
    pub num_warmup_clients_per_proc: u32,
    pub topology: TopologyKind,
    pub phases: PhaseDurations,
    pub measurement_group_size: u32,
    pub state_machine: String,
    pub workload_label: String,
    pub workload: Workload,
    pub read_consistency: String,
    pub options: RoleOptions,
    pub log_level: String,
    pub profiled: bool,
    pub monitored: bool,
    #[serde_as(as = "DisplayFromStr")]
    pub prometheus_scrape_interval: BenchDuration,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            protocol: Protocol::SimpleBPaxos,
            f: 1,
            roles: RoleCounts::new(),
            num_clients_per_proc: 1,
            num_warmup_clients_per_proc: 1,
            topology: TopologyKind::SingleSwitch,
            phases: PhaseDurations::default(),
            measurement_group_size: 1,
            state_machine: "KeyValueStore".to_owned(),
            workload_label: String::new(),
            workload: Workload::default(),
            read_consistency: "linearizable".to_owned(),
            options: RoleOptions::default(),
            log_level: "info".to_owned(),
            profiled: false,
            monitored: false,
            prometheus_scrape_interval: BenchDuration::from_millis(200),
        }
    }
}

impl Input {
    pub fn num_client_procs(&self) -> u32 {
        self.roles.get(RoleKind::Client)
    }

    /// Every field flattened to dotted column names, as written to the result table.
    pub fn columns(&self) -> Result<Map<String, Value>, BenchError> {
        Ok(flatten(&serde_json::to_value(self)?))
    }
}

impl Validatable<BenchError> for Input {
    fn validate(&self) -> Result<(), BenchError> {
        self.phases.validate()?;
        self.protocol.validate_roles(self.f, &self.roles)?;
        if self.num_clients_per_proc == 0 {
            return Err(BenchError::ConfigurationError(
                "num_clients_per_proc must be at least 1".to_owned(),
            ));
        }
        if self.measurement_group_size == 0 {
            return Err(BenchError::ConfigurationError(
                "measurement_group_size must be at least 1".to_owned(),
            ));
        }
        self.workload.validate()?;
        self.options.validate()?;
        Ok(())
    }
}
