use super::{base_input, headline, merge, Suite, SuiteOptions};
use crate::input::options::{
    AcceptorOptions, ClientOptions, LeaderOptions, ReplicaOptions, RoleOptions,
};
use crate::input::protocol::{DistributionScheme, Protocol};
use crate::input::role::{RoleCounts, RoleKind};
use crate::input::workload::Workload;
use crate::input::{Input, PhaseDurations};
use crate::sweep::{Axis, Space, Sweep};
use crate::utils::duration::BenchDuration;
use paxos_bench_report::output::Output;
use serde_json::{json, Value};

/// Smallest MultiPaxos deployment, with short phases, to check that role processes start,
/// warm up and write traces.
pub struct SmokeSuite {
    options: SuiteOptions,
}

impl SmokeSuite {
    pub fn new(options: SuiteOptions) -> Self {
        Self { options }
    }
}

impl Suite for SmokeSuite {
    fn name(&self) -> &'static str {
        "smoke"
    }

    fn inputs(&self) -> Sweep<Input> {
        let base = Input {
            protocol: Protocol::MultiPaxos {
                num_acceptor_groups: 1,
                flexible: false,
                distribution_scheme: DistributionScheme::Hash,
            },
            f: 1,
            phases: PhaseDurations {
                warmup_duration: BenchDuration::from_secs(2),
                warmup_timeout: BenchDuration::from_secs(5),
                warmup_sleep: BenchDuration::ZERO,
                duration: BenchDuration::from_secs(5),
                timeout: BenchDuration::from_secs(30),
                client_lag: BenchDuration::from_secs(1),
            },
            workload_label: "smoke".to_owned(),
            workload: Workload::UniformSingleKey {
                num_keys: 1,
                size_mean: 16,
                size_std: 0,
            },
            options: RoleOptions {
                leader: Some(LeaderOptions::default()),
                acceptor: Some(AcceptorOptions::default()),
                replica: Some(ReplicaOptions::default()),
                client: Some(ClientOptions::default()),
                ..Default::default()
            },
            ..base_input(&self.options)
        };

        Axis::new("num_client_procs", [1u32, 2])
            .product(Axis::new("num_clients_per_proc", [1u32, 10]))
            .map(move |(num_client_procs, num_clients_per_proc)| Input {
                roles: RoleCounts::new()
                    .with(RoleKind::Leader, 2)
                    .with(RoleKind::Acceptor, 3)
                    .with(RoleKind::Replica, 2)
                    .with(RoleKind::Client, num_client_procs),
                num_clients_per_proc,
                num_warmup_clients_per_proc: num_clients_per_proc,
                ..base.clone()
            })
            .repeat(1)
    }

    fn summarize(&self, input: &Input, output: &Output) -> Value {
        merge([
            json!({
                "num_client_procs": input.num_client_procs(),
                "num_clients_per_proc": input.num_clients_per_proc,
            }),
            headline("", Some(&output.overall)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_sweep_client_shapes_once() {
        let suite = SmokeSuite::new(SuiteOptions::default());
        let inputs: Vec<Input> = suite.inputs().iter().collect();
        assert_eq!(inputs.len(), 4);
        let shapes: Vec<(u32, u32)> = inputs
            .iter()
            .map(|input| (input.num_client_procs(), input.num_clients_per_proc))
            .collect();
        assert_eq!(shapes, vec![(1, 1), (1, 10), (2, 1), (2, 10)]);
    }

    #[test]
    fn summary_should_carry_headline_numbers() {
        let suite = SmokeSuite::new(SuiteOptions::default());
        let input = suite.inputs().iter().next().unwrap();
        let summary = suite.summarize(&input, &Output::default());
        assert_eq!(summary["num_client_procs"], 1);
        assert_eq!(summary["latency.median_ms"], "0.000000");
    }
}
