use super::{base_input, headline, merge, standard_phases, Suite, SuiteOptions};
use crate::input::options::{
    AcceptorOptions, BatcherOptions, ClientOptions, LeaderOptions, ProxyLeaderOptions,
    ProxyReplicaOptions, ReadBatcherOptions, ReplicaOptions, RoleOptions,
};
use crate::input::protocol::{DistributionScheme, Protocol};
use crate::input::role::{RoleCounts, RoleKind};
use crate::input::workload::{Workload, READ_PHASE, WRITE_PHASE};
use crate::input::Input;
use crate::sweep::{Axis, Space, Sweep};
use crate::utils::duration::BenchDuration;
use paxos_bench_report::output::Output;
use serde_json::{json, Value};

/// Deployment parameters that are tuned together.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Deployment {
    num_proxy_leaders: u32,
    flexible: bool,
    num_acceptor_groups: u32,
    num_acceptors_per_group: u32,
    num_replicas: u32,
    leader_flush_every_n: u32,
    proxy_leader_flush_every_n: u32,
    read_fraction: f64,
    num_client_procs: u32,
    num_clients_per_proc: u32,
}

// 3 proxy leaders are enough; 20 client processes of 100 clients saturate the deployment.
const DEPLOYMENTS: [Deployment; 1] = [Deployment {
    num_proxy_leaders: 3,
    flexible: true,
    num_acceptor_groups: 6,
    num_acceptors_per_group: 2,
    num_replicas: 6,
    leader_flush_every_n: 10,
    proxy_leader_flush_every_n: 1,
    read_fraction: 0.95,
    num_client_procs: 20,
    num_clients_per_proc: 100,
}];

const NUM_KEYS: u32 = 100_000;
const REPETITIONS: usize = 5;

/// Compartmentalized MultiPaxos with proxy leaders and a flexible acceptor grid, while the
/// fraction of requests hitting a single hot key grows from 0 to 1.
pub struct CompartmentalizedSkewSuite {
    options: SuiteOptions,
}

impl CompartmentalizedSkewSuite {
    pub fn new(options: SuiteOptions) -> Self {
        Self { options }
    }
}

impl Suite for CompartmentalizedSkewSuite {
    fn name(&self) -> &'static str {
        "compartmentalized_skew"
    }

    fn inputs(&self) -> Sweep<Input> {
        let base = Input {
            f: 1,
            measurement_group_size: 10,
            phases: standard_phases(15),
            workload_label: "compartmentalized_skew_1".to_owned(),
            ..base_input(&self.options)
        };
        let point_fractions = (0..=8).map(|eighths| f64::from(eighths) / 8.0);

        Axis::new("point_fraction", point_fractions)
            .product(Axis::new("deployment", DEPLOYMENTS))
            .map(move |(point_fraction, deployment)| build(&base, point_fraction, deployment))
            .repeat(REPETITIONS)
    }

    fn summarize(&self, input: &Input, output: &Output) -> Value {
        let flush = |n: Option<u32>| n.unwrap_or_default();
        merge([
            json!({
                "num_client_procs": input.num_client_procs(),
                "num_clients_per_proc": input.num_clients_per_proc,
                "num_proxy_leaders": input.roles.get(RoleKind::ProxyLeader),
                "num_acceptors": input.roles.get(RoleKind::Acceptor),
                "num_replicas": input.roles.get(RoleKind::Replica),
                "leader_flush_every_n":
                    flush(input.options.leader.map(|o| o.flush_phase2as_every_n)),
                "proxy_leader_flush_every_n":
                    flush(input.options.proxy_leader.map(|o| o.flush_phase2as_every_n)),
                "workload": input.workload.to_string(),
            }),
            headline("write.", output.phase(WRITE_PHASE)),
            headline("read.", output.phase(READ_PHASE)),
        ])
    }
}

fn build(base: &Input, point_fraction: f64, deployment: Deployment) -> Input {
    Input {
        protocol: Protocol::MultiPaxos {
            num_acceptor_groups: deployment.num_acceptor_groups,
            flexible: deployment.flexible,
            distribution_scheme: DistributionScheme::Hash,
        },
        roles: RoleCounts::new()
            .with(RoleKind::Leader, 2)
            .with(RoleKind::ProxyLeader, deployment.num_proxy_leaders)
            .with(
                RoleKind::Acceptor,
                deployment.num_acceptor_groups * deployment.num_acceptors_per_group,
            )
            .with(RoleKind::Replica, deployment.num_replicas)
            .with(RoleKind::Client, deployment.num_client_procs),
        num_clients_per_proc: deployment.num_clients_per_proc,
        num_warmup_clients_per_proc: deployment.num_clients_per_proc,
        workload: Workload::PointSkewedReadWrite {
            num_keys: NUM_KEYS,
            read_fraction: deployment.read_fraction,
            point_fraction,
            write_size_mean: 16,
            write_size_std: 0,
        },
        options: RoleOptions {
            batcher: Some(BatcherOptions { batch_size: 0 }),
            read_batcher: Some(ReadBatcherOptions::default()),
            leader: Some(LeaderOptions {
                flush_phase2as_every_n: deployment.leader_flush_every_n,
                ..Default::default()
            }),
            proxy_leader: Some(ProxyLeaderOptions {
                flush_phase2as_every_n: deployment.proxy_leader_flush_every_n,
            }),
            acceptor: Some(AcceptorOptions::default()),
            replica: Some(ReplicaOptions {
                recover_log_entry_min_period: BenchDuration::from_secs(2),
                recover_log_entry_max_period: BenchDuration::from_secs(5),
                ..Default::default()
            }),
            proxy_replica: Some(ProxyReplicaOptions::default()),
            client: Some(ClientOptions::default()),
            ..Default::default()
        },
        ..base.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxos_bench_report::output::PhaseOutput;

    #[test]
    fn should_sweep_point_fraction_in_eighths_five_times() {
        let inputs: Vec<Input> = CompartmentalizedSkewSuite::new(SuiteOptions::default())
            .inputs()
            .iter()
            .collect();

        assert_eq!(inputs.len(), 9 * REPETITIONS);
        let fractions: Vec<f64> = inputs[..9]
            .iter()
            .map(|input| match input.workload {
                Workload::PointSkewedReadWrite { point_fraction, .. } => point_fraction,
                _ => panic!("unexpected workload"),
            })
            .collect();
        assert_eq!(fractions[0], 0.0);
        assert_eq!(fractions[4], 0.5);
        assert_eq!(fractions[8], 1.0);
        assert_eq!(inputs[0], inputs[9]);
        assert_eq!(inputs[0].roles.get(RoleKind::Acceptor), 12);
    }

    #[test]
    fn summary_should_report_read_and_write_streams() {
        let suite = CompartmentalizedSkewSuite::new(SuiteOptions::default());
        let input = suite.inputs().iter().next().unwrap();
        let output = Output::default()
            .with_phase(READ_PHASE, PhaseOutput::default())
            .with_phase(WRITE_PHASE, PhaseOutput::default());

        let summary = suite.summarize(&input, &output);

        assert_eq!(summary["num_proxy_leaders"], 3);
        assert_eq!(summary["leader_flush_every_n"], 10);
        assert!(summary.get("read.latency.median_ms").is_some());
        assert!(summary.get("write.throughput.p90_1s").is_some());
    }
}
