use super::{base_input, headline, merge, standard_phases, Suite, SuiteOptions};
use crate::input::options::{
    AcceptorOptions, AggregatorOptions, ClientOptions, LeaderOptions, ReplicaOptions, RoleOptions,
    ServerOptions,
};
use crate::input::protocol::Protocol;
use crate::input::role::{RoleCounts, RoleKind};
use crate::input::workload::Workload;
use crate::input::Input;
use crate::sweep::{Axis, Space, Sweep};
use crate::utils::duration::BenchDuration;
use paxos_bench_report::output::Output;
use serde_json::{json, Value};

const NUM_SHARDS: u32 = 1;
const NUM_SERVERS_PER_SHARD: u32 = 2;
const NUM_REPLICAS: u32 = 2;
const NUM_CLIENTS_PER_PROC: u32 = 100;
const REPETITIONS: usize = 3;

/// Scalog latency and throughput as the server push period and the number of client
/// processes grow. Batch flushing on the replicas and more shards did not raise the ceiling,
/// so both stay fixed.
pub struct ScalogLtSuite {
    options: SuiteOptions,
}

impl ScalogLtSuite {
    pub fn new(options: SuiteOptions) -> Self {
        Self { options }
    }
}

impl Suite for ScalogLtSuite {
    fn name(&self) -> &'static str {
        "scalog_lt"
    }

    fn inputs(&self) -> Sweep<Input> {
        let base = Input {
            protocol: Protocol::Scalog {
                num_shards: NUM_SHARDS,
            },
            f: 1,
            num_clients_per_proc: NUM_CLIENTS_PER_PROC,
            num_warmup_clients_per_proc: NUM_CLIENTS_PER_PROC,
            measurement_group_size: 100,
            phases: standard_phases(15),
            workload_label: "smoke".to_owned(),
            workload: Workload::UniformSingleKey {
                num_keys: 1,
                size_mean: 16,
                size_std: 0,
            },
            ..base_input(&self.options)
        };

        Axis::new("push_period_ms", 1..=5u64)
            .product(Axis::new("num_client_procs", [1u32, 5, 10, 15, 20]))
            .map(move |(push_period_ms, num_client_procs)| Input {
                roles: RoleCounts::new()
                    .with(RoleKind::Server, NUM_SHARDS * NUM_SERVERS_PER_SHARD)
                    .with(RoleKind::Aggregator, 1)
                    .with(RoleKind::Leader, 2)
                    .with(RoleKind::Acceptor, 3)
                    .with(RoleKind::Replica, NUM_REPLICAS)
                    .with(RoleKind::Client, num_client_procs),
                options: RoleOptions {
                    server: Some(ServerOptions {
                        push_period: BenchDuration::from_millis(push_period_ms),
                        recover_period: BenchDuration::from_secs(60),
                    }),
                    aggregator: Some(AggregatorOptions {
                        num_shard_cuts_per_proposal: NUM_SHARDS * 2,
                        ..Default::default()
                    }),
                    leader: Some(LeaderOptions::default()),
                    acceptor: Some(AcceptorOptions::default()),
                    replica: Some(ReplicaOptions {
                        batch_flush: true,
                        recover_log_entry_min_period: BenchDuration::from_secs(120),
                        recover_log_entry_max_period: BenchDuration::from_secs(240),
                        ..Default::default()
                    }),
                    client: Some(ClientOptions::default()),
                    ..Default::default()
                },
                ..base.clone()
            })
            .repeat(REPETITIONS)
    }

    fn summarize(&self, input: &Input, output: &Output) -> Value {
        let push_period = input
            .options
            .server
            .map(|server| server.push_period.to_string())
            .unwrap_or_default();
        let batch_flush = input
            .options
            .replica
            .map(|replica| replica.batch_flush)
            .unwrap_or_default();
        let num_shards = match input.protocol {
            Protocol::Scalog { num_shards } => num_shards,
            _ => 0,
        };
        merge([
            json!({
                "num_client_procs": input.num_client_procs(),
                "num_clients_per_proc": input.num_clients_per_proc,
                "num_shards": num_shards,
                "push_period": push_period,
                "num_replicas": input.roles.get(RoleKind::Replica),
                "batch_flush": batch_flush,
            }),
            headline("", Some(&output.overall)),
        ])
    }
}
