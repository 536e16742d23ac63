use super::{base_input, headline, merge, standard_phases, Suite, SuiteOptions};
use crate::input::options::{
    AcceptorOptions, ClientOptions, DepServiceNodeOptions, LeaderOptions, ReplicaOptions,
    RoleOptions,
};
use crate::input::protocol::Protocol;
use crate::input::role::{RoleCounts, RoleKind};
use crate::input::workload::Workload;
use crate::input::Input;
use crate::sweep::{Axis, Space, Sweep};
use paxos_bench_report::output::Output;
use serde_json::{json, Value};

/// Client load shape: processes, batches in flight per process and commands per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Batching {
    num_client_procs: u32,
    num_batches_per_proc: u32,
    num_commands_per_batch: u32,
}

impl Batching {
    const fn new(num_batches_per_proc: u32, num_commands_per_batch: u32) -> Self {
        Self {
            num_client_procs: 1,
            num_batches_per_proc,
            num_commands_per_batch,
        }
    }
}

const REPETITIONS: usize = 3;

fn batching_shapes() -> Vec<Batching> {
    let mut shapes = vec![Batching::new(1, 1)];
    shapes.extend((1..50).step_by(10).map(|n| Batching::new(1, n)));
    shapes.extend((1..50).step_by(10).map(|n| Batching::new(n, 1)));
    shapes.extend((1..10).step_by(3).map(|n| Batching::new(n, n)));
    shapes
}

/// SimpleBPaxos with f of 1 and 2 under growing batch counts and batch sizes.
pub struct SimpleBPaxosScaleSuite {
    options: SuiteOptions,
}

impl SimpleBPaxosScaleSuite {
    pub fn new(options: SuiteOptions) -> Self {
        Self { options }
    }
}

impl Suite for SimpleBPaxosScaleSuite {
    fn name(&self) -> &'static str {
        "simplebpaxos_scale"
    }

    fn inputs(&self) -> Sweep<Input> {
        let base = Input {
            protocol: Protocol::SimpleBPaxos,
            phases: standard_phases(20),
            workload_label: "simplebpaxos_scale".to_owned(),
            workload: Workload::UniformSingleKey {
                num_keys: 1000,
                size_mean: 16,
                size_std: 0,
            },
            ..base_input(&self.options)
        };

        Axis::new("f", [1u32, 2])
            .product(Axis::new("batching", batching_shapes()))
            .map(move |(f, batching)| Input {
                f,
                roles: RoleCounts::new()
                    .with(RoleKind::Leader, f + 1)
                    .with(RoleKind::DepServiceNode, 2 * f + 1)
                    .with(RoleKind::Acceptor, 2 * f + 1)
                    .with(RoleKind::Replica, f + 1)
                    .with(RoleKind::Client, batching.num_client_procs),
                num_clients_per_proc: batching.num_batches_per_proc,
                num_warmup_clients_per_proc: batching.num_batches_per_proc,
                options: RoleOptions {
                    dep_service_node: Some(DepServiceNodeOptions::default()),
                    acceptor: Some(AcceptorOptions::default()),
                    replica: Some(ReplicaOptions::default()),
                    leader: Some(LeaderOptions::default()),
                    client: Some(ClientOptions {
                        num_commands_per_batch: batching.num_commands_per_batch,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..base.clone()
            })
            .repeat(REPETITIONS)
    }

    fn summarize(&self, input: &Input, output: &Output) -> Value {
        let num_commands_per_batch = input
            .options
            .client
            .map(|client| client.num_commands_per_batch)
            .unwrap_or(1);
        merge([
            json!({
                "f": input.f,
                "num_client_procs": input.num_client_procs(),
                "num_batches_per_proc": input.num_clients_per_proc,
                "num_commands_per_batch": num_commands_per_batch,
            }),
            headline("", Some(&output.overall)),
        ])
    }
}
