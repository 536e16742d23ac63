use super::{base_input, headline, merge, Suite, SuiteOptions};
use crate::input::options::{
    AcceptorOptions, ClientOptions, LeaderOptions, RoleOptions, ThriftySystem,
};
use crate::input::protocol::{Protocol, RoundSystem};
use crate::input::role::{RoleCounts, RoleKind};
use crate::input::{Input, PhaseDurations};
use crate::sweep::{Axis, Space, Sweep};
use crate::utils::duration::BenchDuration;
use paxos_bench_report::output::Output;
use serde_json::{json, Value};

const F: u32 = 1;
const REPETITIONS: usize = 3;

/// FastMultiPaxos with classic round robin rounds, comparing thrifty systems as the number
/// of single-client processes grows.
pub struct FastMultiPaxosThriftySuite {
    options: SuiteOptions,
}

impl FastMultiPaxosThriftySuite {
    pub fn new(options: SuiteOptions) -> Self {
        Self { options }
    }
}

impl Suite for FastMultiPaxosThriftySuite {
    fn name(&self) -> &'static str {
        "fastmultipaxos_thrifty"
    }

    fn inputs(&self) -> Sweep<Input> {
        let base = Input {
            protocol: Protocol::FastMultiPaxos {
                round_system: RoundSystem::ClassicRoundRobin,
            },
            f: F,
            num_clients_per_proc: 1,
            num_warmup_clients_per_proc: 1,
            phases: PhaseDurations {
                duration: BenchDuration::from_secs(20),
                timeout: BenchDuration::from_secs(60),
                client_lag: BenchDuration::from_secs(5),
                ..Default::default()
            },
            workload_label: "fastmultipaxos_thrifty".to_owned(),
            ..base_input(&self.options)
        };

        Axis::new("num_client_procs", 1..=14u32)
            .product(Axis::new(
                "thrifty_system",
                [
                    ThriftySystem::NotThrifty,
                    ThriftySystem::Random,
                    ThriftySystem::Closest,
                ],
            ))
            .map(move |(num_client_procs, thrifty_system)| Input {
                roles: RoleCounts::new()
                    .with(RoleKind::Leader, F + 1)
                    .with(RoleKind::Acceptor, 2 * F + 1)
                    .with(RoleKind::Client, num_client_procs),
                options: RoleOptions {
                    acceptor: Some(AcceptorOptions {
                        wait_period: BenchDuration::ZERO,
                        wait_stagger: BenchDuration::ZERO,
                    }),
                    leader: Some(LeaderOptions {
                        thrifty_system,
                        ..Default::default()
                    }),
                    client: Some(ClientOptions {
                        repropose_period: BenchDuration::from_millis(50),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..base.clone()
            })
            .repeat(REPETITIONS)
    }

    fn summarize(&self, input: &Input, output: &Output) -> Value {
        let thrifty_system = input
            .options
            .leader
            .map(|leader| leader.thrifty_system)
            .unwrap_or_default();
        merge([
            json!({
                "num_client_procs": input.num_client_procs(),
                "thrifty_system": thrifty_system,
            }),
            headline("", Some(&output.overall)),
        ])
    }
}
