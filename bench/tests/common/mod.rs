#![allow(dead_code)]

use paxos_bench::configs::bench_config::{BenchConfig, LaunchTemplate};
use paxos_bench::input::protocol::{DistributionScheme, Protocol};
use paxos_bench::input::role::{RoleCounts, RoleKind};
use paxos_bench::input::{Input, PhaseDurations};
use paxos_bench::suites::Suite;
use paxos_bench::sweep::Sweep;
use paxos_bench::utils::duration::BenchDuration;
use paxos_bench_report::output::Output;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Completions every 10ms with a 2ms latency over the whole measurement window.
pub const COMPLETIONS_PER_SECOND: f64 = 100.0;
pub const LATENCY_MS: f64 = 2.0;

/// Servers report ready and idle until terminated. Clients additionally report warmup, wait
/// for the measurement start and write a synthetic trace covering the measurement window.
const ROLE_SCRIPT: &str = r#"
trap 'exit 0' TERM
: > "$BENCH_READY_FILE"
if [ "$BENCH_ROLE" != client ]; then
    while :; do sleep 0.05; done
fi
: > "$BENCH_WARMUP_FILE"
while [ ! -f "$BENCH_MEASURE_FILE" ]; do sleep 0.02; done
start=$(cat "$BENCH_MEASURE_FILE")
end=$((start + BENCH_DURATION_MS * 1000))
t=$start
i=0
while [ "$t" -lt "$end" ]; do
    echo "$i,$((t - 2000)),$t"
    i=$((i + 1))
    t=$((t + 10000))
done > "$BENCH_TRACE_FILE"
"#;

pub fn shell_template(script: &str) -> LaunchTemplate {
    LaunchTemplate {
        program: "/bin/sh".to_owned(),
        args: vec!["-c".to_owned(), script.to_owned()],
        env: BTreeMap::new(),
    }
}

pub fn config() -> BenchConfig {
    let mut config = BenchConfig::default();
    config.roles.default = shell_template(ROLE_SCRIPT);
    config.orchestrator.launch_timeout = BenchDuration::from_secs(5);
    config.orchestrator.shutdown_grace = BenchDuration::from_secs(2);
    config.orchestrator.poll_interval = BenchDuration::from_millis(20);
    config
}

/// A config whose `kind` processes exit right away without reporting ready.
pub fn config_with_crashing(kind: RoleKind) -> BenchConfig {
    let mut config = config();
    config
        .roles
        .per_role
        .insert(kind, shell_template("echo 'cannot bind' >&2; exit 3"));
    config
}

pub fn input() -> Input {
    Input {
        protocol: Protocol::MultiPaxos {
            num_acceptor_groups: 1,
            flexible: false,
            distribution_scheme: DistributionScheme::Hash,
        },
        f: 1,
        roles: RoleCounts::new()
            .with(RoleKind::Leader, 2)
            .with(RoleKind::Acceptor, 3)
            .with(RoleKind::Replica, 2)
            .with(RoleKind::Client, 1),
        phases: PhaseDurations {
            warmup_duration: BenchDuration::from_millis(100),
            warmup_timeout: BenchDuration::from_secs(2),
            warmup_sleep: BenchDuration::ZERO,
            duration: BenchDuration::from_secs(3),
            timeout: BenchDuration::from_secs(15),
            client_lag: BenchDuration::ZERO,
        },
        ..Default::default()
    }
}

/// Clients that keep running after writing their trace, so the drain budget runs out.
pub fn config_with_lingering_clients() -> BenchConfig {
    let mut config = config();
    let script = format!("{ROLE_SCRIPT}while :; do sleep 0.05; done\n");
    config
        .roles
        .per_role
        .insert(RoleKind::Client, shell_template(&script));
    config
}

/// A config whose `kind` processes keep running without ever reporting ready.
pub fn config_with_silent(kind: RoleKind) -> BenchConfig {
    let mut config = config();
    config.roles.per_role.insert(
        kind,
        shell_template("trap 'exit 0' TERM; while :; do sleep 0.05; done"),
    );
    config.orchestrator.launch_timeout = BenchDuration::from_millis(500);
    config
}

/// An input leaving two seconds of drain budget once the measurement ends.
pub fn draining_input() -> Input {
    let mut input = input();
    input.phases.warmup_duration = BenchDuration::from_secs(1);
    input.phases.timeout = BenchDuration::from_secs(6);
    input
}

/// An input whose watchdog fires while the measurement is still running.
pub fn timing_out_input() -> Input {
    let mut input = input();
    input.phases.timeout = input.phases.duration;
    input
}

pub struct ListedSuite {
    pub inputs: Vec<Input>,
}

impl Suite for ListedSuite {
    fn name(&self) -> &'static str {
        "listed"
    }

    fn inputs(&self) -> Sweep<Input> {
        Sweep::of(self.inputs.clone())
    }

    fn summarize(&self, input: &Input, output: &Output) -> Value {
        json!({
            "num_client_procs": input.num_client_procs(),
            "latency.median_ms": output.overall.latency.median_ms,
        })
    }
}
