pub mod compartmentalized_skew;
pub mod fastmultipaxos_thrifty;
pub mod scalog_lt;
pub mod simplebpaxos_scale;
pub mod smoke;

use crate::input::{Input, PhaseDurations};
use crate::sweep::Sweep;
use crate::utils::duration::BenchDuration;
use clap::ValueEnum;
use paxos_bench_report::output::{Output, PhaseOutput};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

/// A benchmark family: the inputs it sweeps over and the columns its analysis reads.
pub trait Suite: Send + Sync {
    fn name(&self) -> &'static str;

    fn inputs(&self) -> Sweep<Input>;

    /// Short per-trial summary logged after every completed trial.
    fn summarize(&self, input: &Input, output: &Output) -> Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteKind {
    /// Tiny MultiPaxos sweep for checking a deployment
    Smoke,
    /// Compartmentalized MultiPaxos under a point-skewed read/write workload
    CompartmentalizedSkew,
    /// Scalog latency and throughput over push periods and client counts
    ScalogLt,
    /// SimpleBPaxos over f and client batching shapes
    SimplebpaxosScale,
    /// FastMultiPaxos thrifty systems over client counts
    FastmultipaxosThrifty,
}

impl Display for SuiteKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = self
            .to_possible_value()
            .map(|value| value.get_name().to_owned())
            .unwrap_or_default();
        write!(f, "{name}")
    }
}

/// Settings every suite copies into each of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteOptions {
    pub log_level: String,
    pub profiled: bool,
    pub monitored: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            profiled: false,
            monitored: false,
        }
    }
}

impl SuiteKind {
    pub fn into_suite(self, options: SuiteOptions) -> Box<dyn Suite> {
        match self {
            SuiteKind::Smoke => Box::new(smoke::SmokeSuite::new(options)),
            SuiteKind::CompartmentalizedSkew => {
                Box::new(compartmentalized_skew::CompartmentalizedSkewSuite::new(options))
            }
            SuiteKind::ScalogLt => Box::new(scalog_lt::ScalogLtSuite::new(options)),
            SuiteKind::SimplebpaxosScale => {
                Box::new(simplebpaxos_scale::SimpleBPaxosScaleSuite::new(options))
            }
            SuiteKind::FastmultipaxosThrifty => {
                Box::new(fastmultipaxos_thrifty::FastMultiPaxosThriftySuite::new(options))
            }
        }
    }
}

/// Phase timings shared by the large suites. The timeout covers launch and warmup too.
pub(crate) fn standard_phases(duration_secs: u64) -> PhaseDurations {
    PhaseDurations {
        warmup_duration: BenchDuration::from_secs(10),
        warmup_timeout: BenchDuration::from_secs(15),
        warmup_sleep: BenchDuration::from_secs(5),
        duration: BenchDuration::from_secs(duration_secs),
        timeout: BenchDuration::from_secs(duration_secs + 45),
        client_lag: BenchDuration::from_secs(5),
    }
}

pub(crate) fn base_input(options: &SuiteOptions) -> Input {
    Input {
        log_level: options.log_level.clone(),
        profiled: options.profiled,
        monitored: options.monitored,
        prometheus_scrape_interval: BenchDuration::from_millis(200),
        ..Default::default()
    }
}

/// `{prefix}latency.median_ms` and `{prefix}throughput.p90_1s` of one stream.
pub(crate) fn headline(prefix: &str, output: Option<&PhaseOutput>) -> Value {
    let mut fields = serde_json::Map::new();
    if let Some(output) = output {
        fields.insert(
            format!("{prefix}latency.median_ms"),
            json!(format!("{:.6}", output.latency.median_ms)),
        );
        fields.insert(
            format!("{prefix}throughput.p90_1s"),
            json!(format!("{:.8}", output.throughput.p90_1s)),
        );
    }
    Value::Object(fields)
}

/// Merges the fields of every object in `parts` into one object.
pub(crate) fn merge(parts: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = serde_json::Map::new();
    for part in parts {
        if let Value::Object(fields) = part {
            merged.extend(fields);
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validatable::Validatable;

    #[test]
    fn every_suite_should_generate_only_valid_inputs() {
        for kind in SuiteKind::value_variants() {
            let suite = kind.into_suite(SuiteOptions::default());
            let inputs = suite.inputs();
            assert!(!inputs.is_empty(), "{kind} has no inputs");
            for (index, input) in inputs.iter().enumerate() {
                if let Err(error) = input.validate() {
                    panic!("{kind} input {index} is invalid: {error}");
                }
            }
        }
    }

    #[test]
    fn suite_kind_should_display_as_cli_name() {
        assert_eq!(SuiteKind::SimplebpaxosScale.to_string(), "simplebpaxos-scale");
        assert_eq!(SuiteKind::ScalogLt.to_string(), "scalog-lt");
    }

    #[test]
    fn suite_options_should_reach_inputs() {
        let options = SuiteOptions {
            log_level: "debug".to_owned(),
            profiled: true,
            monitored: true,
        };
        let suite = SuiteKind::Smoke.into_suite(options);
        let input = suite.inputs().iter().next().unwrap();
        assert_eq!(input.log_level, "debug");
        assert!(input.profiled && input.monitored);
    }
}
