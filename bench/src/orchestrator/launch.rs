use crate::bench_error::BenchError;
use crate::configs::bench_config::LaunchTemplate;
use crate::input::role::RoleInstance;
use crate::input::Input;
use crate::topology::{Address, Topology};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Files one role instance uses to talk to the orchestrator, all inside the trial directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPaths {
    pub config: PathBuf,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
    pub ready: PathBuf,
    pub warm: PathBuf,
    pub measure: PathBuf,
    pub trace: PathBuf,
}

impl ControlPaths {
    pub fn new(trial_dir: &Path, instance: &RoleInstance) -> Self {
        let file = |extension: &str| trial_dir.join(format!("{instance}.{extension}"));
        Self {
            config: file("json"),
            stdout: file("out"),
            stderr: file("err"),
            ready: file("ready"),
            warm: file("warm"),
            measure: file("measure"),
            trace: file("trace"),
        }
    }
}

/// Fully resolved command line and environment of one role instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub instance: RoleInstance,
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub paths: ControlPaths,
}

impl LaunchPlan {
    pub fn new(
        template: &LaunchTemplate,
        input: &Input,
        instance: RoleInstance,
        address: &Address,
        trial_dir: &Path,
    ) -> Self {
        let paths = ControlPaths::new(trial_dir, &instance);
        let placeholders = BTreeMap::from([
            ("role", instance.kind.to_string()),
            ("index", instance.index.to_string()),
            ("host", address.host.clone()),
            ("port", address.port.to_string()),
            ("config", paths.config.display().to_string()),
            ("trial_dir", trial_dir.display().to_string()),
            ("log_level", input.log_level.clone()),
        ]);

        let mut env = template.env.clone();
        let mut set = |key: &str, value: String| {
            env.insert(key.to_owned(), value);
        };
        set("BENCH_ROLE", instance.kind.to_string());
        set("BENCH_INDEX", instance.index.to_string());
        set("BENCH_HOST", address.host.clone());
        set("BENCH_PORT", address.port.to_string());
        set("BENCH_CONFIG", paths.config.display().to_string());
        set("BENCH_TRIAL_DIR", trial_dir.display().to_string());
        set("BENCH_LOG_LEVEL", input.log_level.clone());
        set("BENCH_PROFILED", input.profiled.to_string());
        set("BENCH_MONITORED", input.monitored.to_string());
        set(
            "BENCH_PROMETHEUS_SCRAPE_INTERVAL_MS",
            input.prometheus_scrape_interval.as_millis().to_string(),
        );
        set("BENCH_READY_FILE", paths.ready.display().to_string());
        if instance.kind.is_client() {
            let phases = &input.phases;
            set("BENCH_NUM_CLIENTS", input.num_clients_per_proc.to_string());
            set(
                "BENCH_NUM_WARMUP_CLIENTS",
                input.num_warmup_clients_per_proc.to_string(),
            );
            set(
                "BENCH_WARMUP_DURATION_MS",
                phases.warmup_duration.as_millis().to_string(),
            );
            set("BENCH_DURATION_MS", phases.duration.as_millis().to_string());
            set(
                "BENCH_MEASUREMENT_GROUP_SIZE",
                input.measurement_group_size.to_string(),
            );
            set("BENCH_WARMUP_FILE", paths.warm.display().to_string());
            set("BENCH_MEASURE_FILE", paths.measure.display().to_string());
            set("BENCH_TRACE_FILE", paths.trace.display().to_string());
        }

        Self {
            instance,
            program: expand(&template.program, &placeholders),
            args: template
                .args
                .iter()
                .map(|arg| expand(arg, &placeholders))
                .collect(),
            env,
            paths,
        }
    }
}

/// Replaces every `{name}` with its value; unknown placeholders are left untouched.
fn expand(template: &str, placeholders: &BTreeMap<&str, String>) -> String {
    placeholders
        .iter()
        .fold(template.to_owned(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// Everything a role instance needs to know beyond its command line.
pub fn config_blob(
    input: &Input,
    topology: &Topology,
    instance: &RoleInstance,
) -> Result<Value, BenchError> {
    Ok(json!({
        "role": instance.kind,
        "index": instance.index,
        "f": input.f,
        "protocol": input.protocol,
        "topology": topology.to_json(),
        "options": input.options.blob_for(instance.kind)?,
        "workload": input.workload,
        "workload_label": input.workload_label,
        "state_machine": input.state_machine,
        "read_consistency": input.read_consistency,
        "phases": input.phases,
        "measurement_group_size": input.measurement_group_size,
        "num_clients_per_proc": input.num_clients_per_proc,
        "num_warmup_clients_per_proc": input.num_warmup_clients_per_proc,
    }))
}
