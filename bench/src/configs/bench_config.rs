use crate::input::role::RoleKind;
use crate::utils::duration::BenchDuration;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DisplayFromStr;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BenchConfig {
    pub suite: SuiteConfig,
    pub orchestrator: OrchestratorConfig,
    pub topology: TopologyConfig,
    pub roles: RolesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SuiteConfig {
    pub suite_directory: String,
    pub parallelism: u32,
}

#[serde_as]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct OrchestratorConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub launch_timeout: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub shutdown_grace: BenchDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub poll_interval: BenchDuration,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TopologyConfig {
    /// Host every instance binds to in single switch topologies.
    pub host: String,
    /// Hosts used by distributed topologies, in placement order.
    pub hosts: Vec<String>,
    /// Maximum processes per host in non-colocated distributed topologies.
    pub slots_per_host: u32,
    pub base_port: u16,
    /// Port range reserved for each concurrently running trial.
    pub port_stride: u16,
}

/// How a role instance process is started. `args` may contain `{role}`, `{index}`, `{host}`,
/// `{port}`, `{config}`, `{trial_dir}` and `{log_level}` placeholders.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct LaunchTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RolesConfig {
    pub default: LaunchTemplate,
    #[serde(flatten)]
    pub per_role: BTreeMap<RoleKind, LaunchTemplate>,
}

impl RolesConfig {
    pub fn template_for(&self, role: RoleKind) -> &LaunchTemplate {
        self.per_role.get(&role).unwrap_or(&self.default)
    }
}
