use super::bench_config::{
    BenchConfig, LaunchTemplate, OrchestratorConfig, RolesConfig, SuiteConfig, TopologyConfig,
};
use crate::utils::duration::BenchDuration;
use std::collections::BTreeMap;

pub const DEFAULT_SUITE_DIRECTORY: &str = "suites";
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_LAUNCH_TIMEOUT: BenchDuration = BenchDuration::from_secs(30);
pub const DEFAULT_SHUTDOWN_GRACE: BenchDuration = BenchDuration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: BenchDuration = BenchDuration::from_millis(50);
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_SLOTS_PER_HOST: u32 = 0;
pub const DEFAULT_BASE_PORT: u16 = 10_000;
pub const DEFAULT_PORT_STRIDE: u16 = 1_000;
pub const DEFAULT_ROLE_PROGRAM: &str = "paxos-role";

impl Default for BenchConfig {
    fn default() -> BenchConfig {
        BenchConfig {
            suite: SuiteConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            topology: TopologyConfig::default(),
            roles: RolesConfig::default(),
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> SuiteConfig {
        SuiteConfig {
            suite_directory: DEFAULT_SUITE_DIRECTORY.to_owned(),
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> OrchestratorConfig {
        OrchestratorConfig {
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> TopologyConfig {
        TopologyConfig {
            host: DEFAULT_HOST.to_owned(),
            hosts: vec![DEFAULT_HOST.to_owned()],
            slots_per_host: DEFAULT_SLOTS_PER_HOST,
            base_port: DEFAULT_BASE_PORT,
            port_stride: DEFAULT_PORT_STRIDE,
        }
    }
}

impl Default for RolesConfig {
    fn default() -> RolesConfig {
        RolesConfig {
            default: LaunchTemplate {
                program: DEFAULT_ROLE_PROGRAM.to_owned(),
                args: [
                    "--role",
                    "{role}",
                    "--index",
                    "{index}",
                    "--config",
                    "{config}",
                    "--log_level",
                    "{log_level}",
                ]
                .into_iter()
                .map(str::to_owned)
                .collect(),
                env: BTreeMap::new(),
            },
            per_role: BTreeMap::new(),
        }
    }
}
