use crate::configs::bench_config::{
    BenchConfig, LaunchTemplate, OrchestratorConfig, RolesConfig, SuiteConfig, TopologyConfig,
};
use std::fmt::{Display, Formatter};

impl Display for BenchConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ suite: {}, orchestrator: {}, topology: {}, roles: {} }}",
            self.suite, self.orchestrator, self.topology, self.roles
        )
    }
}

impl Display for SuiteConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ suite_directory: {}, parallelism: {} }}",
            self.suite_directory, self.parallelism
        )
    }
}

impl Display for OrchestratorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ launch_timeout: {}, shutdown_grace: {}, poll_interval: {} }}",
            self.launch_timeout, self.shutdown_grace, self.poll_interval
        )
    }
}

impl Display for TopologyConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ host: {}, hosts: {:?}, slots_per_host: {}, base_port: {}, port_stride: {} }}",
            self.host, self.hosts, self.slots_per_host, self.base_port, self.port_stride
        )
    }
}

impl Display for LaunchTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

impl Display for RolesConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ default: {}", self.default)?;
        for (role, template) in &self.per_role {
            write!(f, ", {role}: {template}")?;
        }
        write!(f, " }}")
    }
}
