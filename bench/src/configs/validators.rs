use crate::bench_error::BenchError;
use crate::configs::bench_config::{
    BenchConfig, LaunchTemplate, OrchestratorConfig, RolesConfig, SuiteConfig, TopologyConfig,
};
use crate::validatable::Validatable;
use tracing::error;

impl Validatable<BenchError> for BenchConfig {
    fn validate(&self) -> Result<(), BenchError> {
        self.suite.validate()?;
        self.orchestrator.validate()?;
        self.topology.validate()?;
        self.roles.validate()?;
        Ok(())
    }
}

impl Validatable<BenchError> for SuiteConfig {
    fn validate(&self) -> Result<(), BenchError> {
        if self.parallelism == 0 {
            error!("Suite configuration -> parallelism must be at least 1.");
            return Err(BenchError::ConfigurationError(
                "suite.parallelism must be at least 1".to_owned(),
            ));
        }
        if self.suite_directory.trim().is_empty() {
            return Err(BenchError::ConfigurationError(
                "suite.suite_directory cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Validatable<BenchError> for OrchestratorConfig {
    fn validate(&self) -> Result<(), BenchError> {
        if self.launch_timeout.is_zero() {
            error!("Orchestrator configuration -> launch timeout cannot be zero.");
            return Err(BenchError::ConfigurationError(
                "orchestrator.launch_timeout cannot be zero".to_owned(),
            ));
        }
        if self.poll_interval.is_zero() {
            error!("Orchestrator configuration -> poll interval cannot be zero.");
            return Err(BenchError::ConfigurationError(
                "orchestrator.poll_interval cannot be zero".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Validatable<BenchError> for TopologyConfig {
    fn validate(&self) -> Result<(), BenchError> {
        if self.host.trim().is_empty() {
            return Err(BenchError::ConfigurationError(
                "topology.host cannot be empty".to_owned(),
            ));
        }
        if self.base_port == 0 {
            return Err(BenchError::ConfigurationError(
                "topology.base_port cannot be zero".to_owned(),
            ));
        }
        if self.port_stride == 0 {
            return Err(BenchError::ConfigurationError(
                "topology.port_stride cannot be zero".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Validatable<BenchError> for LaunchTemplate {
    fn validate(&self) -> Result<(), BenchError> {
        if self.program.trim().is_empty() {
            return Err(BenchError::ConfigurationError(
                "role launch template needs a program".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Validatable<BenchError> for RolesConfig {
    fn validate(&self) -> Result<(), BenchError> {
        self.default.validate()?;
        for template in self.per_role.values() {
            template.validate()?;
        }
        Ok(())
    }
}
