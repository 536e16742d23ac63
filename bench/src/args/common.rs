use super::defaults::*;
use crate::configs::bench_config::BenchConfig;
use crate::configs::config_provider::DEFAULT_CONFIG_PATH;
use crate::context::SuiteContext;
use crate::suites::{SuiteKind, SuiteOptions};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct BenchArgs {
    /// Benchmark suite to run
    #[arg(value_enum)]
    pub suite: SuiteKind,

    /// Directory in which the suite directory is created, overrides the configuration
    #[arg(long, short = 's')]
    pub suite_directory: Option<String>,

    /// Configuration file (TOML or JSON); a missing default file falls back to built-in defaults
    #[arg(long, short = 'c', default_value_t = DEFAULT_CONFIG_PATH.to_owned())]
    pub config: String,

    /// Log level of the harness, also forwarded to every role process
    #[arg(long, short = 'l', default_value_t = DEFAULT_LOG_LEVEL.to_owned())]
    pub log_level: String,

    /// Directory of the harness log file
    #[arg(long, default_value_t = DEFAULT_LOG_DIRECTORY.to_owned())]
    pub log_directory: String,

    /// Ask role processes to run with profiling enabled
    #[arg(long, default_value_t = DEFAULT_PROFILE)]
    pub profile: bool,

    /// Ask role processes to expose metrics for monitoring
    #[arg(long, default_value_t = DEFAULT_MONITOR)]
    pub monitor: bool,

    /// Number of trials running concurrently, overrides the configuration
    #[arg(long, short = 'p')]
    pub parallelism: Option<u32>,

    /// Identifier of the machine running the suite (defaults to hostname)
    #[arg(long)]
    pub identifier: Option<String>,

    /// Print the expanded sweep, with rejected inputs, and exit
    #[arg(long, default_value_t = DEFAULT_DRY_RUN)]
    pub dry_run: bool,
}

impl BenchArgs {
    pub fn validate(&self) {
        if self.parallelism == Some(0) {
            BenchArgs::command()
                .error(ErrorKind::ValueValidation, "--parallelism must be at least 1")
                .exit();
        }
    }

    /// Whether `--config` points somewhere other than the default location.
    pub fn has_explicit_config(&self) -> bool {
        self.config != DEFAULT_CONFIG_PATH
    }

    pub fn identifier(&self) -> Option<String> {
        self.identifier.clone().or_else(|| {
            hostname::get()
                .ok()
                .map(|name| name.to_string_lossy().to_string())
        })
    }

    /// Command line settings layered over the loaded configuration.
    pub fn to_context(&self, config: BenchConfig) -> SuiteContext {
        let mut context = SuiteContext::new(&self.suite.to_string(), config);
        if let Some(suite_directory) = &self.suite_directory {
            context.suite_directory = PathBuf::from(suite_directory);
        }
        if let Some(parallelism) = self.parallelism {
            context.parallelism = parallelism;
        }
        context.identifier = self.identifier();
        context.options = SuiteOptions {
            log_level: self.log_level.clone(),
            profiled: self.profile,
            monitored: self.monitor,
        };
        context
    }
}
