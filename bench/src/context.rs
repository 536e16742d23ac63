use crate::configs::bench_config::BenchConfig;
use crate::suites::SuiteOptions;
use serde::Serialize;
use std::path::PathBuf;

/// Everything a suite run needs, passed explicitly from the suite runner down to each
/// orchestrator. Stored as `args.json` in the suite root.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteContext {
    pub suite_name: String,
    /// Parent directory under which the suite root is created.
    pub suite_directory: PathBuf,
    pub identifier: Option<String>,
    /// Handed to the suite, which copies them into every input it generates.
    #[serde(flatten)]
    pub options: SuiteOptions,
    pub parallelism: u32,
    pub config: BenchConfig,
}

impl SuiteContext {
    pub fn new(suite_name: &str, config: BenchConfig) -> Self {
        Self {
            suite_name: suite_name.to_owned(),
            suite_directory: PathBuf::from(&config.suite.suite_directory),
            identifier: None,
            options: SuiteOptions::default(),
            parallelism: config.suite.parallelism,
            config,
        }
    }

    /// Trials allowed to run at once, never less than one.
    pub fn parallelism(&self) -> usize {
        self.parallelism.max(1) as usize
    }
}
