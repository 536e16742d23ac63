pub mod analytics;
pub mod args;
pub mod bench_error;
pub mod configs;
pub mod context;
pub mod input;
pub mod orchestrator;
pub mod runner;
pub mod suite_directory;
pub mod suites;
pub mod sweep;
pub mod topology;
pub mod trial_runner;
pub mod utils;
pub mod validatable;
