pub mod bench_config;
pub mod config_provider;
pub mod defaults;
pub mod displays;
pub mod validators;
