use clap::Parser;
use colored::Colorize;
use paxos_bench::args::common::BenchArgs;
use paxos_bench::bench_error::BenchError;
use paxos_bench::configs::config_provider::{ConfigProvider, FileConfigProvider};
use paxos_bench::runner::SuiteRunner;
use paxos_bench::utils::logging::init_logging;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = BenchArgs::parse();
    args.validate();

    let _guard = match init_logging(&args.log_level, Path::new(&args.log_directory)) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("Cannot initialize logging: {error}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(code = error.as_code(), "{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: BenchArgs) -> Result<(), BenchError> {
    let provider = if args.has_explicit_config() {
        FileConfigProvider::new(args.config.clone())
    } else {
        FileConfigProvider::optional(args.config.clone())
    };
    let config = provider.load_config()?;
    let context = args.to_context(config);
    let suite = args.suite.into_suite(context.options.clone());
    let runner = SuiteRunner::new(context, suite);

    if args.dry_run {
        let entries = runner.dry_run();
        let rejected = entries.iter().filter(|entry| entry.rejection.is_some()).count();
        for entry in &entries {
            let input = serde_json::to_string(&entry.input)?;
            match &entry.rejection {
                None => println!("{:>4} {} {input}", entry.index, "ok".green()),
                Some(rejection) => {
                    println!("{:>4} {} {input}: {rejection}", entry.index, "rejected".red())
                }
            }
        }
        info!(
            "Dry run of {}: {} input(s), {rejected} rejected",
            args.suite,
            entries.len()
        );
        return Ok(());
    }

    info!("Starting suite {}...", args.suite);
    let report = runner.run().await?;
    info!(
        "Finished suite {}: {} completed, {} failed, results in {}",
        args.suite,
        report.completed,
        report.failed,
        report.root.display()
    );
    Ok(())
}
