use crate::cli::RunnerCli;
use clap::Parser;

/// Read the runner settings and initialise logging at the configured level.
pub fn init() -> RunnerCli {
    let cli = RunnerCli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();

    cli
}
