//! IECA to SDMX conversion CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use sdmx_cli::commands::{load_config, query_count, run_pipeline};
use sdmx_cli::logging::{LogConfig, init_logging};
use sdmx_cli::summary::{activities_table, print_summary};
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match execute(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn execute(cli: &Cli) -> anyhow::Result<i32> {
    let config = load_config(&cli.config)?;
    match &cli.command {
        Command::Run(args) => {
            let summary = run_pipeline(&config, &args.activities)?;
            print_summary(&summary);
            Ok(if summary.has_failures() { 1 } else { 0 })
        }
        Command::Activities => {
            println!("{}", activities_table(&config));
            Ok(0)
        }
        Command::CheckConfig => {
            println!(
                "{}: {} activities, {} queries, {} periodicities",
                cli.config.display(),
                config.activities.len(),
                query_count(&config),
                config.frequencies.len()
            );
            Ok(0)
        }
    }
}

/// Explicit `--log-level` wins over `-v/-q`; either disables `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let explicit = cli.verbosity.is_present() || cli.log_level.is_some();
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter: cli
            .log_level
            .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from),
        use_env_filter: !explicit,
        with_ansi,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_level_disables_env_filter() {
        let cli = Cli::parse_from(["iecasdmx", "--log-level", "debug", "run", "ETDP"]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
        let Command::Run(args) = &cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.activities, vec!["ETDP"]);
    }

    #[test]
    fn default_flags_defer_to_env() {
        let cli = Cli::parse_from(["iecasdmx", "--config", "other.toml", "activities"]);
        let config = log_config_from_cli(&cli);
        assert!(config.use_env_filter);
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert_eq!(cli.config, std::path::PathBuf::from("other.toml"));
    }
}
