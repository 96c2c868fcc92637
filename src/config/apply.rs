use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{
    Cli, Command, PositiveU64, SearchArgs, SweepArgs, TargetArgs, check_rate, check_threshold,
};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, SearchConfig, SweepConfig};

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line win over the config file; config values
/// win over built-in defaults.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(cli: &mut Cli, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    let Some((_, sub_matches)) = matches.subcommand() else {
        return Ok(());
    };
    match &mut cli.command {
        Command::Search(args) => {
            apply_target(&mut args.target, sub_matches, config)?;
            if let Some(section) = config.search.as_ref() {
                apply_search(args, sub_matches, section)?;
            }
        }
        Command::Sweep(args) => {
            apply_target(&mut args.target, sub_matches, config)?;
            if let Some(section) = config.sweep.as_ref() {
                apply_sweep(args, sub_matches, section)?;
            }
        }
    }
    Ok(())
}

fn apply_target(target: &mut TargetArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        target.base_url = base_url;
    }

    if !is_cli(matches, "endpoint")
        && let Some(endpoint) = config.endpoint.clone()
    {
        target.endpoint = endpoint;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        target.requests = requests;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        target.timeout = field("timeout", timeout.to_duration())?;
    }

    if !is_cli(matches, "api_key_env")
        && let Some(var) = config.api_key_env.clone()
    {
        target.api_key_env = var;
    }

    if !is_cli(matches, "auth_scheme")
        && let Some(scheme) = config.auth_scheme.clone()
    {
        target.auth_scheme = scheme;
    }

    if !is_cli(matches, "no_pre_lookup")
        && let Some(no_pre_lookup) = config.no_pre_lookup
    {
        target.no_pre_lookup = no_pre_lookup;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        target.verbose = verbose;
    }

    Ok(())
}

fn apply_search(args: &mut SearchArgs, matches: &ArgMatches, config: &SearchConfig) -> AppResult<()> {
    if !is_cli(matches, "start")
        && let Some(start) = config.start
    {
        args.start = positive("search.start", start)?;
    }

    if !is_cli(matches, "max")
        && let Some(max) = config.max
    {
        args.max = positive("search.max", max)?;
    }

    if !is_cli(matches, "step")
        && let Some(step) = config.step
    {
        args.step = positive("search.step", step)?;
    }

    if !is_cli(matches, "threshold")
        && let Some(threshold) = config.threshold
    {
        args.threshold = field("search.threshold", check_threshold(threshold))?;
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "stop_on_failure")
        && let Some(stop) = config.stop_on_failure
    {
        args.stop_on_failure = stop;
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = Some(field("search.rate", check_rate(rate))?);
    }

    if !is_cli(matches, "pause")
        && let Some(pause) = config.pause.as_ref()
    {
        args.pause = field("search.pause", pause.to_pause())?;
    }

    if !is_cli(matches, "no_verify")
        && let Some(verify) = config.verify
    {
        args.no_verify = !verify;
    }

    Ok(())
}

fn apply_sweep(args: &mut SweepArgs, matches: &ArgMatches, config: &SweepConfig) -> AppResult<()> {
    if !is_cli(matches, "concurrency")
        && let Some(levels) = config.concurrency.as_ref()
    {
        if levels.is_empty() {
            return field("sweep.concurrency", Err(ValidationError::EmptyConcurrencyList));
        }
        args.concurrency = levels
            .iter()
            .map(|level| positive("sweep.concurrency", *level))
            .collect::<AppResult<Vec<_>>>()?;
    }

    if !is_cli(matches, "rps")
        && let Some(rates) = config.rps.as_ref()
    {
        if rates.is_empty() {
            return field("sweep.rps", Err(ValidationError::EmptyRateList));
        }
        args.rps = rates
            .iter()
            .map(|rate| field("sweep.rps", check_rate(*rate)))
            .collect::<AppResult<Vec<_>>>()?;
    }

    if !is_cli(matches, "single_test")
        && let Some(single_test) = config.single_test
    {
        args.single_test = single_test;
    }

    if !is_cli(matches, "threshold")
        && let Some(threshold) = config.threshold
    {
        args.threshold = field("sweep.threshold", check_threshold(threshold))?;
    }

    if !is_cli(matches, "pause")
        && let Some(pause) = config.pause.as_ref()
    {
        args.pause = field("sweep.pause", pause.to_pause())?;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn field<T>(field: &'static str, value: Result<T, ValidationError>) -> AppResult<T> {
    value.map_err(|err| AppError::config(ConfigError::InvalidField { field, source: err }))
}

fn positive(name: &'static str, value: u64) -> AppResult<PositiveU64> {
    field(name, PositiveU64::try_from(value))
}
