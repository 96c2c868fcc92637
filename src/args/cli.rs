use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::search::{SearchSettings, SweepSettings};

use super::defaults::{
    DEFAULT_API_KEY_ENV, DEFAULT_AUTH_SCHEME, DEFAULT_BASE_URL, DEFAULT_ENDPOINT, DEFAULT_REQUESTS,
    DEFAULT_THRESHOLD,
};
use super::parsers::{
    parse_duration_arg, parse_pause_arg, parse_positive_u64, parse_rate, parse_threshold,
};
use super::types::{PositiveU64, SearchMethod};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Finds the highest request concurrency an HTTP API sustains while keeping its success rate above a threshold."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    #[must_use]
    pub const fn target(&self) -> &TargetArgs {
        match &self.command {
            Command::Search(args) => &args.target,
            Command::Sweep(args) => &args.target,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Search for the highest concurrency meeting the success threshold
    Search(SearchArgs),
    /// Probe fixed concurrency and rate combinations and compare them
    Sweep(SweepArgs),
}

/// Target and transport options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct TargetArgs {
    /// API base URL
    #[arg(long = "base-url", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Endpoint path joined onto the base URL
    #[arg(long = "endpoint", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Requests sent per probe
    #[arg(long = "requests", short = 'n', default_value_t = DEFAULT_REQUESTS)]
    pub requests: u64,

    /// Per-request timeout (supports ms/s/m/h, bare number = seconds)
    #[arg(long = "timeout", default_value = "30s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Environment variable holding the API key
    #[arg(long = "api-key-env", default_value = DEFAULT_API_KEY_ENV)]
    pub api_key_env: String,

    /// Authorization scheme placed before the key
    #[arg(long = "auth-scheme", default_value = DEFAULT_AUTH_SCHEME)]
    pub auth_scheme: String,

    /// Skip resolving the target host before the first probe
    #[arg(long = "no-pre-lookup")]
    pub no_pre_lookup: bool,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Enable debug logging and per-probe detail
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Lowest concurrency considered
    #[arg(long = "start", default_value = "1", value_parser = parse_positive_u64)]
    pub start: PositiveU64,

    /// Highest concurrency considered
    #[arg(long = "max", default_value = "10000", value_parser = parse_positive_u64)]
    pub max: PositiveU64,

    /// Increment between linear probes
    #[arg(long = "step", default_value = "10", value_parser = parse_positive_u64)]
    pub step: PositiveU64,

    /// Success-rate percentage a probe must reach
    #[arg(long = "threshold", default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Search policy
    #[arg(long = "method", value_enum, default_value_t = SearchMethod::Binary)]
    pub method: SearchMethod,

    /// Stop a linear search at the first failing level
    #[arg(long = "stop-on-failure")]
    pub stop_on_failure: bool,

    /// Cap dispatches per second within each probe (0 = unlimited)
    #[arg(long = "rate", value_parser = parse_rate)]
    pub rate: Option<f64>,

    /// Delay between probes (supports ms/s/m/h, 0 disables)
    #[arg(long = "pause", default_value = "1s", value_parser = parse_pause_arg)]
    pub pause: Duration,

    /// Skip the confirmation probe after a binary search
    #[arg(long = "no-verify")]
    pub no_verify: bool,
}

impl SearchArgs {
    #[must_use]
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            start: self.start.get(),
            max: self.max.get(),
            step: self.step.get(),
            threshold: self.threshold,
            requests_per_probe: self.target.requests,
            rate_limit: self.rate.filter(|rate| *rate > 0.0),
            pause: self.pause,
            stop_on_failure: self.stop_on_failure,
            verify: !self.no_verify,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Concurrency levels to probe
    #[arg(
        long = "concurrency",
        short = 'c',
        num_args = 1..,
        default_values = ["1", "5", "10", "20"],
        value_parser = parse_positive_u64
    )]
    pub concurrency: Vec<PositiveU64>,

    /// Dispatch rates to probe per level (0 = unlimited)
    #[arg(long = "rps", num_args = 1.., default_values = ["0"], value_parser = parse_rate)]
    pub rps: Vec<f64>,

    /// Probe only the first concurrency level at the first rate
    #[arg(long = "single-test")]
    pub single_test: bool,

    /// Success-rate percentage marking a combination as passing
    #[arg(long = "threshold", default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Delay between probes (supports ms/s/m/h, 0 disables)
    #[arg(long = "pause", default_value = "2s", value_parser = parse_pause_arg)]
    pub pause: Duration,
}

impl SweepArgs {
    #[must_use]
    pub fn settings(&self) -> SweepSettings {
        SweepSettings {
            concurrency_levels: self.concurrency.iter().map(|level| level.get()).collect(),
            rates: self.rps.clone(),
            requests_per_probe: self.target.requests,
            threshold: self.threshold,
            pause: self.pause,
            single_test: self.single_test,
        }
    }
}
