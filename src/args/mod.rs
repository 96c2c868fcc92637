//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod parsers;
mod types;


pub use cli::{Cli, Command, SearchArgs, SweepArgs, TargetArgs};
pub use defaults::{DEFAULT_API_KEY_ENV, DEFAULT_AUTH_SCHEME, DEFAULT_BASE_URL, DEFAULT_ENDPOINT};
pub use parsers::{parse_duration_arg, parse_pause_arg, parse_rate, parse_threshold};
pub use types::{PositiveU64, SearchMethod};

pub(crate) use parsers::{check_rate, check_threshold, parse_duration_value};
