use std::io::ErrorKind;
use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError, ValidationError};

/// Dotenv-style file consulted when the variable is not exported.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Looks up the API key named `var` in the environment, then in `./.env`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingCredential`] when neither source has a
/// non-blank value, or a config error when the env file cannot be read.
pub fn resolve_credential(var: &str) -> AppResult<String> {
    resolve_credential_with(var, std::env::var(var).ok(), Path::new(DEFAULT_ENV_FILE))
}

/// Same as [`resolve_credential`], with the environment value and env file
/// supplied by the caller.
///
/// # Errors
///
/// See [`resolve_credential`].
pub fn resolve_credential_with(
    var: &str,
    env_value: Option<String>,
    env_file: &Path,
) -> AppResult<String> {
    if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
        return Ok(value.trim().to_owned());
    }

    let content = match std::fs::read_to_string(env_file) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(AppError::config(ConfigError::ReadEnvFile {
                path: env_file.to_path_buf(),
                source: err,
            }));
        }
    };

    if let Some(value) = content.as_deref().and_then(|text| find_env_entry(text, var)) {
        tracing::debug!("Using {} from {}", var, env_file.display());
        return Ok(value);
    }

    Err(AppError::validation(ValidationError::MissingCredential {
        var: var.to_owned(),
    }))
}

/// Last non-blank `KEY=VALUE` entry for `key`.
pub(super) fn find_env_entry(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .rev()
        .filter_map(parse_env_line)
        .find(|(name, value)| *name == key && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (name, value) = line.split_once('=')?;
    Some((name.trim(), unquote(value.trim())))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
