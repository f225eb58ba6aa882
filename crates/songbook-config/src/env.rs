use std::str::FromStr;

use crate::paths::ConfigError;

/// Reads `key` from the environment and parses it.
///
/// Unset or empty variables yield `Ok(None)`; a value that does not parse is
/// an error rather than being silently ignored.
pub fn env_override<T>(key: &str) -> Result<Option<T>, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match std::env::var(key) {
    Ok(raw) if raw.trim().is_empty() => Ok(None),
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map(Some)
      .map_err(|e| ConfigError::Other(format!("invalid value for {key}: {e}"))),
    Err(_) => Ok(None),
  }
}
