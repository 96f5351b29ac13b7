pub mod avatar;
pub mod database;
pub mod server;
pub mod stream;

use std::env;
use std::str::FromStr;

pub(crate) fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Read and parse `var_name`, warning and falling back to `default` when the
/// value does not parse.
pub(crate) fn parse_env<T: FromStr + Copy + std::fmt::Display>(var_name: &str, default: T) -> T {
    match env::var(var_name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} '{}', using default {}", var_name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
