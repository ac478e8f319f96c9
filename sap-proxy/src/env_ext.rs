//! Small helper for the common "fill unset CLI option from env var" pattern.

use std::str::FromStr;

use anyhow::{Context, anyhow};

pub trait OrEnvExt {
    /// If `self` is `None`, try to fill it from the `var` environment
    /// variable, parsing via [`FromStr`]. Leaves `self` untouched (and
    /// returns `Ok`) if `var` isn't set.
    fn or_env_mut(&mut self, var: &'static str) -> anyhow::Result<()>;
}

impl<T> OrEnvExt for Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn or_env_mut(&mut self, var: &'static str) -> anyhow::Result<()> {
        if self.is_some() {
            return Ok(());
        }
        match std::env::var(var) {
            Ok(value) => {
                let parsed = value
                    .parse::<T>()
                    .map_err(|e| anyhow!("Failed to parse ${var}: {e}"))
                    .with_context(|| format!("Invalid value for ${var}"))?;
                *self = Some(parsed);
                Ok(())
            }
            Err(std::env::VarError::NotPresent) => Ok(()),
            Err(e) => Err(anyhow!("Failed to read ${var}: {e}")),
        }
    }
}
