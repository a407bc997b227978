// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix of the variables Trellis reads, e.g. `TRELLIS_DATABASE_DSN`
pub const ENV_PREFIX: &str = "TRELLIS";

/// Environment variable loader
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader for `TRELLIS_*` variables
    pub fn trellis() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// All matching variables, keyed by lower-cased name without the prefix
    ///
    /// Variables that are not valid unicode are skipped.
    pub fn load(&self) -> HashMap<String, String> {
        env::vars_os()
            .filter_map(|(key, value)| {
                let key = key.into_string().ok()?;
                let value = value.into_string().ok()?;
                match &self.prefix {
                    Some(prefix) => key
                        .strip_prefix(prefix.as_str())
                        .and_then(|rest| rest.strip_prefix('_'))
                        .map(|rest| (rest.to_lowercase(), value)),
                    None => Some((key.to_lowercase(), value)),
                }
            })
            .collect()
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load one variable; `key` is upper-cased and prefixed
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// The variable's value, if set to valid unicode
    pub fn get(&self, key: &str) -> Option<String> {
        self.load_var(key).ok()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
