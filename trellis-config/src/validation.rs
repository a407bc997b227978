// Configuration validation

use crate::{ConfigError, Result};
use std::fmt::Debug;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable field checks
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of<T: PartialEq + Debug>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of {:?} (got {:?})",
                field, allowed, value
            )));
        }
        Ok(())
    }

    /// Module, action and application names: `[A-Za-z_][A-Za-z0-9_]*`
    pub fn is_identifier(value: &str, field: &str) -> Result<()> {
        let mut chars = value.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };

        if !valid {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an identifier (got '{}')",
                field, value
            )));
        }
        Ok(())
    }
}

/// Collects every failed check instead of stopping at the first
#[derive(Debug, Default)]
pub struct ValidationReport {
    problems: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a check
    pub fn check(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.problems.push(match err {
                ConfigError::ValidationError(message) => message,
                other => other.to_string(),
            });
        }
    }

    pub fn push(&mut self, problem: impl Into<String>) {
        self.problems.push(problem.into());
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// `Ok` if nothing failed, else one error listing every problem
    pub fn finish(self) -> Result<()> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(self.problems.join("; ")))
        }
    }
}
