// Configuration management for the Trellis framework

pub mod app_config;
pub mod env;
pub mod error;
pub mod loader;
pub mod routes;
pub mod validation;

pub use app_config::{AppConfig, DatabaseConfig, LogSettings, ViewsConfig};
pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use routes::RouteTableLoader;
pub use validation::{ConfigValidator, Validate, ValidationReport};
