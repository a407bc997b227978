//! Building applications from configuration files

use std::any::Any;
use trellis_config::{AppConfig, DatabaseConfig};
use trellis_core::{Application, ApplicationBuilder, Error};

/// Construct an [`Application`] from an [`AppConfig`]
///
/// The configuration supplies the name, routes, api and view locations.
/// Controllers, manager factories, the connection and the renderer are code,
/// so they are added to the returned builder by the caller.
///
/// ```
/// use trellis::prelude::*;
/// use trellis::trellis_config::FileFormat;
///
/// let config = AppConfig::from_str(
///     r#"
///         name = "Backend"
///         [[routes]]
///         pattern = "/admin/"
///         module = "Dashboard"
///         action = "index"
///     "#,
///     FileFormat::Toml,
/// )
/// .unwrap();
///
/// let builder = Application::from_config(&config).unwrap();
/// # let _ = builder;
/// ```
pub trait FromConfig: Sized {
    fn from_config(config: &AppConfig) -> Result<ApplicationBuilder, Error>;

    /// Like [`FromConfig::from_config`], also opening the shared connection
    ///
    /// `connect` receives the `[database]` section, `dsn` included, and its
    /// result becomes the connection handed to manager factories.
    fn from_config_with<C, F>(config: &AppConfig, connect: F) -> Result<ApplicationBuilder, Error>
    where
        C: Any + Send + Sync,
        F: FnOnce(&DatabaseConfig) -> Result<C, Error>,
    {
        let builder = Self::from_config(config)?;
        let connection = connect(&config.database)?;
        Ok(builder.connection(connection))
    }
}

impl FromConfig for Application {
    fn from_config(config: &AppConfig) -> Result<ApplicationBuilder, Error> {
        trellis_config::Validate::validate(config)?;

        Ok(Application::builder(config.name.as_str())
            .routes(config.route_table())
            .api(config.database.api.as_str())
            .views(config.view_locator()))
    }
}
