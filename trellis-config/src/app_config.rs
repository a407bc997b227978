//! Application configuration
//!
//! One file describes an application: its name, its route table, where its
//! views live, which data-access api its managers use and how it logs.
//!
//! ```toml
//! name = "Frontend"
//!
//! [views]
//! root = "Applications"
//! extension = "php"
//! not_found = "Errors/404.html"
//!
//! [database]
//! api = "PDO"
//! dsn = "mysql://localhost/news"
//!
//! [log]
//! level = "debug"
//! format = "pretty"
//!
//! [[routes]]
//! pattern = "/news"
//! module = "News"
//! action = "list"
//!
//! [[routes]]
//! pattern = "/news/(\\d+)"
//! module = "News"
//! action = "show"
//! vars = "id"
//! ```
//!
//! Every setting except the routes has a default. `TRELLIS_*` environment
//! variables override the scalar settings, see [`AppConfig::apply_env`].

use crate::loader::from_value;
use crate::{ConfigError, ConfigLoader, ConfigValidator, EnvLoader, FileFormat, Result, Validate, ValidationReport};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trellis_core::logging::{LogConfig, LogFormat, LogLevel};
use trellis_core::{RouteDefinition, RouteTable, ViewLocator};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];
const LOG_FORMATS: [&str; 4] = ["json", "plain", "pretty", "compact"];

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub routes: Vec<RouteDefinition>,
    pub views: ViewsConfig,
    pub database: DatabaseConfig,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub root: String,
    pub extension: String,
    pub layout: String,
    /// Page shown for unmatched URLs, relative to `root`
    pub not_found: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Selects the manager implementations, e.g. `PDO`
    pub api: String,
    pub dsn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Frontend".to_string(),
            routes: Vec::new(),
            views: ViewsConfig::default(),
            database: DatabaseConfig::default(),
            log: LogSettings::default(),
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            root: "Applications".to_string(),
            extension: "php".to_string(),
            layout: "layout".to_string(),
            not_found: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            api: "PDO".to_string(),
            dsn: None,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a `.json`, `.toml` or `.env` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ConfigLoader::auto(path)?.load(path)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str, format: FileFormat) -> Result<Self> {
        from_value(ConfigLoader::new(format).parse(content)?)
    }

    /// Load, apply `TRELLIS_*` overrides, then validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(&EnvLoader::trellis());
        config.validate()?;
        Ok(config)
    }

    /// Override scalar settings from the environment
    ///
    /// Reads `NAME`, `LOG_LEVEL`, `LOG_FORMAT`, `DATABASE_API` and
    /// `DATABASE_DSN` under the loader's prefix.
    pub fn apply_env(&mut self, env: &EnvLoader) {
        if let Some(name) = env.get("name") {
            self.name = name;
        }
        if let Some(level) = env.get("log_level") {
            self.log.level = level;
        }
        if let Some(format) = env.get("log_format") {
            self.log.format = format;
        }
        if let Some(api) = env.get("database_api") {
            self.database.api = api;
        }
        if let Some(dsn) = env.get("database_dsn") {
            self.database.dsn = Some(dsn);
        }
    }

    /// Load variables from a `.env` file into the process environment
    ///
    /// Without a path, a missing `.env` in the working directory is ignored.
    pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))
            }
            None => {
                dotenvy::dotenv().ok();
                Ok(())
            }
        }
    }

    pub fn route_table(&self) -> RouteTable {
        RouteTable::from(self.routes.clone())
    }

    pub fn view_locator(&self) -> ViewLocator {
        let locator = ViewLocator::new(&self.views.root)
            .with_extension(self.views.extension.as_str())
            .with_layout(self.views.layout.as_str());

        match &self.views.not_found {
            Some(page) => locator.with_not_found(page),
            None => locator,
        }
    }

    /// Logging setup described by the `[log]` section
    pub fn log_config(&self) -> Result<LogConfig> {
        let level = LogLevel::parse(&self.log.level).ok_or_else(|| {
            ConfigError::ValidationError(format!("unknown log level '{}'", self.log.level))
        })?;
        let format = LogFormat::parse(&self.log.format).ok_or_else(|| {
            ConfigError::ValidationError(format!("unknown log format '{}'", self.log.format))
        })?;

        Ok(LogConfig::new().level(level).format(format))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        let mut report = ValidationReport::new();

        report.check(ConfigValidator::is_identifier(&self.name, "name"));
        report.check(ConfigValidator::not_empty(&self.views.root, "views.root"));
        report.check(ConfigValidator::not_empty(&self.views.layout, "views.layout"));
        report.check(ConfigValidator::not_empty(&self.database.api, "database.api"));
        report.check(ConfigValidator::one_of(
            &self.log.level.to_lowercase().as_str(),
            &LOG_LEVELS,
            "log.level",
        ));
        report.check(ConfigValidator::one_of(
            &self.log.format.to_lowercase().as_str(),
            &LOG_FORMATS,
            "log.format",
        ));

        for (index, route) in self.routes.iter().enumerate() {
            validate_route(&mut report, index, route);
        }

        report.finish()
    }
}

fn validate_route(report: &mut ValidationReport, index: usize, route: &RouteDefinition) {
    let field = |name: &str| format!("routes[{}].{}", index, name);

    report.check(ConfigValidator::not_empty(&route.pattern, &field("pattern")));
    report.check(ConfigValidator::is_identifier(&route.module, &field("module")));
    report.check(ConfigValidator::is_identifier(&route.action, &field("action")));
    for (var_index, var) in route.vars.iter().enumerate() {
        report.check(ConfigValidator::is_identifier(
            var,
            &field(&format!("vars[{}]", var_index)),
        ));
    }

    // Only report the compile error when the fields themselves were fine
    let fields_ok = !route.pattern.is_empty() && !route.module.is_empty() && !route.action.is_empty();
    if fields_ok {
        if let Err(err) = route.to_route() {
            report.push(format!("{}: {}", field("pattern"), err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        name = "Frontend"

        [views]
        root = "apps"
        extension = "html"
        not_found = "Errors/404.html"

        [database]
        dsn = "mysql://localhost/news"

        [[routes]]
        pattern = "/news"
        module = "News"
        action = "list"

        [[routes]]
        pattern = "/news/(\\d+)-(.+)"
        module = "News"
        action = "show"
        vars = "id,slug"
    "#;

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_str(CONFIG, FileFormat::Toml).unwrap();

        assert_eq!(config.name, "Frontend");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].vars, vec!["id", "slug"]);
        assert_eq!(config.database.api, "PDO");
        assert_eq!(config.database.dsn.as_deref(), Some("mysql://localhost/news"));
        assert_eq!(config.log, LogSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_empty_document() {
        let config = AppConfig::from_str("{}", FileFormat::Json).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_route_table_and_locator() {
        let config = AppConfig::from_str(CONFIG, FileFormat::Toml).unwrap();

        let mut router = config.route_table().build_router().unwrap();
        let route = router.get_route("/news/3-hello").unwrap();
        assert_eq!(route.var("slug"), Some("hello"));

        let locator = config.view_locator();
        assert_eq!(
            locator.locate("Frontend", "News", "show"),
            std::path::PathBuf::from("apps/Frontend/Modules/News/Views/show.html")
        );
        assert_eq!(
            locator.not_found(),
            Some(std::path::PathBuf::from("apps/Errors/404.html"))
        );
    }

    #[test]
    fn test_validate_collects_route_problems() {
        let mut config = AppConfig::from_str(CONFIG, FileFormat::Toml).unwrap();
        config.routes.push(RouteDefinition::new("/broken/(", "News", "show", ["id"]));
        config.routes.push(RouteDefinition::new("", "news-module", "list", Vec::<String>::new()));
        config.log.level = "loud".to_string();

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("routes[2].pattern"), "{}", message);
        assert!(message.contains("routes[3].pattern cannot be empty"), "{}", message);
        assert!(message.contains("routes[3].module"), "{}", message);
        assert!(message.contains("log.level"), "{}", message);
    }

    #[test]
    fn test_log_config() {
        let mut config = AppConfig::default();
        config.log.level = "DEBUG".to_string();
        config.log.format = "compact".to_string();

        let log = config.log_config().unwrap();
        assert_eq!(log.level, LogLevel::Debug);
        assert_eq!(log.format, LogFormat::Compact);

        config.log.format = "xml".to_string();
        assert!(config.log_config().is_err());
    }

    #[test]
    fn test_apply_env_without_variables() {
        let mut config = AppConfig::default();
        config.apply_env(&EnvLoader::new(Some("TRELLIS_UNSET_PREFIX_4821".to_string())));
        assert_eq!(config, AppConfig::default());
    }
}
