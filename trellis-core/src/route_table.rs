//! Declarative route tables
//!
//! A [`RouteTable`] is the ordered list of route definitions an application
//! dispatches against. Order is significant: it becomes the router's match
//! priority. Tables are usually deserialized from configuration, where the
//! variable list may be written either as an array or as a single
//! comma-separated string:
//!
//! ```toml
//! [[routes]]
//! pattern = "/news"
//! module = "News"
//! action = "list"
//!
//! [[routes]]
//! pattern = "/news/(\\d+)-(.+)"
//! module = "News"
//! action = "show"
//! vars = "id,slug"
//! ```

use crate::{Error, Route, Router};
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of a route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub pattern: String,
    pub module: String,
    pub action: String,
    #[serde(default, deserialize_with = "deserialize_vars")]
    pub vars: Vec<String>,
}

impl RouteDefinition {
    pub fn new<I, S>(
        pattern: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
        vars: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            module: module.into(),
            action: action.into(),
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a fresh [`Route`] from this definition
    pub fn to_route(&self) -> Result<Route, Error> {
        Route::new(
            self.pattern.as_str(),
            self.module.as_str(),
            self.action.as_str(),
            self.vars.iter().map(String::as_str),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VarsRepr {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_vars<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match VarsRepr::deserialize(deserializer)? {
        VarsRepr::List(vars) => vars,
        VarsRepr::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Ordered route definitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition, builder style
    pub fn route<I, S>(
        mut self,
        pattern: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
        vars: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes
            .push(RouteDefinition::new(pattern, module, action, vars));
        self
    }

    pub fn push(&mut self, definition: RouteDefinition) {
        self.routes.push(definition);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    /// Build a router holding one fresh route per definition, in order
    pub fn build_router(&self) -> Result<Router, Error> {
        let mut router = Router::new();
        for definition in &self.routes {
            router.add_route(definition.to_route()?)?;
        }
        Ok(router)
    }
}

impl From<Vec<RouteDefinition>> for RouteTable {
    fn from(routes: Vec<RouteDefinition>) -> Self {
        Self { routes }
    }
}

impl FromIterator<RouteDefinition> for RouteTable {
    fn from_iter<T: IntoIterator<Item = RouteDefinition>>(iter: T) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}
