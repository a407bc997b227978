//! Route definitions
//!
//! A [`Route`] binds a regular-expression URL pattern to a module/action
//! pair. Parenthesized groups in the pattern are bound, in order, to the
//! route's declared variable names once the route is selected for a request.
//!
//! ```
//! use trellis_core::Route;
//!
//! let mut route = Route::new(r"/news/(\d+)", "News", "show", ["id"]).unwrap();
//!
//! let captures = route.match_url("/news/42").unwrap();
//! assert_eq!(captures, vec!["/news/42".to_string(), "42".to_string()]);
//!
//! route.bind_variables(&captures[1..]);
//! assert_eq!(route.var("id"), Some("42"));
//! ```

use crate::Error;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ROUTE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a constructed route.
///
/// Every call to [`Route::new`] yields a fresh id; clones keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u64);

impl RouteId {
    fn next() -> Self {
        RouteId(NEXT_ROUTE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A URL pattern bound to a module and action
#[derive(Debug, Clone)]
pub struct Route {
    id: RouteId,
    pattern: String,
    regex: Regex,
    module: String,
    action: String,
    var_names: Vec<String>,
    vars: HashMap<String, String>,
}

impl Route {
    /// Create a new route.
    ///
    /// Fails with [`Error::InvalidArgument`] when the pattern, module or
    /// action is empty, a variable name is empty, the pattern is not a valid
    /// regular expression, or more variable names are declared than the
    /// pattern has capture groups.
    pub fn new<I, S>(
        pattern: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
        var_names: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pattern = non_empty(pattern.into(), "route pattern")?;
        let module = non_empty(module.into(), "route module")?;
        let action = non_empty(action.into(), "route action")?;

        let var_names = var_names
            .into_iter()
            .map(|name| non_empty(name.into(), "route variable name"))
            .collect::<Result<Vec<_>, _>>()?;

        // Anchor the whole pattern so alternations cannot match a substring.
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            Error::InvalidArgument(format!("route pattern '{}' is invalid: {}", pattern, e))
        })?;

        let groups = regex.captures_len() - 1;
        if var_names.len() > groups {
            return Err(Error::InvalidArgument(format!(
                "route pattern '{}' has {} capture group(s) but {} variable name(s)",
                pattern,
                groups,
                var_names.len()
            )));
        }

        Ok(Self {
            id: RouteId::next(),
            pattern,
            regex,
            module,
            action,
            var_names,
            vars: HashMap::new(),
        })
    }

    /// Whether the route declares capture variables
    pub fn has_variables(&self) -> bool {
        !self.var_names.is_empty()
    }

    /// Match the full URL against this route's pattern.
    ///
    /// Returns every capture group in order, the whole match at index 0.
    /// Groups that did not participate in the match are returned as empty
    /// strings. Does not touch the bound variables.
    pub fn match_url(&self, url: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(url)?;

        Some(
            captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Bind capture groups 1..N to the declared variable names, positionally.
    ///
    /// The previous bindings are replaced wholesale. Every declared name
    /// receives a value; names without a corresponding capture get "".
    pub fn bind_variables<S: AsRef<str>>(&mut self, captures: &[S]) {
        self.vars = self
            .var_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = captures.get(i).map(|c| c.as_ref()).unwrap_or_default();
                (name.clone(), value.to_string())
            })
            .collect();
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Variables bound by the last successful lookup
    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// Get a bound variable by name
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|s| s.as_str())
    }
}

fn non_empty(value: String, what: &str) -> Result<String, Error> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must be a non-empty string", what)));
    }
    Ok(value)
}
