// Ordered route matching

use crate::logging::{debug, trace};
use crate::{Error, Route};

/// Router holding routes in match-priority order
///
/// Lookup is a linear scan in registration order and the first route whose
/// pattern matches the whole URL wins. Overlapping patterns are therefore
/// resolved by declaration order, never by specificity.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route to the router
    ///
    /// Fails with [`Error::DuplicateRoute`] if this very route (or a clone of
    /// it) is already registered. Distinct routes with the same pattern are
    /// accepted.
    pub fn add_route(&mut self, route: Route) -> Result<(), Error> {
        if self.routes.iter().any(|r| r.id() == route.id()) {
            return Err(Error::DuplicateRoute(format!(
                "{} ({} -> {}::{})",
                route.id(),
                route.pattern(),
                route.module(),
                route.action()
            )));
        }

        trace!(
            pattern = route.pattern(),
            module = route.module(),
            action = route.action(),
            "Route registered"
        );
        self.routes.push(route);
        Ok(())
    }

    /// Find the first route matching `url` and bind its variables
    pub fn get_route(&mut self, url: &str) -> Result<&Route, Error> {
        let found = self.routes.iter().enumerate().find_map(|(index, route)| {
            trace!(pattern = route.pattern(), url, "Trying route");
            route.match_url(url).map(|captures| (index, captures))
        });

        let Some((index, captures)) = found else {
            debug!(url, "No route matched");
            return Err(Error::NoRouteFound(url.to_string()));
        };

        let route = &mut self.routes[index];
        if route.has_variables() {
            route.bind_variables(&captures[1..]);
        }

        debug!(
            url,
            module = route.module(),
            action = route.action(),
            "Route matched"
        );
        Ok(&*route)
    }

    /// Registered routes in priority order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_VARS: [&str; 0] = [];

    #[test]
    fn test_router_add_route() {
        let mut router = Router::new();
        router
            .add_route(Route::new("/test", "Test", "index", NO_VARS).unwrap())
            .unwrap();
        assert_eq!(router.len(), 1);
        assert!(!router.is_empty());
    }

    #[test]
    fn test_duplicate_instance_rejected() {
        let mut router = Router::new();
        let route = Route::new("/news", "News", "list", NO_VARS).unwrap();

        router.add_route(route.clone()).unwrap();
        let result = router.add_route(route);

        assert!(matches!(result, Err(Error::DuplicateRoute(_))));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_identical_patterns_coexist_first_wins() {
        let mut router = Router::new();
        router
            .add_route(Route::new("/news", "News", "list", NO_VARS).unwrap())
            .unwrap();
        router
            .add_route(Route::new("/news", "Archive", "list", NO_VARS).unwrap())
            .unwrap();

        assert_eq!(router.len(), 2);
        assert_eq!(router.get_route("/news").unwrap().module(), "News");
    }

    #[test]
    fn test_first_match_wins_over_specificity() {
        let mut router = Router::new();
        router
            .add_route(Route::new(r"/news/(.+)", "News", "slug", ["slug"]).unwrap())
            .unwrap();
        router
            .add_route(Route::new(r"/news/(\d+)", "News", "show", ["id"]).unwrap())
            .unwrap();

        let route = router.get_route("/news/42").unwrap();
        assert_eq!(route.action(), "slug");
        assert_eq!(route.var("slug"), Some("42"));
    }

    #[test]
    fn test_binds_variables_on_match() {
        let mut router = Router::new();
        router
            .add_route(Route::new(r"/item/(\d+)/(\w+)", "Items", "show", ["a", "b"]).unwrap())
            .unwrap();

        let route = router.get_route("/item/5/blue").unwrap();
        assert_eq!(route.var("a"), Some("5"));
        assert_eq!(route.var("b"), Some("blue"));
    }

    #[test]
    fn test_route_without_variables_binds_nothing() {
        let mut router = Router::new();
        router
            .add_route(Route::new(r"/(\d+)", "Pages", "show", NO_VARS).unwrap())
            .unwrap();

        let route = router.get_route("/12").unwrap();
        assert!(route.vars().is_empty());
    }

    #[test]
    fn test_no_route_found() {
        let mut router = Router::new();
        router
            .add_route(Route::new("/news", "News", "list", NO_VARS).unwrap())
            .unwrap();

        let result = router.get_route("/unknown");
        assert!(matches!(result, Err(Error::NoRouteFound(url)) if url == "/unknown"));
    }

    #[test]
    fn test_empty_router_finds_nothing() {
        let mut router = Router::new();
        assert!(router.get_route("/").unwrap_err().is_not_found());
    }
}
