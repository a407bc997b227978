// Front-controller dispatch: URL -> route -> back-controller

use crate::controller::{BackController, Controller, ControllerContext, Handler};
use crate::logging::{debug, warn};
use crate::{ActionMap, AppContext, Error, HttpRequest, RouteTable, Router};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type HandlerFactory = Arc<dyn Fn(ControllerContext) -> Box<dyn Handler> + Send + Sync>;

/// Conventional controller name for a module, e.g. `News` -> `NewsController`
///
/// Only used in diagnostics.
pub fn controller_name(module: &str) -> String {
    format!("{}Controller", module)
}

/// Controller factories keyed by module name, populated at startup
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the controller serving `module`
    ///
    /// `make` builds a fresh controller for every request. The action map is
    /// collected once, here.
    pub fn register<C, F>(&mut self, module: impl Into<String>, make: F)
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let module = module.into();
        let actions: Arc<ActionMap<C>> = Arc::new(C::actions());
        debug!(
            module = module.as_str(),
            controller = std::any::type_name::<C>(),
            actions = actions.len(),
            "Controller registered"
        );

        self.factories.insert(
            module,
            Arc::new(move |context: ControllerContext| {
                Box::new(BackController::new(make(), Arc::clone(&actions), context))
                    as Box<dyn Handler>
            }),
        );
    }

    /// Register a `Default`-constructible controller for `module`
    pub fn register_default<C>(&mut self, module: impl Into<String>)
    where
        C: Controller + Default,
    {
        self.register(module, C::default);
    }

    pub fn contains(&self, module: &str) -> bool {
        self.factories.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the back-controller for `module`, bound to `action`
    pub fn instantiate(
        &self,
        app: Arc<AppContext>,
        module: &str,
        action: &str,
    ) -> Result<Box<dyn Handler>, Error> {
        let factory = self.factories.get(module).ok_or_else(|| {
            Error::HandlerNotFound(format!("{} (expected {})", module, controller_name(module)))
        })?;

        let context = ControllerContext::new(app, module, action)?;
        Ok(factory(context))
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modules: Vec<_> = self.factories.keys().collect();
        modules.sort();
        f.debug_struct("ControllerRegistry")
            .field("modules", &modules)
            .finish()
    }
}

/// A back-controller ready to execute, and the request to execute it with
///
/// The request's query parameters already include the matched route
/// variables.
pub struct ResolvedHandler {
    pub handler: Box<dyn Handler>,
    pub request: HttpRequest,
}

impl ResolvedHandler {
    /// Execute the bound action with the resolved request
    pub fn execute(&mut self) -> Result<(), Error> {
        self.handler.execute(&self.request)
    }

    pub fn into_parts(self) -> (Box<dyn Handler>, HttpRequest) {
        (self.handler, self.request)
    }
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandler")
            .field("module", &self.handler.module())
            .field("action", &self.handler.action())
            .field("request", &self.request)
            .finish()
    }
}

/// Outcome of resolving a request
#[derive(Debug)]
pub enum Dispatch {
    Found(ResolvedHandler),
    /// No route matched; the caller answers with a 404
    NotFound { path: String },
}

impl Dispatch {
    pub fn is_found(&self) -> bool {
        matches!(self, Dispatch::Found(_))
    }
}

/// Front controller: resolves a request to a back-controller
#[derive(Debug, Clone)]
pub struct Dispatcher {
    app: Arc<AppContext>,
    routes: Arc<RouteTable>,
    compiled: Arc<Router>,
    controllers: Arc<ControllerRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher, compiling `routes` once
    ///
    /// Fails with the route table's construction error when a pattern is
    /// invalid or a route is registered twice.
    pub fn new(
        app: Arc<AppContext>,
        routes: RouteTable,
        controllers: ControllerRegistry,
    ) -> Result<Self, Error> {
        let compiled = routes.build_router()?;

        Ok(Self {
            app,
            routes: Arc::new(routes),
            compiled: Arc::new(compiled),
            controllers: Arc::new(controllers),
        })
    }

    pub fn app(&self) -> &Arc<AppContext> {
        &self.app
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Resolve `request` to the back-controller serving it
    ///
    /// Every call matches against a fresh copy of the compiled routes, so
    /// variables bound for one request never leak into another. An unmatched
    /// path is [`Dispatch::NotFound`]; a module without a controller is an
    /// error.
    pub fn resolve(&self, mut request: HttpRequest) -> Result<Dispatch, Error> {
        let mut router = Router::clone(&self.compiled);

        let route = match router.get_route(request.path()) {
            Ok(route) => route,
            Err(err) if err.is_not_found() => {
                warn!(path = request.path(), "No route found");
                return Ok(Dispatch::NotFound {
                    path: request.path().to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        request.overlay_query(route.vars());
        let handler = self
            .controllers
            .instantiate(Arc::clone(&self.app), route.module(), route.action())?;

        debug!(
            path = request.path(),
            module = handler.module(),
            action = handler.action(),
            "Request dispatched"
        );
        Ok(Dispatch::Found(ResolvedHandler { handler, request }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManagerFactories, ViewLocator};

    #[derive(Default)]
    struct NewsController;

    impl NewsController {
        fn show(&mut self, ctx: &mut ControllerContext, req: &HttpRequest) -> Result<(), Error> {
            ctx.page_mut().add_var("id", req.query("id"))
        }
    }

    impl Controller for NewsController {
        fn actions() -> ActionMap<Self> {
            ActionMap::new().action("show", Self::show)
        }
    }

    const NO_VARS: [&str; 0] = [];

    fn dispatcher(routes: RouteTable) -> Dispatcher {
        let app = AppContext::new(
            "Frontend",
            "PDO",
            Arc::new(()),
            ManagerFactories::new(),
            ViewLocator::new("apps"),
        )
        .unwrap();
        let mut controllers = ControllerRegistry::new();
        controllers.register_default::<NewsController>("News");
        Dispatcher::new(Arc::new(app), routes, controllers).unwrap()
    }

    #[test]
    fn test_resolve_overlays_route_vars() {
        let dispatcher =
            dispatcher(RouteTable::new().route(r"/news/(\d+)", "News", "show", ["id"]));

        let dispatch = dispatcher
            .resolve(HttpRequest::get("/news/42?id=1&page=3"))
            .unwrap();
        let Dispatch::Found(mut resolved) = dispatch else {
            panic!("expected a handler");
        };

        assert_eq!(resolved.request.query("id"), Some("42"));
        assert_eq!(resolved.request.query("page"), Some("3"));
        assert_eq!(resolved.handler.module(), "News");

        resolved.execute().unwrap();
        assert_eq!(
            resolved.handler.page().var("id"),
            Some(&serde_json::json!("42"))
        );
    }

    #[test]
    fn test_resolve_not_found() {
        let dispatcher = dispatcher(RouteTable::new().route("/news", "News", "show", NO_VARS));
        let dispatch = dispatcher.resolve(HttpRequest::get("/missing?x=1")).unwrap();
        assert!(matches!(dispatch, Dispatch::NotFound { ref path } if path == "/missing"));
    }

    #[test]
    fn test_resolve_unknown_module() {
        let dispatcher = dispatcher(RouteTable::new().route("/users", "Users", "list", NO_VARS));
        let err = dispatcher.resolve(HttpRequest::get("/users")).unwrap_err();
        assert!(matches!(err, Error::HandlerNotFound(ref msg) if msg.contains("UsersController")));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_new_fails_fast_on_bad_table() {
        let app = AppContext::new(
            "Frontend",
            "PDO",
            Arc::new(()),
            ManagerFactories::new(),
            ViewLocator::new("apps"),
        )
        .unwrap();
        let routes = RouteTable::new()
            .route("/news", "News", "show", NO_VARS)
            .route("/bad/(", "News", "show", NO_VARS);

        assert!(matches!(
            Dispatcher::new(Arc::new(app), routes, ControllerRegistry::new()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_compiled_routes_are_not_shared_between_requests() {
        let dispatcher = dispatcher(
            RouteTable::new()
                .route(r"/news/(\d+)", "News", "show", ["id"])
                .route("/news", "News", "show", NO_VARS),
        );

        let Dispatch::Found(_) = dispatcher.resolve(HttpRequest::get("/news/7")).unwrap() else {
            panic!("expected a handler");
        };
        let Dispatch::Found(resolved) = dispatcher.resolve(HttpRequest::get("/news")).unwrap()
        else {
            panic!("expected a handler");
        };

        assert_eq!(resolved.request.query("id"), None);
        assert!(dispatcher.compiled.routes().iter().all(|r| r.vars().is_empty()));
        assert_eq!(dispatcher.compiled.len(), dispatcher.routes().len());
    }

    #[test]
    fn test_each_resolve_builds_fresh_handler() {
        let dispatcher =
            dispatcher(RouteTable::new().route(r"/news/(\d+)", "News", "show", ["id"]));

        for id in ["1", "2"] {
            let Dispatch::Found(resolved) = dispatcher
                .resolve(HttpRequest::get(format!("/news/{}", id)))
                .unwrap()
            else {
                panic!("expected a handler");
            };
            assert_eq!(resolved.request.query("id"), Some(id));
        }
    }

    #[test]
    fn test_registry_contents() {
        let mut registry = ControllerRegistry::new();
        assert!(registry.is_empty());
        registry.register("News", || NewsController);
        assert!(registry.contains("News"));
        assert!(!registry.contains("news"));
        assert_eq!(registry.len(), 1);
        assert_eq!(controller_name("News"), "NewsController");
    }
}
