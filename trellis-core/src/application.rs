// Application bootstrapper and front controller

use crate::controller::{AppContext, Controller};
use crate::dispatcher::{ControllerRegistry, Dispatch, Dispatcher};
use crate::logging::{debug, error, info, warn};
use crate::{
    ConnectionHandle, Error, HttpRequest, HttpResponse, ManagerFactories, Page, RouteTable,
    ViewLocator, ViewRenderer,
};
use std::any::Any;
use std::sync::Arc;

/// Data-access api used when none is configured
pub const DEFAULT_API: &str = "PDO";

/// The main application struct
///
/// Holds the immutable, shared state (route table, registries, connection
/// handle, view configuration) and turns each request into a response via
/// [`Application::run`]. Nothing is mutated across requests.
#[derive(Clone)]
pub struct Application {
    dispatcher: Dispatcher,
    renderer: Arc<dyn ViewRenderer>,
}

impl Application {
    pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.context().name()
    }

    pub fn context(&self) -> &AppContext {
        self.dispatcher.app()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Resolve the back-controller for `request`
    pub fn get_controller(&self, request: HttpRequest) -> Result<Dispatch, Error> {
        self.dispatcher.resolve(request)
    }

    /// Serve one request
    ///
    /// Unmatched URLs produce a 404. Every other failure is logged and
    /// answered with a 500.
    pub fn run(&self, request: HttpRequest) -> HttpResponse {
        let method = request.method().to_string();
        let uri = request.request_uri().to_string();

        match self.handle(request) {
            Ok(response) => {
                debug!(
                    method = method.as_str(),
                    uri = uri.as_str(),
                    status = response.status,
                    "Request served"
                );
                response
            }
            Err(err) => {
                error!(
                    method = method.as_str(),
                    uri = uri.as_str(),
                    error = %err,
                    "Request failed"
                );
                HttpResponse::from_error(&err)
            }
        }
    }

    fn handle(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let resolved = match self.get_controller(request)? {
            Dispatch::Found(resolved) => resolved,
            Dispatch::NotFound { path } => return Ok(self.not_found(&path)),
        };

        let (mut handler, request) = resolved.into_parts();
        handler.execute(&request)?;

        let context = handler.into_context();
        let redirect = context.is_redirect();
        let (page, mut response) = context.into_parts();
        if redirect {
            return Ok(response);
        }

        let layout = self.context().views().layout(self.name());
        let html = page.generate(self.renderer.as_ref(), &layout)?;
        response.add_header("Content-Type", "text/html; charset=utf-8");
        response.body = html.into_bytes();
        Ok(response)
    }

    fn not_found(&self, path: &str) -> HttpResponse {
        let fallback = || HttpResponse::from_error(&Error::NoRouteFound(path.to_string()));

        let Some(view) = self.context().views().not_found() else {
            return fallback();
        };

        let views = self.context().views();
        let rendered = Page::with_content_file(&view)
            .and_then(|page| page.generate(self.renderer.as_ref(), &views.layout(self.name())));

        match rendered {
            Ok(body) => HttpResponse::html(404, body),
            Err(err) => {
                warn!(path, view = %view.display(), error = %err, "Not-found page failed to render");
                fallback()
            }
        }
    }
}

/// Builder for [`Application`]
pub struct ApplicationBuilder {
    name: String,
    api: String,
    connection: ConnectionHandle,
    routes: RouteTable,
    controllers: ControllerRegistry,
    managers: ManagerFactories,
    views: ViewLocator,
    renderer: Option<Arc<dyn ViewRenderer>>,
}

impl ApplicationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api: DEFAULT_API.to_string(),
            connection: Arc::new(()),
            routes: RouteTable::new(),
            controllers: ControllerRegistry::new(),
            managers: ManagerFactories::new(),
            views: ViewLocator::default(),
            renderer: None,
        }
    }

    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Append one route to the table
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
        self.routes = self.routes.route(pattern, module, action, vars);
        self
    }

    pub fn controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = controllers;
        self
    }

    /// Register the controller serving `module`
    pub fn controller<C, F>(mut self, module: impl Into<String>, make: F) -> Self
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.controllers.register(module, make);
        self
    }

    pub fn managers(mut self, managers: ManagerFactories) -> Self {
        self.managers = managers;
        self
    }

    /// Data-access api managers are looked up for (default `PDO`)
    pub fn api(mut self, api: impl Into<String>) -> Self {
        self.api = api.into();
        self
    }

    /// Shared connection handed to manager factories
    pub fn connection<T: Any + Send + Sync>(self, connection: T) -> Self {
        self.connection_handle(Arc::new(connection))
    }

    pub fn connection_handle(mut self, connection: ConnectionHandle) -> Self {
        self.connection = connection;
        self
    }

    pub fn views(mut self, views: ViewLocator) -> Self {
        self.views = views;
        self
    }

    pub fn renderer<R: ViewRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn renderer_arc(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the application
    ///
    /// The route table is compiled once here so a broken table fails at
    /// startup rather than on the first request.
    pub fn build(self) -> Result<Application, Error> {
        if self.api.is_empty() {
            return Err(Error::InvalidArgument(
                "manager api must be a non-empty string".to_string(),
            ));
        }
        let renderer = self
            .renderer
            .ok_or_else(|| Error::InvalidArgument("no view renderer configured".to_string()))?;

        let app = AppContext::new(self.name, self.api, self.connection, self.managers, self.views)?;
        let controllers = self.controllers.len();
        let dispatcher = Dispatcher::new(Arc::new(app), self.routes, self.controllers)?;

        info!(
            app = dispatcher.app().name(),
            routes = dispatcher.routes().len(),
            controllers,
            "Application built"
        );

        Ok(Application {
            dispatcher,
            renderer,
        })
    }
}
