// Test application builder

use crate::RecordingRenderer;
use serde::de::DeserializeOwned;
use std::any::Any;
use trellis_core::{
    Application, ApplicationBuilder, ConnectionHandle, Controller, Cookie, Dispatch, Error,
    HttpRequest, HttpResponse, ManagerFactories, RouteTable, ViewLocator,
};

/// An application wired for tests, with a [`RecordingRenderer`]
pub struct TestApp {
    app: Application,
    renderer: RecordingRenderer,
}

impl TestApp {
    pub fn app(&self) -> &Application {
        &self.app
    }

    /// Handle on the renderer, to inspect which views were rendered
    pub fn renderer(&self) -> &RecordingRenderer {
        &self.renderer
    }

    pub fn get(&self, uri: &str) -> TestResponse {
        self.request(HttpRequest::get(uri))
    }

    /// POST a urlencoded form
    pub fn post(&self, uri: &str, form: &str) -> TestResponse {
        self.request(HttpRequest::post(uri).with_form_body(form))
    }

    pub fn request(&self, request: HttpRequest) -> TestResponse {
        TestResponse::new(self.app.run(request))
    }

    /// Resolve `uri` without executing anything
    pub fn dispatch(&self, uri: &str) -> Result<Dispatch, Error> {
        self.app.get_controller(HttpRequest::get(uri))
    }
}

/// Builder for test applications
pub struct TestAppBuilder {
    builder: ApplicationBuilder,
    managers: ManagerFactories,
    api: String,
    renderer: RecordingRenderer,
}

impl TestAppBuilder {
    /// A builder for an application named `Frontend`
    pub fn new() -> Self {
        Self::named("Frontend")
    }

    pub fn named(name: &str) -> Self {
        Self {
            builder: Application::builder(name).views(ViewLocator::new("views")),
            managers: ManagerFactories::new(),
            api: trellis_core::DEFAULT_API.to_string(),
            renderer: RecordingRenderer::new(),
        }
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.builder = self.builder.routes(routes);
        self
    }

    pub fn with_route<I, S>(mut self, pattern: &str, module: &str, action: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder = self.builder.route(pattern, module, action, vars);
        self
    }

    pub fn with_controller<C, F>(mut self, module: &str, make: F) -> Self
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.builder = self.builder.controller(module, make);
        self
    }

    /// Serve `module`'s manager with a clone of `manager`
    pub fn with_manager<M>(mut self, module: &str, manager: M) -> Self
    where
        M: Clone + Send + Sync + 'static,
    {
        let api = self.api.clone();
        self.managers
            .register(module, api, move |_: &ConnectionHandle| Ok(manager.clone()));
        self
    }

    /// Data-access api; set it before registering managers
    pub fn with_api(mut self, api: &str) -> Self {
        self.api = api.to_string();
        self.builder = self.builder.api(api);
        self
    }

    pub fn with_connection<T: Any + Send + Sync>(mut self, connection: T) -> Self {
        self.builder = self.builder.connection(connection);
        self
    }

    pub fn with_views(mut self, views: ViewLocator) -> Self {
        self.builder = self.builder.views(views);
        self
    }

    pub fn with_renderer(mut self, renderer: RecordingRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn build(self) -> Result<TestApp, Error> {
        let app = self
            .builder
            .managers(self.managers)
            .renderer(self.renderer.clone())
            .build()?;

        Ok(TestApp {
            app,
            renderer: self.renderer,
        })
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Response returned by [`TestApp`] requests
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: HttpResponse,
}

impl TestResponse {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn body_string(&self) -> String {
        self.response.body_string()
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.response.body)
    }

    /// Header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response
            .headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.response.cookies.iter().find(|c| c.name == name)
    }

    pub fn inner(&self) -> &HttpResponse {
        &self.response
    }

    pub fn into_inner(self) -> HttpResponse {
        self.response
    }

    /// Chaining form of [`crate::assert_status`]
    pub fn assert_status(&self, expected: u16) -> &Self {
        crate::assert_status(self, expected);
        self
    }

    /// Chaining form of [`crate::assert_body_contains`]
    pub fn assert_body_contains(&self, expected: &str) -> &Self {
        crate::assert_body_contains(self, expected);
        self
    }
}
