//! Back-controllers
//!
//! A back-controller serves one module. It is built per request, bound to
//! the module and action the router selected, and executes exactly one
//! action. Actions are plain functions registered by name in an
//! [`ActionMap`]:
//!
//! ```
//! use trellis_core::{ActionMap, Controller, ControllerContext, Error, HttpRequest};
//!
//! #[derive(Default)]
//! struct NewsController;
//!
//! impl NewsController {
//!     fn list(&mut self, ctx: &mut ControllerContext, _req: &HttpRequest) -> Result<(), Error> {
//!         ctx.page_mut().add_var("title", "Latest news")
//!     }
//! }
//!
//! impl Controller for NewsController {
//!     fn actions() -> ActionMap<Self> {
//!         ActionMap::new().action("list", Self::list)
//!     }
//! }
//! ```

use crate::logging::debug;
use crate::{ConnectionHandle, Error, HttpRequest, HttpResponse, ManagerFactories, Managers, Page, ViewLocator};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An action: mutates the controller and its context for one request
pub type ActionFn<C> = fn(&mut C, &mut ControllerContext, &HttpRequest) -> Result<(), Error>;

/// Conventional method name of an action, e.g. `show` -> `executeShow`
///
/// Only used in diagnostics.
pub fn action_method_name(action: &str) -> String {
    let mut chars = action.chars();
    match chars.next() {
        Some(first) => format!("execute{}{}", first.to_uppercase(), chars.as_str()),
        None => "execute".to_string(),
    }
}

/// Actions of a controller, by name
pub struct ActionMap<C> {
    actions: HashMap<String, ActionFn<C>>,
}

impl<C> ActionMap<C> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Register an action, builder style
    pub fn action(mut self, name: impl Into<String>, action: ActionFn<C>) -> Self {
        self.insert(name, action);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, action: ActionFn<C>) {
        self.actions.insert(name.into(), action);
    }

    pub fn get(&self, name: &str) -> Option<ActionFn<C>> {
        self.actions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl<C> Default for ActionMap<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ActionMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ActionMap").field("actions", &names).finish()
    }
}

/// A module's controller
pub trait Controller: Send + Sized + 'static {
    /// The actions this controller answers to
    fn actions() -> ActionMap<Self>;
}

/// Immutable, application-wide state every controller is built from
#[derive(Clone)]
pub struct AppContext {
    name: String,
    api: String,
    connection: ConnectionHandle,
    managers: Arc<ManagerFactories>,
    views: ViewLocator,
}

impl AppContext {
    pub fn new(
        name: impl Into<String>,
        api: impl Into<String>,
        connection: ConnectionHandle,
        managers: ManagerFactories,
        views: ViewLocator,
    ) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "application name must be a non-empty string".to_string(),
            ));
        }

        Ok(Self {
            name,
            api: api.into(),
            connection,
            managers: Arc::new(managers),
            views,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data-access api managers are built for
    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub fn manager_factories(&self) -> &Arc<ManagerFactories> {
        &self.managers
    }

    pub fn views(&self) -> &ViewLocator {
        &self.views
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("name", &self.name)
            .field("api", &self.api)
            .field("managers", &self.managers)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

/// Per-request state of a back-controller
///
/// Owns the page being built, the response actions may adjust, and the
/// manager registry, all of which live exactly as long as the controller.
#[derive(Debug)]
pub struct ControllerContext {
    app: Arc<AppContext>,
    module: String,
    action: String,
    view: String,
    page: Page,
    response: HttpResponse,
    managers: Managers,
}

impl ControllerContext {
    /// Bind a fresh context to `module` and `action`; the view defaults to
    /// the action
    pub fn new(
        app: Arc<AppContext>,
        module: impl Into<String>,
        action: impl Into<String>,
    ) -> Result<Self, Error> {
        let managers = Managers::new(
            app.api(),
            Arc::clone(app.connection()),
            Arc::clone(app.manager_factories()),
        )?;
        let action = action.into();

        let mut context = Self {
            app,
            module: String::new(),
            action: String::new(),
            view: String::new(),
            page: Page::new(),
            response: HttpResponse::ok(),
            managers,
        };
        context.set_module(module)?;
        context.set_action(action.clone())?;
        context.set_view(action)?;
        Ok(context)
    }

    pub fn set_module(&mut self, module: impl Into<String>) -> Result<(), Error> {
        self.module = required(module.into(), "module")?;
        Ok(())
    }

    pub fn set_action(&mut self, action: impl Into<String>) -> Result<(), Error> {
        self.action = required(action.into(), "action")?;
        Ok(())
    }

    /// Select the view to render; also points the page at its file
    pub fn set_view(&mut self, view: impl Into<String>) -> Result<(), Error> {
        let view = required(view.into(), "view")?;
        let content_file = self.app.views().locate(self.app.name(), &self.module, &view);
        self.page.set_content_file(content_file)?;
        self.view = view;
        Ok(())
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn managers(&mut self) -> &mut Managers {
        &mut self.managers
    }

    /// Shorthand for `managers().get::<M>(module)`
    pub fn manager<M: Send + Sync + 'static>(&mut self, module: &str) -> Result<Arc<M>, Error> {
        self.managers.get(module)
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Response headers and cookies set here are sent with the page
    pub fn response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    /// Answer with a redirect instead of rendering the page
    pub fn redirect(&mut self, location: impl Into<String>) {
        let mut redirect = HttpResponse::redirect(location);
        redirect.cookies = std::mem::take(&mut self.response.cookies);
        self.response = redirect;
    }

    /// Whether an action asked for a redirect
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.response.status)
    }

    pub fn into_parts(self) -> (Page, HttpResponse) {
        (self.page, self.response)
    }
}

fn required(value: String, what: &str) -> Result<String, Error> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must be a non-empty string", what)));
    }
    Ok(value)
}

/// Lifecycle of a back-controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Configured,
    Executing,
    Terminal,
}

/// A back-controller the front controller can drive without knowing its type
pub trait Handler: Send {
    /// Run the bound action against `request`
    ///
    /// May be called once; later calls fail with [`Error::InvalidState`].
    fn execute(&mut self, request: &HttpRequest) -> Result<(), Error>;

    fn state(&self) -> HandlerState;

    fn context(&self) -> &ControllerContext;

    fn context_mut(&mut self) -> &mut ControllerContext;

    fn into_context(self: Box<Self>) -> ControllerContext;

    fn module(&self) -> &str {
        self.context().module()
    }

    fn action(&self) -> &str {
        self.context().action()
    }

    fn view(&self) -> &str {
        self.context().view()
    }

    fn page(&self) -> &Page {
        self.context().page()
    }
}

/// Drives a [`Controller`] through a single action
pub struct BackController<C: Controller> {
    controller: C,
    actions: Arc<ActionMap<C>>,
    context: ControllerContext,
    state: HandlerState,
}

impl<C: Controller> BackController<C> {
    pub fn new(controller: C, actions: Arc<ActionMap<C>>, context: ControllerContext) -> Self {
        Self {
            controller,
            actions,
            context,
            state: HandlerState::Configured,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }
}

impl<C: Controller> Handler for BackController<C> {
    fn execute(&mut self, request: &HttpRequest) -> Result<(), Error> {
        if self.state != HandlerState::Configured {
            return Err(Error::InvalidState(format!(
                "{}::{} has already been executed",
                self.context.module(),
                self.context.action()
            )));
        }
        self.state = HandlerState::Executing;

        let Some(action) = self.actions.get(self.context.action()) else {
            self.state = HandlerState::Terminal;
            return Err(Error::ActionNotFound {
                module: self.context.module().to_string(),
                action: self.context.action().to_string(),
                method: action_method_name(self.context.action()),
            });
        };

        debug!(
            module = self.context.module(),
            action = self.context.action(),
            "Executing action"
        );
        let result = action(&mut self.controller, &mut self.context, request);
        self.state = HandlerState::Terminal;
        result
    }

    fn state(&self) -> HandlerState {
        self.state
    }

    fn context(&self) -> &ControllerContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ControllerContext {
        &mut self.context
    }

    fn into_context(self: Box<Self>) -> ControllerContext {
        self.context
    }
}

impl<C: Controller> fmt::Debug for BackController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackController")
            .field("controller", &std::any::type_name::<C>())
            .field("context", &self.context)
            .field("state", &self.state)
            .finish()
    }
}
