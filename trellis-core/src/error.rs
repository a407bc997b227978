// Error types for the Trellis framework

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed construction or setter input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The same route was registered twice on one router.
    #[error("Route already registered: {0}")]
    DuplicateRoute(String),

    /// No route pattern matched the URL.
    #[error("No route matches URL: {0}")]
    NoRouteFound(String),

    /// A route points at a module with no registered controller.
    #[error("No controller registered for module: {0}")]
    HandlerNotFound(String),

    #[error("Action \"{action}\" is not defined on module {module} (expected {method})")]
    ActionNotFound {
        module: String,
        action: String,
        method: String,
    },

    #[error("Manager not found: {0}")]
    ManagerTypeNotFound(String),

    /// A handler was asked to do something its lifecycle no longer allows.
    #[error("Invalid handler state: {0}")]
    InvalidState(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    ///
    /// Only a routing miss is a client-facing 404. Missing controllers,
    /// actions, managers and views mean the application is misconfigured.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NoRouteFound(_) => 404,
            _ => 500,
        }
    }

    /// Whether this is the recoverable "no route" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NoRouteFound(_))
    }

    /// Whether this error points at a broken route table or registry.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::DuplicateRoute(_)
                | Error::HandlerNotFound(_)
                | Error::ActionNotFound { .. }
                | Error::ManagerTypeNotFound(_)
        )
    }
}
