// Trellis - A page-controller MVC framework for Rust
//
// Route tables map URLs to module controllers; a front controller resolves each
// request, runs the controller's action and renders its view inside a layout.

// Re-export core functionality
pub use trellis_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use trellis_config;

#[cfg(feature = "testing")]
pub use trellis_testing;

pub use serde;
pub use serde_json;

#[cfg(feature = "config")]
mod bootstrap;

#[cfg(feature = "config")]
pub use bootstrap::FromConfig;

/// Prelude module for convenient imports
pub mod prelude {
    pub use trellis_core::logging::{debug, error, info, trace, warn};
    pub use trellis_core::{
        ActionMap, AppContext, Application, ApplicationBuilder, Controller, ControllerContext,
        ControllerRegistry, Cookie, Dispatch, Error, HttpRequest, HttpResponse, ManagerFactories,
        Page, RouteTable, ViewLocator, ViewRenderer,
    };

    #[cfg(feature = "config")]
    pub use crate::FromConfig;
    #[cfg(feature = "config")]
    pub use trellis_config::{AppConfig, EnvLoader, Validate};
}
