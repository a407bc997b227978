//! Testing utilities for the Trellis framework.
//!
//! - **TestApp** - run requests through a fully wired application
//! - **RecordingRenderer** - deterministic view rendering with history
//! - **MockManager** / **CallLog** - data-access stand-ins that record calls
//! - **Assertions** - response and dispatch checks
//!
//! ## Quick Start
//!
//! ```
//! use trellis_core::{ActionMap, Controller, ControllerContext, Error, HttpRequest};
//! use trellis_testing::*;
//!
//! #[derive(Default)]
//! struct NewsController;
//!
//! impl NewsController {
//!     fn show(&mut self, ctx: &mut ControllerContext, req: &HttpRequest) -> Result<(), Error> {
//!         ctx.page_mut().add_var("id", req.query("id"))
//!     }
//! }
//!
//! impl Controller for NewsController {
//!     fn actions() -> ActionMap<Self> {
//!         ActionMap::new().action("show", Self::show)
//!     }
//! }
//!
//! let app = TestAppBuilder::new()
//!     .with_route(r"/news/(\d+)", "News", "show", ["id"])
//!     .with_controller("News", NewsController::default)
//!     .build()
//!     .unwrap();
//!
//! let response = app.get("/news/42");
//! assert_status(&response, 200);
//! assert_body_contains(&response, "id=42");
//! ```
//!
//! ## Mock Managers
//!
//! ```
//! use trellis_testing::MockManager;
//!
//! let mock = MockManager::new("News").with_return(3usize);
//! assert_eq!(mock.call("count"), Some(3));
//! assert!(mock.was_called("count"));
//! ```

mod assertions;
mod mock;
mod renderer;
mod test_app;

pub use assertions::{
    assert_body_contains, assert_dispatched, assert_header, assert_redirect, assert_status,
};
pub use mock::{CallLog, MockManager};
pub use renderer::RecordingRenderer;
pub use test_app::{TestApp, TestAppBuilder, TestResponse};
