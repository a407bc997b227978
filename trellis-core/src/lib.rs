// Core library for the Trellis MVC framework
// Routing, front-controller dispatch, back-controllers and per-request managers

pub mod application;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod logging;
pub mod managers;
pub mod page;
pub mod route;
pub mod route_table;
pub mod router;
pub mod view;

// Re-export commonly used types
pub use application::*;
pub use controller::*;
pub use dispatcher::*;
pub use error::*;
pub use http::{Cookie, HttpRequest, HttpResponse};
pub use managers::*;
pub use page::*;
pub use route::*;
pub use route_table::*;
pub use router::*;
pub use view::*;
