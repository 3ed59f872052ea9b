//! Routing domain module.
//!
//! `Route` is the controller/action/params tuple used both as a redirect
//! target and as the "last attempted route" breadcrumb of the auth gate.

mod policy;
mod route;

pub use policy::RoutePolicy;
pub use route::Route;
