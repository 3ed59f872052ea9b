//! Visitor session domain module.
//!
//! A `Session` is the server-side key/value bag kept between HTTP requests.
//! Stores persist it as a `SessionRecord`; the auth gate keeps its record
//! under a reserved key inside it.

#[allow(clippy::module_inception)]
mod session;

pub use session::{Session, SessionRecord};
