//! Staple - Session-backed authentication gate
//!
//! This crate provides a per-visitor authentication state machine kept in a
//! server-side session, pluggable credential adapters (database, directory,
//! token) resolved from configuration, and a parameterized SQL builder.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod query;
