//! HTTP request handlers for the Axum web server.
//!
//! Handlers validate query parameters, open a session through the
//! `SessionManager` and either stream it or return its JSON result.

pub mod adb;
pub mod frida;
pub mod sessions;
pub mod terminal;
