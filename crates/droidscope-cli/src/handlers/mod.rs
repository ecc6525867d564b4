//! Command handlers.

pub mod check_tools;
pub mod serve;
