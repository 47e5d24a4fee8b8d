//! Command-line surface: argument parsing, telemetry bootstrap, and
//! dispatch to the server action.

pub mod actions;
pub mod commands;
pub mod dispatch;
pub mod start;
pub mod telemetry;

pub use start::start;
