//! `cookiecast` library crate.
//!
//! The binary (`cookiecast`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., a future service front-end, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod backtest;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod report;
