//! `case-series` library crate.
//!
//! The binary (`cases`) is a thin wrapper around this library so that:
//!
//! - the aggregation core is testable without spawning processes
//! - the ingest/export boundaries can be swapped without touching the core
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
