//! Reporting utilities: formatted terminal summaries.

pub mod format;

pub use format::*;
