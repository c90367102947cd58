//! Upstream data retrieval.

pub mod archive;

pub use archive::*;
