//! Input/output helpers.
//!
//! - tolerant header/field resolution (`fields`)
//! - daily report decoding + folder loading (`ingest`)
//! - consolidated dataset JSON export (`export`)

pub mod export;
pub mod fields;
pub mod ingest;

pub use export::*;
pub use fields::{FieldResolver, HeaderMap};
pub use ingest::*;
