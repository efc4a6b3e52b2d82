#![forbid(unsafe_code)]
//! exapply-core: row/value types, boolean operator tags, engine config, errors.
//!
//! Pure data; no operator logic lives here. Operators and the executor depend
//! on this crate so they agree on what a `Row` is.

pub mod config;
pub mod error;
pub mod prelude;
pub mod types;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use types::{BoolOperator, Row, Scalar};
