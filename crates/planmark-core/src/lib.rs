//! # PlanMark Core
//!
//! Shared foundations for the PlanMark annotation engine: the error
//! taxonomy used across crates and the engine-wide constants (minimum
//! gesture sizes, hit-test tolerances, default tool style).

pub mod constants;
pub mod error;

pub use error::{DecodeError, Error, GeometryError, Result};
