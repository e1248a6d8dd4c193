//! Shared types and models for the Blending Operations Suite
//!
//! This crate holds the formula calculation engine and everything around it
//! that has no I/O: unit conversion, size parsing, template validation and
//! the report row model with its renderers. The backend, and the browser via
//! WASM, both run this same code.

pub mod calculator;
pub mod models;
pub mod render;
pub mod report;
pub mod size;
pub mod types;
pub mod units;
pub mod validation;

pub use calculator::*;
pub use models::*;
pub use report::*;
pub use size::*;
pub use types::*;
pub use units::*;
pub use validation::*;
