//! HTTP handlers for the Blending Operations Suite

pub mod batches;
pub mod health;
pub mod reports;
pub mod templates;

pub use batches::*;
pub use health::*;
pub use reports::*;
pub use templates::*;
