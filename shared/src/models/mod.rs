//! Domain models for the blending operations suite

mod batch;
mod calc_params;
mod ingredient;
mod template;

pub use batch::*;
pub use calc_params::*;
pub use ingredient::*;
pub use template::*;
