//! Interpolation strategies and the tangent estimates they consume.

pub mod context;
pub mod functions;
pub mod tangent;
pub mod types;

pub use context::*;
pub use functions::*;
pub use types::*;
