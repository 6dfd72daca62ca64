//! Solver traits and errors

mod linalg;
mod solver_error;

pub use linalg::*;
pub use solver_error::*;
