//! Quadratic programming on the simplex engine
//!
//! A convex quadratic program is solved either by complementary pivoting
//! on an enlarged model of its KKT conditions ([`crate::Simplex::primal_quadratic`]),
//! or by successive linear programming ([`crate::Simplex::primal_slp`]).

mod objective;
mod info;
mod enlarge;
mod primal;
mod slp;

pub use objective::*;
pub use info::{Phase, QuadraticInfo};
pub use primal::*;
pub use slp::*;
