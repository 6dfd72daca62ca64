#![no_std]

extern crate alloc;

pub mod solver;

//

mod floatgeneric;

pub use floatgeneric::*;

//

mod indexed_vector;
mod packed_matrix;

pub use indexed_vector::*;
pub use packed_matrix::*;

//

mod factorization;
mod progress;

pub use factorization::*;
pub use progress::*;

//

mod simplex;
mod simplex_primal;

pub use simplex::*;

//

pub mod quadratic;
