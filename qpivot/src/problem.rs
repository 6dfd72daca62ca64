use num_traits::{Float, Zero};
use qpivot_core::solver::{LinAlg, SolverError};
use qpivot_core::PackedMatrix;
use crate::MatBuild;

mod lp;
mod qp;

pub use lp::*;
pub use qp::*;

//

/// Rows \\(Gx \preceq h\\) stacked over \\(Ax = b\\).
///
/// Returns the matrix \\(\[G; A\]\\) and the row bounds.
fn stacked_rows<L: LinAlg>(
    mat_g: &MatBuild<L>, vec_h: &MatBuild<L>,
    mat_a: &MatBuild<L>, vec_b: &MatBuild<L>) -> Result<(PackedMatrix<L::F>, Vec<L::F>, Vec<L::F>), SolverError>
{
    let (m, n) = mat_g.size();
    let (p, _) = mat_a.size();
    let mut triplets = Vec::new();

    for c in 0.. n {
        for r in 0.. m {
            let v = mat_g[(r, c)];
            if v != L::F::zero() {
                triplets.push((r, c, v));
            }
        }
        for r in 0.. p {
            let v = mat_a[(r, c)];
            if v != L::F::zero() {
                triplets.push((m + r, c, v));
            }
        }
    }

    let mat = match PackedMatrix::from_triplets(m + p, n, &triplets) {
        Some(mat) => mat,
        None => {
            log::error!("Size mismatch: G {:?}, A {:?}", mat_g.size(), mat_a.size());
            return Err(SolverError::InvalidOp);
        },
    };

    let mut row_lower = vec![L::F::neg_infinity(); m];
    let mut row_upper = vec_h.as_ref().to_vec();
    row_lower.extend_from_slice(vec_b.as_ref());
    row_upper.extend_from_slice(vec_b.as_ref());

    Ok((mat, row_lower, row_upper))
}
