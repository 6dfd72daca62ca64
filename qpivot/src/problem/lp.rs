use num_traits::Float;
use qpivot_core::solver::{LinAlg, SolverError};
use qpivot_core::Simplex;
use crate::MatBuild;
use super::stacked_rows;

//

/// Linear program
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js"></script>
///
/// The problem is
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & c^T x \\\\
/// {\rm subject \ to} & G x \preceq h \\\\
/// & A x = b \\\\
/// & l \preceq x \preceq u,
/// \end{array}
/// \\]
/// where
/// - variables \\( x \in \mathbb{R}^n \\)
/// - \\( c \in \mathbb{R}^n \\)
/// - \\( G \in \mathbb{R}^{m \times n},\ h \in \mathbb{R}^m \\)
/// - \\( A \in \mathbb{R}^{p \times n},\ b \in \mathbb{R}^p \\)
/// - \\( l, u \\) are \\(-\infty, \infty\\) unless given by [`ProbLP::col_bounds`].
pub struct ProbLP<L: LinAlg>
{
    vec_c: MatBuild<L>,
    mat_g: MatBuild<L>,
    vec_h: MatBuild<L>,
    mat_a: MatBuild<L>,
    vec_b: MatBuild<L>,

    col_lower: Vec<L::F>,
    col_upper: Vec<L::F>,
}

impl<L: LinAlg> ProbLP<L>
{
    /// Creates a LP with given data.
    ///
    /// Returns a [`ProbLP`] instance.
    /// * `vec_c` is \\(c\\).
    /// * `mat_g` is \\(G\\).
    /// * `vec_h` is \\(h\\).
    /// * `mat_a` is \\(A\\).
    /// * `vec_b` is \\(b\\).
    pub fn new(
        vec_c: MatBuild<L>,
        mat_g: MatBuild<L>, vec_h: MatBuild<L>,
        mat_a: MatBuild<L>, vec_b: MatBuild<L>) -> Self
    {
        let n = vec_c.size().0;
        let m = vec_h.size().0;
        let p = vec_b.size().0;

        assert_eq!(vec_c.size(), (n, 1));
        assert_eq!(mat_g.size(), (m, n));
        assert_eq!(vec_h.size(), (m, 1));
        assert_eq!(mat_a.size(), (p, n));
        assert_eq!(vec_b.size(), (p, 1));

        ProbLP {
            vec_c,
            mat_g,
            vec_h,
            mat_a,
            vec_b,
            col_lower: vec![L::F::neg_infinity(); n],
            col_upper: vec![L::F::infinity(); n],
        }
    }

    /// Builder pattern setting the bounds \\(l\\) and \\(u\\) of the variables.
    pub fn col_bounds(mut self, lower: &[L::F], upper: &[L::F]) -> Self
    {
        self.col_lower.copy_from_slice(lower);
        self.col_upper.copy_from_slice(upper);
        self
    }

    /// Loads the problem into `simplex` at its all-logical basis.
    ///
    /// Returns `Err` with [`SolverError::InvalidOp`] for inconsistent data.
    pub fn problem(&self, simplex: &mut Simplex<L>) -> Result<(), SolverError>
    {
        let (mat, row_lower, row_upper) = stacked_rows(&self.mat_g, &self.vec_h, &self.mat_a, &self.vec_b)?;

        simplex.load_problem(mat, &self.col_lower, &self.col_upper, self.vec_c.as_ref(), &row_lower, &row_upper)
    }
}
