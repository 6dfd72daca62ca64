use num_traits::Float;
use qpivot_core::solver::{LinAlg, SolverError};
use qpivot_core::Simplex;
use qpivot_core::quadratic::QuadraticObjective;
use crate::MatBuild;
use super::stacked_rows;

//

/// Quadratic program
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js"></script>
///
/// The problem is
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & {1 \over 2} x^T P x + q^T x + r \\\\
/// {\rm subject \ to} & G x \preceq h \\\\
/// & A x = b \\\\
/// & l \preceq x \preceq u,
/// \end{array}
/// \\]
/// where
/// - variables \\( x \in \mathbb{R}^n \\)
/// - \\( P \in \mathcal{S}_{+}^n,\ q \in \mathbb{R}^n,\ r \in \mathbb{R} \\)
/// - \\( G \in \mathbb{R}^{m \times n},\ h \in \mathbb{R}^m \\)
/// - \\( A \in \mathbb{R}^{p \times n},\ b \in \mathbb{R}^p \\)
/// - \\( l, u \\) are \\(-\infty, \infty\\) unless given by [`ProbQP::col_bounds`].
///
/// In the following, \\( r \\) does not appear since it does not matter.
pub struct ProbQP<L: LinAlg>
{
    sym_p: MatBuild<L>,
    vec_q: MatBuild<L>,
    mat_g: MatBuild<L>,
    vec_h: MatBuild<L>,
    mat_a: MatBuild<L>,
    vec_b: MatBuild<L>,

    col_lower: Vec<L::F>,
    col_upper: Vec<L::F>,
}

impl<L: LinAlg> ProbQP<L>
{
    /// Creates a QP with given data.
    ///
    /// Returns a [`ProbQP`] instance.
    /// * `sym_p` is \\(P\\) which shall belong to [`qpivot_core::MatType::SymPack`].
    /// * `vec_q` is \\(q\\).
    /// * `mat_g` is \\(G\\).
    /// * `vec_h` is \\(h\\).
    /// * `mat_a` is \\(A\\).
    /// * `vec_b` is \\(b\\).
    pub fn new(
        sym_p: MatBuild<L>, vec_q: MatBuild<L>,
        mat_g: MatBuild<L>, vec_h: MatBuild<L>,
        mat_a: MatBuild<L>, vec_b: MatBuild<L>) -> Self
    {
        let n = vec_q.size().0;
        let m = vec_h.size().0;
        let p = vec_b.size().0;

        assert!(sym_p.is_sympack());
        assert_eq!(sym_p.size(), (n, n));
        assert_eq!(vec_q.size(), (n, 1));
        assert_eq!(mat_g.size(), (m, n));
        assert_eq!(vec_h.size(), (m, 1));
        assert_eq!(mat_a.size(), (p, n));
        assert_eq!(vec_b.size(), (p, 1));

        ProbQP {
            sym_p,
            vec_q,
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

    /// Loads the constraints into `simplex` with the cost \\(q\\).
    ///
    /// Returns the objective to be passed to [`Simplex::primal_quadratic`] or [`Simplex::primal_slp`],
    /// or `Err` with [`SolverError::InvalidOp`] for inconsistent data.
    pub fn problem(&self, simplex: &mut Simplex<L>) -> Result<QuadraticObjective<L>, SolverError>
    {
        let (mat, row_lower, row_upper) = stacked_rows(&self.mat_g, &self.vec_h, &self.mat_a, &self.vec_b)?;

        simplex.load_problem(mat, &self.col_lower, &self.col_upper, self.vec_q.as_ref(), &row_lower, &row_upper)?;

        QuadraticObjective::new(self.vec_q.as_ref(), self.sym_p.to_packed())
    }
}
