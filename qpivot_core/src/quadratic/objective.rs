use alloc::vec::Vec;
use num_traits::{Zero, One};
use core::marker::PhantomData;
use crate::solver::{LinAlg, SolverError};
use crate::{PackedMatrix, MatType};

//

/// Quadratic objective
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\(c^T x + \\frac12 x^T Q x\\) with a symmetric \\(Q\\), stored with both triangles.
#[derive(Debug, Clone)]
pub struct QuadraticObjective<L: LinAlg>
{
    linear: Vec<L::F>,
    quadratic: PackedMatrix<L::F>,
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> QuadraticObjective<L>
{
    /// Creates an instance.
    ///
    /// Returns [`QuadraticObjective`], or `Err` with [`SolverError::InvalidOp`] when sizes disagree.
    /// * `linear` is \\(c\\).
    /// * `quadratic` is \\(Q\\), a square matrix of the same size as \\(c\\).
    pub fn new(linear: &[L::F], quadratic: PackedMatrix<L::F>) -> Result<Self, SolverError>
    {
        let n = linear.len();

        if quadratic.size() != (n, n) {
            log::error!("Size mismatch: linear {}, quadratic {:?}", n, quadratic.size());
            return Err(SolverError::InvalidOp);
        }

        Ok(QuadraticObjective {
            linear: linear.to_vec(),
            quadratic,
            ph_l: PhantomData,
        })
    }

    /// Creates an instance from the upper triangle of \\(Q\\) packed column-wise.
    pub fn from_sym_pack(linear: &[L::F], sym_pack: &[L::F]) -> Result<Self, SolverError>
    {
        let typ = MatType::SymPack(linear.len());

        if typ.len() != sym_pack.len() {
            log::error!("Size mismatch: linear {}, packed {}", linear.len(), sym_pack.len());
            return Err(SolverError::InvalidOp);
        }

        QuadraticObjective::new(linear, PackedMatrix::from_dense(typ, sym_pack))
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize
    {
        self.linear.len()
    }

    /// Linear term \\(c\\).
    pub fn linear(&self) -> &[L::F]
    {
        &self.linear
    }

    /// Quadratic term \\(Q\\).
    pub fn quadratic(&self) -> &PackedMatrix<L::F>
    {
        &self.quadratic
    }

    /// Whether \\(Q\\) has a nonzero element.
    pub fn has_quadratic(&self) -> bool
    {
        self.quadratic.num_elements() > 0
    }

    /// Calculate \\(Qx\\) into `g`.
    pub fn gradient(&self, x: &[L::F], g: &mut [L::F])
    {
        self.quadratic.times(L::F::one(), x, L::F::zero(), g);
    }

    /// Calculate \\(d^T Q d\\).
    pub fn curvature(&self, d: &[L::F]) -> L::F
    {
        let mut s = L::F::zero();
        for c in 0.. self.num_cols() {
            if d[c] != L::F::zero() {
                let (rows, vals) = self.quadratic.col(c);
                for (r, q) in rows.iter().zip(vals) {
                    s = s + d[*r] * *q * d[c];
                }
            }
        }
        s
    }

    /// Objective value \\(c^T x + \\frac12 x^T Q x\\).
    pub fn value(&self, x: &[L::F]) -> L::F
    {
        let f2 = L::F::one() + L::F::one();

        L::inner_prod(&self.linear, x) + self.curvature(x) / f2
    }
}

//

#[test]
fn test_objective1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    // x0^2 + x0 x1 + 3 x1^2 - x1
    let obj = QuadraticObjective::<L>::from_sym_pack(&[0., -1.], &[
        2.,
        1., 6.,
    ]).unwrap();
    assert!(obj.has_quadratic());

    let x = [1., 2.];
    let mut g = [0.; 2];
    obj.gradient(&x, &mut g);
    assert_float_eq!(g.as_ref(), [4., 13.].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(obj.value(&x), 1. + 2. + 12. - 2., abs <= 1e-12);

    assert!(QuadraticObjective::<L>::from_sym_pack(&[0.], &[1., 2.]).is_err());
}
