//! Basis factorization

use alloc::vec;
use alloc::vec::Vec;
use num_traits::Float;
use crate::IndexedVector;

//

/// Dependent basis column found by [`Factorization::factorize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Singularity
{
    /// Basis position of the dependent column.
    pub position: usize,
    /// A row left without pivot; its logical can replace the column.
    pub row: usize,
}

#[derive(Debug, Clone)]
struct Eta<F>
{
    position: usize,
    pivot: F,
    others: Vec<(usize, F)>,
}

/// Basis factorization
///
/// Dense LU factorization with partial pivoting \\(PB = LU\\) of the basis matrix,
/// followed by a file of product-form (eta) updates, one per basis change.
/// The file is bounded; [`Factorization::needs_refactor`] tells when to start over.
#[derive(Debug, Clone)]
pub struct Factorization<F: Float>
{
    m: usize,
    lu: Vec<F>,
    perm: Vec<usize>,
    etas: Vec<Eta<F>>,
    pivot_tolerance: F,
    max_updates: usize,
    unstable: bool,
}

impl<F: Float> Factorization<F>
{
    /// Creates an instance for `m` rows.
    ///
    /// * `pivot_tolerance` is the smallest acceptable absolute pivot.
    /// * `max_updates` is the length of the eta file before a refactorization is due.
    pub fn new(m: usize, pivot_tolerance: F, max_updates: usize) -> Self
    {
        Factorization {
            m,
            lu: vec![F::zero(); m * m],
            perm: (0.. m).collect(),
            etas: Vec::new(),
            pivot_tolerance,
            max_updates: max_updates.max(1),
            unstable: false,
        }
    }

    /// Number of updates since the last factorization.
    pub fn num_updates(&self) -> usize
    {
        self.etas.len()
    }

    /// Whether a refactorization is due.
    pub fn needs_refactor(&self) -> bool
    {
        self.unstable || self.etas.len() >= self.max_updates
    }

    /// Factorizes a basis.
    ///
    /// * `basis` is the `m` by `m` basis matrix in column-major, columns in basis position order.
    ///
    /// Returns `Err` with the first dependent column.
    pub fn factorize(&mut self, basis: &[F]) -> Result<(), Singularity>
    {
        let m = self.m;
        assert_eq!(basis.len(), m * m);

        // row-major working copy
        for r in 0.. m {
            for c in 0.. m {
                self.lu[r * m + c] = basis[c * m + r];
            }
        }
        for (k, p) in self.perm.iter_mut().enumerate() {
            *p = k;
        }
        self.etas.clear();
        self.unstable = false;

        for k in 0.. m {
            let mut p = k;
            let mut max = self.lu[k * m + k].abs();
            for i in k + 1.. m {
                let v = self.lu[i * m + k].abs();
                if v > max {
                    max = v;
                    p = i;
                }
            }

            if max < self.pivot_tolerance {
                return Err(Singularity {position: k, row: self.perm[k]});
            }

            if p != k {
                for c in 0.. m {
                    self.lu.swap(k * m + c, p * m + c);
                }
                self.perm.swap(k, p);
            }

            let pivot = self.lu[k * m + k];
            for i in k + 1.. m {
                let l = self.lu[i * m + k] / pivot;
                if l != F::zero() {
                    self.lu[i * m + k] = l;
                    for c in k + 1.. m {
                        let u = self.lu[k * m + c];
                        self.lu[i * m + c] = self.lu[i * m + c] - l * u;
                    }
                }
                else {
                    self.lu[i * m + k] = F::zero();
                }
            }
        }

        Ok(())
    }

    /// Solves \\(B x = v\\).
    ///
    /// * `v` is indexed by row before entry, and \\(x\\) indexed by basis position on exit.
    pub fn ftran(&self, v: &mut [F])
    {
        let m = self.m;
        assert_eq!(v.len(), m);

        let mut w: Vec<F> = self.perm.iter().map(|&r| v[r]).collect();

        for i in 0.. m {
            let mut s = w[i];
            for j in 0.. i {
                s = s - self.lu[i * m + j] * w[j];
            }
            w[i] = s;
        }
        for i in (0.. m).rev() {
            let mut s = w[i];
            for j in i + 1.. m {
                s = s - self.lu[i * m + j] * w[j];
            }
            w[i] = s / self.lu[i * m + i];
        }

        for eta in self.etas.iter() {
            let xr = w[eta.position] / eta.pivot;
            w[eta.position] = xr;
            if xr != F::zero() {
                for &(i, a) in eta.others.iter() {
                    w[i] = w[i] - a * xr;
                }
            }
        }

        v.copy_from_slice(&w);
    }

    /// Solves \\(B^T y = v\\).
    ///
    /// * `v` is indexed by basis position before entry, and \\(y\\) indexed by row on exit.
    pub fn btran(&self, v: &mut [F])
    {
        let m = self.m;
        assert_eq!(v.len(), m);

        for eta in self.etas.iter().rev() {
            let mut s = v[eta.position];
            for &(i, a) in eta.others.iter() {
                s = s - a * v[i];
            }
            v[eta.position] = s / eta.pivot;
        }

        let mut z = vec![F::zero(); m];
        for i in 0.. m {
            let mut s = v[i];
            for j in 0.. i {
                s = s - self.lu[j * m + i] * z[j];
            }
            z[i] = s / self.lu[i * m + i];
        }
        for i in (0.. m).rev() {
            let mut s = z[i];
            for j in i + 1.. m {
                s = s - self.lu[j * m + i] * z[j];
            }
            z[i] = s;
        }

        for (k, &r) in self.perm.iter().enumerate() {
            v[r] = z[k];
        }
    }

    /// Records the replacement of the column at basis position `position`.
    ///
    /// * `alpha` is the entering column after [`Factorization::ftran`].
    ///
    /// Returns `false` if the pivot is too small to be trusted;
    /// the update is then not recorded and a refactorization is due.
    pub fn replace_column(&mut self, position: usize, alpha: &IndexedVector<F>) -> bool
    {
        let pivot = alpha.get(position);
        if pivot.abs() < self.pivot_tolerance {
            self.unstable = true;
            return false;
        }

        let others = alpha.indices().iter()
            .filter(|&&i| i != position && alpha.get(i) != F::zero())
            .map(|&i| (i, alpha.get(i)))
            .collect();

        self.etas.push(Eta {position, pivot, others});
        true
    }
}

//

#[test]
fn test_factorization1()
{
    use float_eq::assert_float_eq;

    // column-major
    let b = [
        0., 2., 1.,
        1., 0., 0.,
        3., 1., 4.,
    ];
    let mut f = Factorization::<f64>::new(3, 1e-11, 10);
    f.factorize(&b).unwrap();

    // B * x where x = [1, 2, 3]
    let mut v = [0. + 2. + 9., 2. + 0. + 3., 1. + 0. + 12.];
    f.ftran(&mut v);
    assert_float_eq!(v.as_ref(), [1., 2., 3.].as_ref(), abs_all <= 1e-10);

    // B^T * y where y = [1, -1, 2]
    let mut u = [0. - 2. + 2., 1. + 0. + 0., 3. - 1. + 8.];
    f.btran(&mut u);
    assert_float_eq!(u.as_ref(), [1., -1., 2.].as_ref(), abs_all <= 1e-10);
}

#[test]
fn test_factorization2()
{
    use float_eq::assert_float_eq;

    let b = [
        1., 0.,
        0., 1.,
    ];
    let mut f = Factorization::<f64>::new(2, 1e-11, 10);
    f.factorize(&b).unwrap();

    // replace position 0 with column [2, 1]
    let mut a = [2., 1.];
    f.ftran(&mut a);
    let mut alpha = IndexedVector::new(2);
    alpha.set_dense(&a, 0.);
    assert!(f.replace_column(0, &alpha));
    assert_eq!(f.num_updates(), 1);

    // new B = [[2, 0], [1, 1]]; B * [1, 3] = [2, 4]
    let mut v = [2., 4.];
    f.ftran(&mut v);
    assert_float_eq!(v.as_ref(), [1., 3.].as_ref(), abs_all <= 1e-12);

    // B^T * [1, 3] = [5, 3]
    let mut u = [5., 3.];
    f.btran(&mut u);
    assert_float_eq!(u.as_ref(), [1., 3.].as_ref(), abs_all <= 1e-12);

    let singular = [
        1., 2.,
        2., 4.,
    ];
    assert_eq!(f.factorize(&singular).unwrap_err().position, 1);
}
