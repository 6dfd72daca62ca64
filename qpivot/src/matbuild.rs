use std::ops::{Index, IndexMut, Deref};
use num_traits::Zero;
use qpivot_core::solver::LinAlg;
use qpivot_core::{MatType, PackedMatrix};

//

/// Matrix builder
///
/// Matrix struct which owns a `Vec` of dense data array and is able to be converted into [`qpivot_core::PackedMatrix`].
/// This struct relies on dynamic heap allocation.
#[derive(Debug, Clone)]
pub struct MatBuild<L: LinAlg>
{
    typ: MatType,
    array: Vec<L::F>,
}

impl<L: LinAlg> MatBuild<L>
{
    /// Creates an instance.
    ///
    /// Returns the [`MatBuild`] instance with zero data.
    /// * `typ` is Matrix type and size.
    pub fn new(typ: MatType) -> Self
    {
        MatBuild {
            typ,
            array: vec![L::F::zero(); typ.len()],
        }
    }

    /// Size of the matrix.
    ///
    /// Returns a tuple of a number of rows and columns.
    pub fn size(&self) -> (usize, usize)
    {
        self.typ.size()
    }

    /// Converted into [`qpivot_core::PackedMatrix`] holding nonzero elements.
    pub fn to_packed(&self) -> PackedMatrix<L::F>
    {
        PackedMatrix::from_dense(self.typ, &self.array)
    }

    /// Checks if symmetric packed.
    ///
    /// Returns `true` if [`MatType::SymPack`], `false` otherwise.
    pub fn is_sympack(&self) -> bool
    {
        matches!(self.typ, MatType::SymPack(_))
    }

    /// Data by an iterator in column-major.
    ///
    /// * `iter` iterates matrix data in column-major.
    ///   For [`MatType::SymPack`] it iterates only the upper triangle,
    ///   that is the packed array \\(P_{00}, P_{01}, P_{11}, P_{02}, \\ldots\\).
    pub fn set_iter_colmaj<T, I>(&mut self, iter: T)
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        let mut i = iter.into_iter();
        let (nr, nc) = self.typ.size();

        for c in 0.. nc {
            let nr_c = if self.is_sympack() {c + 1} else {nr};
            for r in 0.. nr_c {
                if let Some(v) = i.next() {
                    self[(r, c)] = *v;
                }
                else {
                    return;
                }
            }
        }
    }
    /// Builder pattern of [`MatBuild::set_iter_colmaj`].
    pub fn iter_colmaj<T, I>(mut self, iter: T) -> Self
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        self.set_iter_colmaj(iter);
        self
    }

    /// Data by an iterator in row-major.
    ///
    /// * `iter` iterates matrix data in row-major.
    ///   For [`MatType::SymPack`] it iterates only the lower triangle,
    ///   which is the same order as [`MatBuild::set_iter_colmaj`].
    pub fn set_iter_rowmaj<T, I>(&mut self, iter: T)
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        let mut i = iter.into_iter();
        let (nr, nc) = self.typ.size();

        for r in 0.. nr {
            let nc_r = if self.is_sympack() {r + 1} else {nc};
            for c in 0.. nc_r {
                if let Some(v) = i.next() {
                    self[(r, c)] = *v;
                }
                else {
                    return;
                }
            }
        }
    }
    /// Builder pattern of [`MatBuild::set_iter_rowmaj`].
    pub fn iter_rowmaj<T, I>(mut self, iter: T) -> Self
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        self.set_iter_rowmaj(iter);
        self
    }

    /// Scales by \\(\alpha\\).
    ///
    /// * `alpha` is a scalar \\(\alpha\\).
    pub fn set_scale(&mut self, alpha: L::F)
    {
        L::scale(alpha, &mut self.array);
    }
    /// Builder pattern of [`MatBuild::set_scale`].
    pub fn scale(mut self, alpha: L::F) -> Self
    {
        self.set_scale(alpha);
        self
    }

    /// Reshapes the internal data array as it is into a one-column matrix.
    pub fn set_reshape_colvec(&mut self)
    {
        let sz = self.array.len();
        self.typ = MatType::General(sz, 1);
    }
    /// Builder pattern of [`MatBuild::set_reshape_colvec`].
    pub fn reshape_colvec(mut self) -> Self
    {
        self.set_reshape_colvec();
        self
    }

    fn index(&self, (r, c): (usize, usize)) -> usize
    {
        let i = match self.typ {
            MatType::General(nr, nc) => {
                assert!(r < nr);
                assert!(c < nc);
                c * nr + r
            },
            MatType::SymPack(n) => {
                assert!(r < n);
                assert!(c < n);
                let (r, c) = if r <= c {
                    (r, c)
                }
                else {
                    (c, r)
                };
                c * (c + 1) / 2 + r
            },
        };

        assert!(i < self.array.len());
        i
    }
}

//

impl<L: LinAlg> Index<(usize, usize)> for MatBuild<L>
{
    type Output = L::F;
    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        let i = self.index(index);

        &self.array[i]
    }
}

impl<L: LinAlg> IndexMut<(usize, usize)> for MatBuild<L>
{
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output
    {
        let i = self.index(index);

        &mut self.array[i]
    }
}

//

impl<L: LinAlg> AsRef<[L::F]> for MatBuild<L>
{
    fn as_ref(&self) -> &[L::F]
    {
        &self.array
    }
}

//

#[test]
fn test_matbuild1()
{
    use qpivot_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let array = &[ // upper triangle, column by column
        1.,
        2.,  3.,
        0.,  5.,  6.,
    ];

    let m = MatBuild::<L>::new(MatType::SymPack(3))
            .iter_colmaj(array)
            .scale(2.);
    assert_eq!(m[(1, 0)], 4.);
    assert_eq!(m[(0, 1)], 4.);
    assert_eq!(m[(2, 2)], 12.);

    let p = m.to_packed();
    assert_eq!(p.size(), (3, 3));
    // zeros of (0, 2) and (2, 0) dropped
    assert_eq!(p.num_elements(), 7);
    assert_eq!(p.get(2, 1), 10.);
    assert_eq!(p.get(1, 2), 10.);

    let v = MatBuild::<L>::new(MatType::General(2, 2)).iter_rowmaj(&[1., 2., 3., 4.]);
    assert_eq!(v.as_ref(), &[1., 3., 2., 4.]);
    assert_eq!(v.reshape_colvec().size(), (4, 1));
}

#[test]
fn test_matbuild2()
{
    use qpivot_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    // diag(2, 2) as a packed triangle
    let m = MatBuild::<L>::new(MatType::SymPack(2)).iter_colmaj(&[2., 0., 2.]);
    assert_eq!(m[(0, 0)], 2.);
    assert_eq!(m[(0, 1)], 0.);
    assert_eq!(m[(1, 0)], 0.);
    assert_eq!(m[(1, 1)], 2.);
    assert_eq!(m.to_packed().num_elements(), 2);

    // lower triangle row by row is the same array
    let r = MatBuild::<L>::new(MatType::SymPack(2)).iter_rowmaj(&[2., 0., 2.]);
    assert_eq!(r.as_ref(), m.as_ref());

    // a short iterator leaves the rest zero
    let s = MatBuild::<L>::new(MatType::SymPack(2)).iter_colmaj(&[1.]);
    assert_eq!(s.as_ref(), &[1., 0., 0.]);

    let g = MatBuild::<L>::new(MatType::General(2, 3)).iter_rowmaj(&[1., 2., 3., 4., 5., 6.]);
    assert_eq!(g[(0, 2)], 3.);
    assert_eq!(g[(1, 0)], 4.);
}
