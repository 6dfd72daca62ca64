use alloc::vec;
use alloc::vec::Vec;
use num_traits::Float;

//

/// Matrix type and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatType
{
    /// General matrix with a number of rows and a number of columns.
    General(usize, usize),
    /// Symmetric matrix, supplied in packed form, with a number of rows and columns.
    SymPack(usize),
}

impl MatType
{
    /// Length of array to store a [`MatType`] matrix.
    ///
    /// Returns the length.
    pub fn len(&self) -> usize
    {
        match self {
            MatType::General(n_row, n_col) => n_row * n_col,
            MatType::SymPack(n) => n * (n + 1) / 2,
        }
    }

    /// Size of a [`MatType`] matrix.
    ///
    /// Returns a tuple of a number of rows and a number of columns.
    pub fn size(&self) -> (usize, usize)
    {
        match self {
            MatType::General(n_row, n_col) => (*n_row, *n_col),
            MatType::SymPack(n) => (*n, *n),
        }
    }
}

//

/// Packed matrix
///
/// Column-major sparse matrix holding only the nonzero elements.
/// Columns are the unit of access for the simplex engine,
/// so a column is a contiguous run of `(row, value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedMatrix<F: Float>
{
    n_row: usize,
    n_col: usize,
    starts: Vec<usize>,
    indices: Vec<usize>,
    elements: Vec<F>,
}

impl<F: Float> PackedMatrix<F>
{
    /// Creates an empty (all zero) matrix.
    pub fn new(n_row: usize, n_col: usize) -> Self
    {
        PackedMatrix {
            n_row,
            n_col,
            starts: vec![0; n_col + 1],
            indices: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Creates a matrix from `(row, column, value)` triplets.
    ///
    /// Duplicated positions are summed and zero results are dropped.
    /// Returns `None` if a position is out of range.
    pub fn from_triplets(n_row: usize, n_col: usize, triplets: &[(usize, usize, F)]) -> Option<Self>
    {
        let mut counts = vec![0; n_col + 1];
        for &(r, c, _) in triplets {
            if r >= n_row || c >= n_col {
                return None;
            }
            counts[c + 1] += 1;
        }
        for c in 0.. n_col {
            counts[c + 1] += counts[c];
        }

        let mut slot = counts.clone();
        let mut rows = vec![0; triplets.len()];
        let mut vals = vec![F::zero(); triplets.len()];
        for &(r, c, v) in triplets {
            rows[slot[c]] = r;
            vals[slot[c]] = v;
            slot[c] += 1;
        }

        let mut mat = PackedMatrix::new(n_row, n_col);
        let mut dense = vec![F::zero(); n_row];
        let mut touched = vec![false; n_row];
        let mut order = Vec::new();
        for c in 0.. n_col {
            order.clear();
            for k in counts[c].. counts[c + 1] {
                let r = rows[k];
                if !touched[r] {
                    touched[r] = true;
                    order.push(r);
                }
                dense[r] = dense[r] + vals[k];
            }
            order.sort_unstable();
            for &r in order.iter() {
                if dense[r] != F::zero() {
                    mat.indices.push(r);
                    mat.elements.push(dense[r]);
                }
                dense[r] = F::zero();
                touched[r] = false;
            }
            mat.starts[c + 1] = mat.indices.len();
        }

        Some(mat)
    }

    /// Creates a matrix from a dense array.
    ///
    /// * `typ` is the layout of `array`:
    ///   column-major if [`MatType::General`],
    ///   the upper-triangular part in column-wise if [`MatType::SymPack`],
    ///   in which case both triangles are stored.
    /// * `array` shall have the length `typ.len()`.
    pub fn from_dense(typ: MatType, array: &[F]) -> Self
    {
        assert_eq!(typ.len(), array.len());

        let (n_row, n_col) = typ.size();
        let mut triplets = Vec::new();

        match typ {
            MatType::General(nr, nc) => {
                for c in 0.. nc {
                    for r in 0.. nr {
                        let v = array[c * nr + r];
                        if v != F::zero() {
                            triplets.push((r, c, v));
                        }
                    }
                }
            },
            MatType::SymPack(n) => {
                for c in 0.. n {
                    for r in 0..= c {
                        let v = array[c * (c + 1) / 2 + r];
                        if v != F::zero() {
                            triplets.push((r, c, v));
                            if r != c {
                                triplets.push((c, r, v));
                            }
                        }
                    }
                }
            },
        }

        // positions are in range by construction
        PackedMatrix::from_triplets(n_row, n_col, &triplets).unwrap_or_else(|| PackedMatrix::new(n_row, n_col))
    }

    /// Size of the matrix.
    ///
    /// Returns a tuple of a number of rows and columns.
    pub fn size(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    /// Number of stored elements.
    pub fn num_elements(&self) -> usize
    {
        self.elements.len()
    }

    /// Row indices and values of column `c`.
    pub fn col(&self, c: usize) -> (&[usize], &[F])
    {
        let (s, e) = (self.starts[c], self.starts[c + 1]);
        (&self.indices[s.. e], &self.elements[s.. e])
    }

    /// Element at `(r, c)`, zero if not stored.
    pub fn get(&self, r: usize, c: usize) -> F
    {
        let (rows, vals) = self.col(c);
        match rows.binary_search(&r) {
            Ok(k) => vals[k],
            Err(_) => F::zero(),
        }
    }

    /// Calculate \\(\alpha A x + \beta y\\).
    pub fn times(&self, alpha: F, x: &[F], beta: F, y: &mut [F])
    {
        assert_eq!(x.len(), self.n_col);
        assert_eq!(y.len(), self.n_row);

        for v in y.iter_mut() {
            *v = beta * *v;
        }
        for c in 0.. self.n_col {
            let xc = alpha * x[c];
            if xc != F::zero() {
                let (rows, vals) = self.col(c);
                for (r, a) in rows.iter().zip(vals) {
                    y[*r] = y[*r] + *a * xc;
                }
            }
        }
    }

    /// Calculate \\(\alpha A^T x + \beta y\\).
    pub fn trans_times(&self, alpha: F, x: &[F], beta: F, y: &mut [F])
    {
        assert_eq!(x.len(), self.n_row);
        assert_eq!(y.len(), self.n_col);

        for c in 0.. self.n_col {
            let (rows, vals) = self.col(c);
            let mut sum = F::zero();
            for (r, a) in rows.iter().zip(vals) {
                sum = sum + *a * x[*r];
            }
            y[c] = alpha * sum + beta * y[c];
        }
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self
    {
        let mut triplets = Vec::with_capacity(self.num_elements());
        for c in 0.. self.n_col {
            let (rows, vals) = self.col(c);
            for (r, v) in rows.iter().zip(vals) {
                triplets.push((c, *r, *v));
            }
        }
        PackedMatrix::from_triplets(self.n_col, self.n_row, &triplets).unwrap_or_else(|| PackedMatrix::new(self.n_col, self.n_row))
    }
}

//

#[test]
fn test_packed_matrix1()
{
    use float_eq::assert_float_eq;

    let array = &[ // column-major, upper-triangle (seen as if transposed)
        1.,
        2.,  0.,
        0.,  5.,  6.,
    ];
    let m = PackedMatrix::<f64>::from_dense(MatType::SymPack(3), array);
    assert_eq!(m.num_elements(), 6);
    assert_eq!(m.get(1, 0), 2.);
    assert_eq!(m.get(0, 1), 2.);
    assert_eq!(m.get(1, 1), 0.);

    let x = [1., 1., 1.];
    let mut y = [0.; 3];
    m.times(1., &x, 0., &mut y);
    assert_float_eq!(y.as_ref(), [3., 7., 11.].as_ref(), abs_all <= 1e-12);

    let t = PackedMatrix::from_triplets(2, 3, &[(0, 2, 1.), (1, 0, 4.), (0, 2, 2.)]).unwrap();
    let mut z = [0.; 3];
    t.trans_times(1., &[1., 1.], 0., &mut z);
    assert_float_eq!(z.as_ref(), [4., 0., 3.].as_ref(), abs_all <= 1e-12);
    assert_eq!(t.transpose().get(2, 0), 3.);
}
