use alloc::vec;
use alloc::vec::Vec;
use num_traits::Float;

//

/// Indexed working vector
///
/// Dense storage of values together with a list of the positions that may be nonzero.
/// Used as scratch for pivot columns, pivot rows and price vectors;
/// it is cleared between uses and never shrinks.
#[derive(Debug, Clone)]
pub struct IndexedVector<F: Float>
{
    elements: Vec<F>,
    indices: Vec<usize>,
    marked: Vec<bool>,
}

impl<F: Float> IndexedVector<F>
{
    /// Creates an instance.
    ///
    /// Returns an empty [`IndexedVector`] of capacity `len`.
    pub fn new(len: usize) -> Self
    {
        IndexedVector {
            elements: vec![F::zero(); len],
            indices: Vec::with_capacity(len),
            marked: vec![false; len],
        }
    }

    /// Capacity (dense length).
    pub fn capacity(&self) -> usize
    {
        self.elements.len()
    }

    /// Number of indexed positions.
    pub fn num_elements(&self) -> usize
    {
        self.indices.len()
    }

    /// Indexed positions in insertion order.
    pub fn indices(&self) -> &[usize]
    {
        &self.indices
    }

    /// Dense values.
    pub fn dense(&self) -> &[F]
    {
        &self.elements
    }

    /// Value at `i`.
    pub fn get(&self, i: usize) -> F
    {
        self.elements[i]
    }

    /// Zeroes indexed positions only.
    pub fn clear(&mut self)
    {
        for &i in self.indices.iter() {
            self.elements[i] = F::zero();
            self.marked[i] = false;
        }
        self.indices.clear();
    }

    /// Sets the value at `i`, indexing it if it was not.
    pub fn insert(&mut self, i: usize, value: F)
    {
        if !self.marked[i] {
            self.marked[i] = true;
            self.indices.push(i);
        }
        self.elements[i] = value;
    }

    /// Adds `value` to the element at `i`, indexing it if it was not.
    pub fn quick_add(&mut self, i: usize, value: F)
    {
        if !self.marked[i] {
            self.marked[i] = true;
            self.indices.push(i);
        }
        self.elements[i] = self.elements[i] + value;
    }

    /// Replaces the content with a dense array and rebuilds the index list.
    ///
    /// * `values` shall have the same length as the capacity.
    /// * Elements with absolute value not greater than `tolerance` are stored as zero.
    pub fn set_dense(&mut self, values: &[F], tolerance: F)
    {
        assert_eq!(values.len(), self.elements.len());

        self.clear();
        for (i, v) in values.iter().enumerate() {
            if v.abs() > tolerance {
                self.insert(i, *v);
            }
        }
    }

    /// Gives mutable dense access; the caller shall call [`IndexedVector::reindex`] afterwards.
    pub fn dense_mut(&mut self) -> &mut [F]
    {
        &mut self.elements
    }

    /// Rebuilds the index list from the dense values, zeroing tiny ones.
    pub fn reindex(&mut self, tolerance: F)
    {
        for &i in self.indices.iter() {
            self.marked[i] = false;
        }
        self.indices.clear();

        for (i, v) in self.elements.iter_mut().enumerate() {
            if v.abs() > tolerance {
                self.marked[i] = true;
                self.indices.push(i);
            }
            else {
                *v = F::zero();
            }
        }
    }

    /// Sorts indexed positions ascending, giving deterministic scans.
    pub fn sort(&mut self)
    {
        self.indices.sort_unstable();
    }

    /// Largest absolute value among indexed positions.
    pub fn inf_norm(&self) -> F
    {
        self.indices.iter().fold(F::zero(), |m, &i| m.max(self.elements[i].abs()))
    }
}

//

#[test]
fn test_indexed_vector1()
{
    let mut v = IndexedVector::<f64>::new(5);
    v.insert(3, 2.);
    v.quick_add(1, 1.);
    v.quick_add(3, -1.);
    assert_eq!(v.num_elements(), 2);
    assert_eq!(v.get(3), 1.);
    assert_eq!(v.inf_norm(), 1.);

    v.clear();
    assert_eq!(v.num_elements(), 0);
    assert_eq!(v.dense(), &[0.; 5]);

    v.dense_mut()[4] = 1e-20;
    v.dense_mut()[0] = -3.;
    v.reindex(1e-12);
    v.sort();
    assert_eq!(v.indices(), &[0]);
    assert_eq!(v.get(4), 0.);
}
