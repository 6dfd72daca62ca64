//! Bounded-variable simplex engine

use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, Zero, One};
use core::marker::PhantomData;
use crate::solver::{LinAlg, SolverError};
use crate::{IndexedVector, PackedMatrix, Factorization};

//

/// Simplex parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexParam<F: Float>
{
    /// Max number of pivots of one solve. `None` means no upper limit.
    pub max_iter: Option<usize>,
    /// Tolerance of bound violations.
    pub primal_tolerance: F,
    /// Tolerance of reduced costs regarded as attractive.
    pub dual_tolerance: F,
    /// Smallest acceptable absolute pivot element.
    pub pivot_tolerance: F,
    /// Tolerance of small positive value regarded as zero.
    pub zero_tolerance: F,
    /// Number of basis updates between refactorizations.
    pub refactor_freq: usize,
    /// Weight of bound violations in the phase costs of the enlarged quadratic model.
    pub infeasibility_cost: F,
    /// Max number of consecutive rollbacks without progress.
    pub max_rollbacks: usize,
    /// Period of iterations to output progress log(for debug/trace level).
    pub log_period: usize,
}

impl<F: Float> Default for SimplexParam<F>
{
    fn default() -> Self
    {
        let ten = F::from(10).unwrap();

        SimplexParam {
            max_iter: Some(50_000),
            primal_tolerance: ten.powi(-7),
            dual_tolerance: ten.powi(-7),
            pivot_tolerance: ten.powi(-9),
            zero_tolerance: ten.powi(-12),
            refactor_freq: 50,
            infeasibility_cost: F::one(),
            max_rollbacks: 20,
            log_period: 1_000,
        }
    }
}

//

/// Basis status of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status
{
    /// In the basis.
    Basic,
    /// Nonbasic at its lower bound.
    AtLower,
    /// Nonbasic at its upper bound.
    AtUpper,
    /// Nonbasic without bounds, usually at zero.
    IsFree,
}

/// Result of a ratio test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<F>
{
    /// Basis position of the leaving variable, `None` for a bound flip of the entering one.
    pub row: Option<usize>,
    /// Step length, nonnegative.
    pub theta: F,
    /// Whether the leaving (or flipping) variable ends at its upper bound.
    pub to_upper: bool,
}

//

/// Simplex model and engine
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Holds a linear program
/// \\[
/// \\begin{array}{ll}
/// {\\rm minimize} & c^T x \\\\
/// {\\rm subject \\ to} & r = A x \\\\
/// & l_r \\preceq r \\preceq u_r \\\\
/// & l_x \\preceq x \\preceq u_x
/// \\end{array}
/// \\]
/// together with its basis, and solves it by [`Simplex::primal`].
///
/// Variables are numbered by *sequence*: the structural columns \\(x\\) come first,
/// then one logical \\(r_i\\) per row, whose column in \\(Ax - r = 0\\) is \\(-e_i\\).
/// Infinite bounds are expressed by `F::infinity()` and `F::neg_infinity()`.
pub struct Simplex<L: LinAlg>
{
    /// simplex parameters.
    pub par: SimplexParam<L::F>,

    pub(crate) n_col: usize,
    pub(crate) n_row: usize,
    pub(crate) matrix: PackedMatrix<L::F>,
    pub(crate) cost: Vec<L::F>,
    pub(crate) lower: Vec<L::F>,
    pub(crate) upper: Vec<L::F>,
    pub(crate) solution: Vec<L::F>,
    pub(crate) status: Vec<Status>,
    pub(crate) pivot_variable: Vec<usize>,
    pub(crate) factorization: Factorization<L::F>,
    pub(crate) dual: Vec<L::F>,
    pub(crate) dj: Vec<L::F>,
    pub(crate) objective_value: L::F,
    pub(crate) num_iterations: usize,
    pub(crate) finished: bool,

    ph_l: PhantomData<L>,
}

impl<L: LinAlg> Simplex<L>
{
    /// Creates an instance.
    ///
    /// Returns an empty [`Simplex`] model.
    pub fn new() -> Self
    {
        let par = SimplexParam::default();
        let factorization = Factorization::new(0, par.pivot_tolerance, par.refactor_freq);

        Simplex {
            par,
            n_col: 0,
            n_row: 0,
            matrix: PackedMatrix::new(0, 0),
            cost: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
            solution: Vec::new(),
            status: Vec::new(),
            pivot_variable: Vec::new(),
            factorization,
            dual: Vec::new(),
            dj: Vec::new(),
            objective_value: L::F::zero(),
            num_iterations: 0,
            finished: false,
            ph_l: PhantomData,
        }
    }

    /// Changes simplex parameters.
    ///
    /// Returns [`Simplex`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SimplexParam<L::F>)
    {
        f(&mut self.par);
        self
    }

    /// Loads a linear program and sets up the all-logical basis.
    ///
    /// * `matrix` is \\(A\\), `n_row` by `n_col`.
    /// * `col_lower`, `col_upper` and `cost` have length `n_col`.
    /// * `row_lower` and `row_upper` have length `n_row`.
    pub fn load_problem(&mut self,
        matrix: PackedMatrix<L::F>,
        col_lower: &[L::F], col_upper: &[L::F], cost: &[L::F],
        row_lower: &[L::F], row_upper: &[L::F]) -> Result<(), SolverError>
    {
        let (m, n) = matrix.size();

        if col_lower.len() != n || col_upper.len() != n || cost.len() != n
            || row_lower.len() != m || row_upper.len() != m {
            log::error!("Size mismatch: matrix{:?}, col {} {} {}, row {} {}",
                (m, n), col_lower.len(), col_upper.len(), cost.len(), row_lower.len(), row_upper.len());
            return Err(SolverError::InvalidOp);
        }

        let bad_bound = col_lower.iter().zip(col_upper).chain(row_lower.iter().zip(row_upper))
            .position(|(l, u)| l.is_nan() || u.is_nan() || l > u || *l == L::F::infinity() || *u == L::F::neg_infinity());
        if let Some(seq) = bad_bound {
            log::error!("Inconsistent bounds of sequence {}", seq);
            return Err(SolverError::InvalidOp);
        }

        self.n_col = n;
        self.n_row = m;
        self.matrix = matrix;
        self.cost = cost.to_vec();
        self.lower = col_lower.iter().chain(row_lower).copied().collect();
        self.upper = col_upper.iter().chain(row_upper).copied().collect();
        self.solution = vec![L::F::zero(); n + m];
        self.status = vec![Status::Basic; n + m];
        self.pivot_variable = vec![0; m];
        self.factorization = Factorization::new(m, self.par.pivot_tolerance, self.par.refactor_freq);
        self.dual = vec![L::F::zero(); m];
        self.dj = vec![L::F::zero(); n + m];
        self.objective_value = L::F::zero();
        self.num_iterations = 0;
        self.finished = false;

        self.all_slack_basis()
    }

    /// Sets up the all-logical basis, structural columns at a bound.
    pub fn all_slack_basis(&mut self) -> Result<(), SolverError>
    {
        let (n, m) = (self.n_col, self.n_row);

        for j in 0.. n {
            let (st, v) = self.nonbasic_bound(j, L::F::zero());
            self.status[j] = st;
            self.solution[j] = v;
        }
        for i in 0.. m {
            self.status[n + i] = Status::Basic;
            self.pivot_variable[i] = n + i;
        }
        self.finished = false;

        self.factorize()?;
        self.compute_primals();
        Ok(())
    }

    /// Nonbasic status and value of `seq` closest to `value`.
    pub(crate) fn nonbasic_bound(&self, seq: usize, value: L::F) -> (Status, L::F)
    {
        let (lo, up) = (self.lower[seq], self.upper[seq]);

        match (lo.is_finite(), up.is_finite()) {
            (true, true) => {
                if (value - lo).abs() <= (up - value).abs() {
                    (Status::AtLower, lo)
                }
                else {
                    (Status::AtUpper, up)
                }
            },
            (true, false) => (Status::AtLower, lo),
            (false, true) => (Status::AtUpper, up),
            (false, false) => (Status::IsFree, value),
        }
    }

    /// Unpacks the column of `seq` into `array`.
    pub fn unpack(&self, seq: usize, array: &mut IndexedVector<L::F>)
    {
        array.clear();
        if seq < self.n_col {
            let (rows, vals) = self.matrix.col(seq);
            for (r, v) in rows.iter().zip(vals) {
                array.insert(*r, *v);
            }
        }
        else {
            array.insert(seq - self.n_col, -L::F::one());
        }
    }

    /// Factorizes the current basis.
    ///
    /// A dependent basic column is replaced by the logical of a row left without pivot
    /// and made nonbasic at its nearest bound.
    /// Primal values shall be recomputed by [`Simplex::compute_primals`] afterwards.
    pub fn factorize(&mut self) -> Result<(), SolverError>
    {
        let (n, m) = (self.n_col, self.n_row);
        let mut basis = vec![L::F::zero(); m * m];

        for _ in 0..= m {
            for v in basis.iter_mut() {
                *v = L::F::zero();
            }
            for (k, &seq) in self.pivot_variable.iter().enumerate() {
                if seq < n {
                    let (rows, vals) = self.matrix.col(seq);
                    for (r, v) in rows.iter().zip(vals) {
                        basis[k * m + r] = *v;
                    }
                }
                else {
                    basis[k * m + (seq - n)] = -L::F::one();
                }
            }

            match self.factorization.factorize(&basis) {
                Ok(()) => return Ok(()),
                Err(s) => {
                    let row = if self.status[n + s.row] != Status::Basic {
                        Some(s.row)
                    }
                    else {
                        (0.. m).find(|i| self.status[n + i] != Status::Basic)
                    };
                    let row = match row {
                        Some(row) => row,
                        None => break,
                    };

                    let out = self.pivot_variable[s.position];
                    let (st, v) = self.nonbasic_bound(out, self.solution[out]);
                    log::debug!("singular basis: {} replaced by logical of row {}", out, row);
                    self.status[out] = st;
                    self.solution[out] = v;
                    self.status[n + row] = Status::Basic;
                    self.pivot_variable[s.position] = n + row;
                }
            }
        }

        log::warn!("----- Singular");
        Err(SolverError::Singular)
    }

    /// Makes the pivot variables agree with the statuses.
    ///
    /// Basic sequences fill the basis in order, then logicals of remaining rows.
    /// Basic sequences beyond the number of rows move to their nearest bound.
    pub(crate) fn sync_basis(&mut self)
    {
        let (n, m) = (self.n_col, self.n_row);

        let num_basic = self.status.iter().filter(|st| **st == Status::Basic).count();
        if num_basic == m && self.pivot_variable.iter().all(|seq| self.status[*seq] == Status::Basic) {
            return;
        }

        let mut k = 0;
        for seq in 0.. n + m {
            if self.status[seq] == Status::Basic {
                if k < m {
                    self.pivot_variable[k] = seq;
                    k += 1;
                }
                else {
                    let (st, v) = self.nonbasic_bound(seq, self.solution[seq]);
                    self.status[seq] = st;
                    self.solution[seq] = v;
                }
            }
        }
        for i in 0.. m {
            if k >= m {
                break;
            }
            if self.status[n + i] != Status::Basic {
                self.status[n + i] = Status::Basic;
                self.pivot_variable[k] = n + i;
                k += 1;
            }
        }
        log::debug!("basis rebuilt from {} basic statuses", num_basic);
    }

    /// Recomputes basic values from the nonbasic ones.
    pub fn compute_primals(&mut self)
    {
        let n = self.n_col;
        let mut rhs = vec![L::F::zero(); self.n_row];

        // B x_B = -N x_N
        for (seq, st) in self.status.iter().enumerate() {
            if *st != Status::Basic {
                let v = self.solution[seq];
                if v != L::F::zero() {
                    if seq < n {
                        let (rows, vals) = self.matrix.col(seq);
                        for (r, a) in rows.iter().zip(vals) {
                            rhs[*r] = rhs[*r] - *a * v;
                        }
                    }
                    else {
                        rhs[seq - n] = rhs[seq - n] + v;
                    }
                }
            }
        }

        self.factorization.ftran(&mut rhs);
        for (k, &seq) in self.pivot_variable.iter().enumerate() {
            self.solution[seq] = rhs[k];
        }
    }

    /// Computes row duals and reduced costs for a cost vector over all sequences.
    ///
    /// * `cost` has length `n_col + n_row`.
    pub fn compute_duals(&mut self, cost: &[L::F])
    {
        let (n, m) = (self.n_col, self.n_row);
        assert_eq!(cost.len(), n + m);

        for (k, &seq) in self.pivot_variable.iter().enumerate() {
            self.dual[k] = cost[seq];
        }
        self.factorization.btran(&mut self.dual);

        for j in 0.. n {
            let (rows, vals) = self.matrix.col(j);
            let mut s = cost[j];
            for (r, a) in rows.iter().zip(vals) {
                s = s - *a * self.dual[*r];
            }
            self.dj[j] = s;
        }
        for i in 0.. m {
            self.dj[n + i] = cost[n + i] + self.dual[i];
        }
        for &seq in self.pivot_variable.iter() {
            self.dj[seq] = L::F::zero();
        }
    }

    /// Bound violation of `seq`, zero when within tolerance.
    pub(crate) fn infeasibility_of(&self, seq: usize) -> L::F
    {
        let x = self.solution[seq];
        let tol = self.par.primal_tolerance;

        if x < self.lower[seq] - tol {
            self.lower[seq] - x
        }
        else if x > self.upper[seq] + tol {
            x - self.upper[seq]
        }
        else {
            L::F::zero()
        }
    }

    /// Sum and number of bound violations among basic variables.
    pub fn sum_infeasibility(&self) -> (L::F, usize)
    {
        let mut sum = L::F::zero();
        let mut num = 0;
        for &seq in self.pivot_variable.iter() {
            let v = self.infeasibility_of(seq);
            if v > L::F::zero() {
                sum = sum + v;
                num += 1;
            }
        }
        (sum, num)
    }

    /// Fills the phase-one costs: \\(-1\\) below the lower bound, \\(+1\\) above the upper.
    pub(crate) fn phase_costs(&self, cost: &mut [L::F])
    {
        let tol = self.par.primal_tolerance;

        for v in cost.iter_mut() {
            *v = L::F::zero();
        }
        for &seq in self.pivot_variable.iter() {
            let x = self.solution[seq];
            if x < self.lower[seq] - tol {
                cost[seq] = -L::F::one();
            }
            else if x > self.upper[seq] + tol {
                cost[seq] = L::F::one();
            }
        }
    }

    /// Direction in which nonbasic `seq` improves the objective with reduced cost `dj`.
    pub(crate) fn attractive(&self, seq: usize, dj: L::F) -> Option<L::F>
    {
        let f1 = L::F::one();
        let tol = self.par.dual_tolerance;

        if self.lower[seq] == self.upper[seq] {
            return None;
        }
        match self.status[seq] {
            Status::Basic => None,
            Status::AtLower => if dj < -tol {Some(f1)} else {None},
            Status::AtUpper => if dj > tol {Some(-f1)} else {None},
            Status::IsFree => {
                if dj.abs() > tol {
                    Some(if dj > L::F::zero() {-f1} else {f1})
                }
                else {
                    None
                }
            },
        }
    }

    /// Bounded ratio test.
    ///
    /// * `alpha` is the column of `seq_in` after ftran.
    /// * `dir` is \\(\\pm 1\\), the moving direction of `seq_in`.
    ///
    /// Infeasible basic variables block at the bound they violate when they move toward it,
    /// and never block when they move away.
    /// Returns `None` if nothing blocks.
    pub fn ratio_test(&self, alpha: &IndexedVector<L::F>, seq_in: usize, dir: L::F) -> Option<Step<L::F>>
    {
        let f0 = L::F::zero();
        let tol = self.par.primal_tolerance;
        let tie = self.par.zero_tolerance;

        let mut best: Option<(Step<L::F>, L::F, usize)> = None;

        for &r in alpha.indices() {
            let a = alpha.get(r);
            if a.abs() < self.par.pivot_tolerance {
                continue;
            }
            let rate = -dir * a;
            let seq = self.pivot_variable[r];
            let (x, lo, up) = (self.solution[seq], self.lower[seq], self.upper[seq]);

            let (theta, to_upper) = if rate > f0 {
                if x < lo - tol {
                    ((lo - x) / rate, false)
                }
                else if x > up + tol || !up.is_finite() {
                    continue;
                }
                else {
                    (((up - x) / rate).max(f0), true)
                }
            }
            else {
                if x > up + tol {
                    ((x - up) / -rate, true)
                }
                else if x < lo - tol || !lo.is_finite() {
                    continue;
                }
                else {
                    (((x - lo) / -rate).max(f0), false)
                }
            };

            let better = match &best {
                None => true,
                Some((b, b_a, b_seq)) => {
                    theta < b.theta - tie
                    || (theta <= b.theta + tie && (a.abs() > *b_a || (a.abs() == *b_a && seq < *b_seq)))
                },
            };
            if better {
                best = Some((Step {row: Some(r), theta, to_upper}, a.abs(), seq));
            }
        }

        let span = self.upper[seq_in] - self.lower[seq_in];
        if span.is_finite() {
            let flip = Step {row: None, theta: span, to_upper: dir > f0};
            match &best {
                Some((b, _, _)) if b.theta <= span + tie => {},
                _ => return Some(flip),
            }
        }

        best.map(|(b, _, _)| b)
    }

    /// Moves `seq_in` by `dir * step.theta` and changes the basis.
    ///
    /// Returns the sequence of the leaving variable, `None` for a bound flip.
    pub fn pivot(&mut self, seq_in: usize, dir: L::F, step: &Step<L::F>, alpha: &IndexedVector<L::F>) -> Result<Option<usize>, SolverError>
    {
        let delta = dir * step.theta;
        if delta != L::F::zero() {
            self.solution[seq_in] = self.solution[seq_in] + delta;
            for &r in alpha.indices() {
                let seq = self.pivot_variable[r];
                self.solution[seq] = self.solution[seq] - delta * alpha.get(r);
            }
        }
        self.num_iterations += 1;
        self.finished = false;

        match step.row {
            None => {
                self.set_nonbasic(seq_in, step.to_upper);
                Ok(None)
            },
            Some(r) => {
                let out = self.pivot_variable[r];
                self.set_nonbasic(out, step.to_upper);
                self.status[seq_in] = Status::Basic;
                self.pivot_variable[r] = seq_in;

                if !self.factorization.replace_column(r, alpha) || self.factorization.needs_refactor() {
                    self.factorize()?;
                    self.compute_primals();
                }
                Ok(Some(out))
            },
        }
    }

    fn set_nonbasic(&mut self, seq: usize, to_upper: bool)
    {
        if to_upper && self.lower[seq] != self.upper[seq] {
            self.status[seq] = Status::AtUpper;
            self.solution[seq] = self.upper[seq];
        }
        else {
            self.status[seq] = Status::AtLower;
            self.solution[seq] = self.lower[seq];
        }
    }

    /// Replaces the cost vector of the structural columns.
    pub fn set_cost(&mut self, cost: &[L::F])
    {
        assert_eq!(cost.len(), self.n_col);

        self.cost.copy_from_slice(cost);
        self.finished = false;
    }

    /// Replaces the bounds of structural column `col`, moving it to a new bound if nonbasic.
    pub fn set_col_bounds(&mut self, col: usize, lower: L::F, upper: L::F)
    {
        self.lower[col] = lower;
        self.upper[col] = upper;
        if self.status[col] != Status::Basic {
            let (st, v) = self.nonbasic_bound(col, self.solution[col]);
            self.status[col] = st;
            self.solution[col] = v;
        }
        self.finished = false;
    }

    /// Recomputes the objective value \\(c^T x\\).
    pub(crate) fn compute_objective(&mut self)
    {
        self.objective_value = L::inner_prod(&self.cost, &self.solution[.. self.n_col]);
    }

    /// Number of structural columns.
    pub fn num_cols(&self) -> usize
    {
        self.n_col
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize
    {
        self.n_row
    }

    /// Structural column values \\(x\\).
    pub fn col_solution(&self) -> &[L::F]
    {
        &self.solution[.. self.n_col]
    }

    /// Row activities \\(Ax\\).
    pub fn row_activity(&self) -> &[L::F]
    {
        &self.solution[self.n_col..]
    }

    /// Row duals of the last pricing.
    pub fn row_dual(&self) -> &[L::F]
    {
        &self.dual
    }

    /// Reduced costs of the structural columns.
    pub fn reduced_cost(&self) -> &[L::F]
    {
        &self.dj[.. self.n_col]
    }

    /// Linear cost of the structural columns.
    pub fn cost(&self) -> &[L::F]
    {
        &self.cost
    }

    /// Lower bounds of all sequences.
    pub fn lower(&self) -> &[L::F]
    {
        &self.lower
    }

    /// Upper bounds of all sequences.
    pub fn upper(&self) -> &[L::F]
    {
        &self.upper
    }

    /// Basis status of all sequences.
    pub fn statuses(&self) -> &[Status]
    {
        &self.status
    }

    /// Sequences in the basis, by basis position.
    pub fn pivot_variables(&self) -> &[usize]
    {
        &self.pivot_variable
    }

    /// Matrix \\(A\\).
    pub fn matrix(&self) -> &PackedMatrix<L::F>
    {
        &self.matrix
    }

    /// Objective value of the last finished solve.
    pub fn objective_value(&self) -> L::F
    {
        self.objective_value
    }

    /// Number of pivots since the problem was loaded.
    pub fn num_iterations(&self) -> usize
    {
        self.num_iterations
    }

    /// Whether the last solve ended optimal and nothing changed since.
    pub fn is_optimal(&self) -> bool
    {
        self.finished
    }
}

//

#[test]
fn test_simplex1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let inf = f64::INFINITY;
    let a = PackedMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]).unwrap();

    let mut s = Simplex::<L>::new();
    s.load_problem(a, &[0., -inf], &[inf, 3.], &[1., 1.], &[-inf], &[2.]).unwrap();

    assert_eq!(s.statuses(), &[Status::AtLower, Status::AtUpper, Status::Basic]);
    assert_float_eq!(s.col_solution(), [0., 3.].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(s.row_activity(), [3.].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(s.sum_infeasibility().0, 1., abs <= 1e-12);

    let mut alpha = IndexedVector::new(1);
    s.unpack(1, &mut alpha);
    let mut d = alpha.dense().to_vec();
    s.factorization.ftran(&mut d);
    alpha.set_dense(&d, 0.);

    // decreasing x1 lowers the row activity, which blocks at its upper bound
    let step = s.ratio_test(&alpha, 1, -1.).unwrap();
    assert_eq!(step.row, Some(0));
    assert_float_eq!(step.theta, 1., abs <= 1e-12);
    assert!(step.to_upper);

    assert_eq!(s.pivot(1, -1., &step, &alpha).unwrap(), Some(2));
    assert_float_eq!(s.col_solution(), [0., 2.].as_ref(), abs_all <= 1e-12);
    assert_eq!(s.statuses()[2], Status::AtUpper);
    assert_eq!(s.sum_infeasibility().1, 0);
}
