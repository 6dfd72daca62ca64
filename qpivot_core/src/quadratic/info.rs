use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, Zero, One};
use crate::solver::LinAlg;
use crate::{PackedMatrix, Simplex, Status};
use super::QuadraticObjective;

//

/// Phase of the complementary pivoting loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase
{
    /// Unrestricted pivoting, repaired by cleanup and restoring pivots.
    Normal = 0,
    /// Pivoting that keeps every complementary pair intact.
    Complementary = 1,
    /// Reduction to a basic solution at a complementary feasible point.
    Basic = 2,
}

impl Phase
{
    /// One phase down, staying at [`Phase::Normal`].
    pub fn demoted(self) -> Phase
    {
        match self {
            Phase::Normal | Phase::Complementary => Phase::Normal,
            Phase::Basic => Phase::Complementary,
        }
    }
}

/// Extra row added when normalizing bounds into one-sided form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ExtraRow
{
    /// `x_j <= upper` of a boxed column.
    ColumnUpper(usize),
    /// `<= upper` copy of a ranged row.
    RowUpper(usize),
}

//

/// Quadratic iteration state
///
/// Persistent context of one complementary pivoting solve on an enlarged model.
/// Enlarged sequences are numbered as in the enlarged [`Simplex`]:
/// `x` columns, multiplier columns `pi`, primal row logicals `r`, stationarity row logicals `s`.
/// The complementary pairs are \\((x_j, s_j)\\) and \\((\\pi_i, r_i)\\).
pub struct QuadraticInfo<'a, L: LinAlg>
{
    objective: &'a QuadraticObjective<L>,

    number_x_columns: usize,
    number_x_rows: usize,
    number_quadratic_columns: usize,
    number_quadratic_rows: usize,

    sequence_in: Option<usize>,
    crucial_sj: Option<usize>,
    current_phase: Phase,
    current_solution: Vec<L::F>,
    current_status: Vec<Status>,
    current_pivots: Vec<usize>,

    valid_phase: Phase,
    valid_solution: Vec<L::F>,
    valid_status: Vec<Status>,
    valid_pivots: Vec<usize>,
    valid_sequence_in: Option<usize>,
    valid_crucial_sj: Option<usize>,

    dj_weight: Vec<L::F>,
    gradient: Vec<L::F>,
    infeas_cost: L::F,
    basic_row: Vec<Option<usize>>,
    implied_sj: Vec<bool>,

    pub(crate) extra_rows: Vec<ExtraRow>,
    pub(crate) sj_gradient: Vec<L::F>,
    pub(crate) work: Vec<L::F>,
    pub(crate) drift: L::F,
    pub(crate) sum_complementarity: L::F,
    pub(crate) valid_infeasibility: L::F,
    pub(crate) num_rollbacks: usize,
    pub(crate) lowest_index_ties: bool,
    pub(crate) check_distance: Vec<L::F>,
    pub(crate) check_violation: Vec<L::F>,

    // phase changes with their rollback flag
    #[cfg(test)]
    pub(crate) phase_trace: Vec<(Phase, bool)>,
}

impl<'a, L: LinAlg> QuadraticInfo<'a, L>
{
    /// Creates an instance borrowing the original objective.
    ///
    /// The enlarged dimensions are set by [`Simplex::make_quadratic`].
    pub fn new(objective: &'a QuadraticObjective<L>) -> Self
    {
        let n = objective.num_cols();

        QuadraticInfo {
            objective,
            number_x_columns: n,
            number_x_rows: 0,
            number_quadratic_columns: 0,
            number_quadratic_rows: 0,
            sequence_in: None,
            crucial_sj: None,
            current_phase: Phase::Basic,
            current_solution: Vec::new(),
            current_status: Vec::new(),
            current_pivots: Vec::new(),
            valid_phase: Phase::Basic,
            valid_solution: Vec::new(),
            valid_status: Vec::new(),
            valid_pivots: Vec::new(),
            valid_sequence_in: None,
            valid_crucial_sj: None,
            dj_weight: Vec::new(),
            gradient: vec![L::F::zero(); n],
            infeas_cost: L::F::zero(),
            basic_row: Vec::new(),
            implied_sj: Vec::new(),
            extra_rows: Vec::new(),
            sj_gradient: vec![L::F::zero(); n],
            work: Vec::new(),
            drift: L::F::zero(),
            sum_complementarity: L::F::zero(),
            valid_infeasibility: L::F::infinity(),
            num_rollbacks: 0,
            lowest_index_ties: false,
            check_distance: Vec::new(),
            check_violation: Vec::new(),
            #[cfg(test)]
            phase_trace: Vec::new(),
        }
    }

    /// Sizes every per-sequence buffer once.
    pub(crate) fn set_dimensions(&mut self, number_x_rows: usize, number_quadratic_columns: usize, number_quadratic_rows: usize)
    {
        self.number_x_rows = number_x_rows;
        self.number_quadratic_columns = number_quadratic_columns;
        self.number_quadratic_rows = number_quadratic_rows;

        let n_total = self.number_sequences();
        let n_row = self.number_x_rows + self.number_quadratic_rows;

        self.current_solution = vec![L::F::zero(); n_total];
        self.current_status = vec![Status::Basic; n_total];
        self.current_pivots = vec![0; n_row];
        self.valid_solution = vec![L::F::zero(); n_total];
        self.valid_status = vec![Status::Basic; n_total];
        self.valid_pivots = vec![0; n_row];
        self.dj_weight = vec![L::F::one(); n_total];
        self.basic_row = vec![None; n_total];
        self.implied_sj = vec![false; n_total];
        self.work = vec![L::F::zero(); n_total];
        self.check_distance = vec![L::F::zero(); n_total];
        self.check_violation = vec![L::F::zero(); n_total];
    }

    /// Number of original columns.
    pub fn number_x_columns(&self) -> usize
    {
        self.number_x_columns
    }

    /// Number of original rows.
    pub fn number_x_rows(&self) -> usize
    {
        self.number_x_rows
    }

    /// Number of added columns (one multiplier per primal row).
    pub fn number_quadratic_columns(&self) -> usize
    {
        self.number_quadratic_columns
    }

    /// Number of added rows (bound rows and stationarity rows).
    pub fn number_quadratic_rows(&self) -> usize
    {
        self.number_quadratic_rows
    }

    /// Number of structural columns of the enlarged model.
    pub fn number_columns(&self) -> usize
    {
        self.number_x_columns + self.number_quadratic_columns
    }

    /// Number of sequences of the enlarged model.
    pub fn number_sequences(&self) -> usize
    {
        self.number_columns() + self.number_x_rows + self.number_quadratic_rows
    }

    /// Complementary partner of an enlarged sequence.
    pub fn partner(&self, seq: usize) -> usize
    {
        let n = self.number_x_columns;
        let mx = self.number_quadratic_columns;
        let ne = n + mx;

        if seq < n {
            ne + mx + seq
        }
        else if seq < ne {
            ne + (seq - n)
        }
        else if seq < ne + mx {
            n + (seq - ne)
        }
        else {
            seq - ne - mx
        }
    }

    /// Entering sequence of the current iteration.
    pub fn sequence_in(&self) -> Option<usize>
    {
        self.sequence_in
    }

    pub fn set_sequence_in(&mut self, sequence: Option<usize>)
    {
        self.sequence_in = sequence;
    }

    /// Sequence whose leaving restores complementarity after a cleanup pivot.
    pub fn crucial_sj(&self) -> Option<usize>
    {
        self.crucial_sj
    }

    pub fn set_crucial_sj(&mut self, sequence: Option<usize>)
    {
        self.crucial_sj = sequence;
    }

    pub fn current_phase(&self) -> Phase
    {
        self.current_phase
    }

    pub fn set_current_phase(&mut self, phase: Phase)
    {
        self.current_phase = phase;
    }

    /// Phase change inside the pivoting loop.
    ///
    /// A drop below the current phase is only legal as part of a rollback.
    pub(crate) fn change_phase(&mut self, phase: Phase, rollback: bool)
    {
        if rollback {
            log::trace!("phase {:?} -> {:?} (rollback)", self.current_phase, phase);
        }
        else {
            debug_assert!(self.current_phase != Phase::Basic || phase == Phase::Basic);
            log::trace!("phase {:?} -> {:?}", self.current_phase, phase);
        }
        self.current_phase = phase;

        #[cfg(test)]
        self.phase_trace.push((phase, rollback));
    }

    /// Last checkpointed solution.
    pub fn current_solution(&self) -> &[L::F]
    {
        &self.current_solution
    }

    pub fn valid_phase(&self) -> Phase
    {
        self.valid_phase
    }

    /// Rollback target solution.
    pub fn valid_solution(&self) -> &[L::F]
    {
        &self.valid_solution
    }

    pub fn valid_sequence_in(&self) -> Option<usize>
    {
        self.valid_sequence_in
    }

    pub fn valid_crucial_sj(&self) -> Option<usize>
    {
        self.valid_crucial_sj
    }

    pub(crate) fn current_status(&self) -> &[Status]
    {
        &self.current_status
    }

    pub(crate) fn current_pivots(&self) -> &[usize]
    {
        &self.current_pivots
    }

    /// Copies a model state into the current snapshot.
    pub fn set_current_solution(&mut self, solution: &[L::F], status: &[Status], pivots: &[usize])
    {
        L::copy(solution, &mut self.current_solution);
        self.current_status.copy_from_slice(status);
        self.current_pivots.copy_from_slice(pivots);
    }

    /// Advances the valid snapshot to the current one.
    pub fn save_status(&mut self)
    {
        self.valid_phase = self.current_phase;
        self.valid_sequence_in = self.sequence_in;
        self.valid_crucial_sj = self.crucial_sj;
        L::copy(&self.current_solution, &mut self.valid_solution);
        self.valid_status.copy_from_slice(&self.current_status);
        self.valid_pivots.copy_from_slice(&self.current_pivots);
    }

    /// Resets the current snapshot to the valid one.
    pub fn restore_status(&mut self)
    {
        self.current_phase = self.valid_phase;
        self.sequence_in = self.valid_sequence_in;
        self.crucial_sj = self.valid_crucial_sj;
        L::copy(&self.valid_solution, &mut self.current_solution);
        self.current_status.copy_from_slice(&self.valid_status);
        self.current_pivots.copy_from_slice(&self.valid_pivots);
    }

    /// The original objective.
    pub fn original_objective(&self) -> &'a QuadraticObjective<L>
    {
        self.objective
    }

    /// \\(Q\\) of the original objective.
    pub fn quadratic_objective(&self) -> &'a PackedMatrix<L::F>
    {
        self.objective.quadratic()
    }

    /// \\(c\\) of the original objective.
    pub fn linear_objective(&self) -> &'a [L::F]
    {
        self.objective.linear()
    }

    /// Pricing weights, one per enlarged sequence.
    pub fn dj_weight(&self) -> &[L::F]
    {
        &self.dj_weight
    }

    pub fn dj_weight_mut(&mut self) -> &mut [L::F]
    {
        &mut self.dj_weight
    }

    /// Recomputes \\(Qx\\) from the model's `x` columns.
    pub fn create_gradient(&mut self, model: &Simplex<L>)
    {
        let n = self.number_x_columns;
        self.objective.gradient(&model.col_solution()[.. n], &mut self.gradient);
    }

    /// Adds `delta` times column `col` of \\(Q\\) to the gradient.
    pub fn update_gradient(&mut self, col: usize, delta: L::F)
    {
        if col < self.number_x_columns && delta != L::F::zero() {
            let (rows, vals) = self.objective.quadratic().col(col);
            for (r, q) in rows.iter().zip(vals) {
                self.gradient[*r] = self.gradient[*r] + *q * delta;
            }
        }
    }

    /// Gradient \\(Qx\\) of the quadratic term.
    pub fn gradient(&self) -> &[L::F]
    {
        &self.gradient
    }

    /// Starts `sj_gradient` over from the gradient.
    pub(crate) fn reset_sj_gradient(&mut self)
    {
        self.sj_gradient.copy_from_slice(&self.gradient);
    }

    pub fn infeas_cost(&self) -> L::F
    {
        self.infeas_cost
    }

    pub fn set_infeas_cost(&mut self, value: L::F)
    {
        self.infeas_cost = value;
    }

    /// Basis position of each enlarged sequence, `None` if nonbasic.
    pub fn basic_row(&self) -> &[Option<usize>]
    {
        &self.basic_row
    }

    /// Whether a sequence is basic together with its partner.
    pub fn implied_sj(&self) -> &[bool]
    {
        &self.implied_sj
    }

    /// Rebuilds `basic_row` from the pivot variables, and `implied_sj` from `basic_row`.
    pub fn update_basic_row(&mut self, pivots: &[usize])
    {
        for b in self.basic_row.iter_mut() {
            *b = None;
        }
        for (k, &seq) in pivots.iter().enumerate() {
            self.basic_row[seq] = Some(k);
        }

        for seq in 0.. self.implied_sj.len() {
            let p = self.partner(seq);
            self.implied_sj[seq] = self.basic_row[seq].is_some() && self.basic_row[p].is_some();
        }
    }
}

//

#[test]
fn test_info1()
{
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let obj = QuadraticObjective::<L>::from_sym_pack(&[1., 0.], &[2., 0., 0.]).unwrap();
    let mut info = QuadraticInfo::new(&obj);
    // 2 columns, 1 row, no extra row
    info.set_dimensions(1, 1, 2);
    assert_eq!(info.number_columns(), 3);
    assert_eq!(info.number_sequences(), 6);

    for seq in 0.. 6 {
        assert_eq!(info.partner(info.partner(seq)), seq);
    }
    assert_eq!(info.partner(0), 4);
    assert_eq!(info.partner(2), 3);

    info.update_basic_row(&[0, 4, 5]);
    assert_eq!(info.basic_row()[4], Some(1));
    assert!(info.implied_sj()[0] && info.implied_sj()[4]);
    assert!(!info.implied_sj()[5] && !info.implied_sj()[1]);

    info.update_gradient(0, 0.5);
    assert_eq!(info.gradient(), &[1., 0.]);
}

#[test]
fn test_info2()
{
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let obj = QuadraticObjective::<L>::from_sym_pack(&[0.], &[1.]).unwrap();
    let mut info = QuadraticInfo::new(&obj);
    info.set_dimensions(0, 0, 1);

    let st = [Status::AtLower, Status::Basic];
    info.set_current_phase(Phase::Complementary);
    info.set_current_solution(&[0., 1.], &st, &[1]);
    info.save_status();

    info.set_current_phase(Phase::Normal);
    info.set_crucial_sj(Some(1));
    info.set_current_solution(&[2., 3.], &[Status::Basic, Status::AtLower], &[0]);
    assert_ne!(info.current_solution(), info.valid_solution());

    info.restore_status();
    assert_eq!(info.current_solution(), info.valid_solution());
    assert_eq!(info.current_phase(), info.valid_phase());
    assert_eq!(info.current_phase(), Phase::Complementary);
    assert_eq!(info.crucial_sj(), info.valid_crucial_sj());
    assert_eq!(info.current_status(), &st);
    assert_eq!(info.current_pivots(), &[1]);
}
