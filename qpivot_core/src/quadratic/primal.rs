//! Complementary pivoting on the enlarged model

use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, Zero, One};
use core::cmp::Ordering;
use core::fmt::{Debug, LowerExp};
use crate::solver::{LinAlg, SolverError};
use crate::{IndexedVector, Simplex, SimplexProgress, Status, Step};
use super::{Phase, QuadraticInfo, QuadraticObjective};

//

// pivots without progress before the loop rolls back
const STALL_PIVOTS: usize = 8;

/// Mode of [`Simplex::primal_row_quadratic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode
{
    /// Ordinary ratio test; a step losing complementarity is reported without preparing the pivot.
    None = 0,
    /// The step is going to be taken even if it loses complementarity.
    Cleanup = 1,
    /// Restoring complementarity: the crucial sequence is free to leave.
    Restore = 2,
}

/// Outcome of [`Simplex::primal_row_quadratic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioOutcome<F>
{
    /// The step keeps every complementary pair.
    Pivot(Step<F>),
    /// The step leaves the entering variable and its partner both off their bounds.
    LosingComplementarity(Step<F>),
    /// Nothing blocks the entering variable.
    Unbounded,
}

/// Occasion of [`Simplex::status_of_problem_in_primal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemCheck
{
    /// Before the first iteration.
    Initial,
    /// Periodic refactorization.
    Normal,
    /// After the snapshot was restored.
    Restore,
}

struct Workspace<F: Float>
{
    row_array: IndexedVector<F>,
    rhs_array: IndexedVector<F>,
    spare: IndexedVector<F>,
    spare2: IndexedVector<F>,
    column: Vec<F>,
    array1: Vec<F>,
    array2: Vec<F>,
    candidates: Vec<(F, usize, F)>,
}

impl<F: Float> Workspace<F>
{
    fn new(n_row: usize, n_total: usize) -> Self
    {
        Workspace {
            row_array: IndexedVector::new(n_row),
            rhs_array: IndexedVector::new(n_row),
            spare: IndexedVector::new(n_row),
            spare2: IndexedVector::new(n_row),
            column: vec![F::zero(); n_row],
            array1: vec![F::zero(); n_total],
            array2: vec![F::zero(); n_total],
            candidates: Vec::with_capacity(n_total),
        }
    }
}

//

impl<L: LinAlg> Simplex<L>
where L::F: Float + Debug + LowerExp
{
    /// Solves the quadratic program of `objective` over the loaded constraints.
    ///
    /// The cost of the model is replaced by the linear term of `objective`.
    /// Without a quadratic term this is [`Simplex::primal`];
    /// otherwise the enlarged model is built, solved by complementary pivoting from `phase`,
    /// and its solution mapped back.
    ///
    /// Returns `Err` with [`SolverError::InvalidOp`] on a size mismatch,
    /// or [`SolverError::Infeasible`] when pivoting fails.
    pub fn primal_quadratic(&mut self, objective: &QuadraticObjective<L>, phase: Phase) -> Result<(), SolverError>
    {
        if objective.num_cols() != self.n_col {
            log::error!("Size mismatch: objective {}, model {}", objective.num_cols(), self.n_col);
            return Err(SolverError::InvalidOp);
        }
        self.set_cost(objective.linear());

        let mut info = QuadraticInfo::new(objective);
        match self.make_quadratic(&mut info)? {
            None => {
                log::debug!("no quadratic term: solved as linear");
                self.primal()
            },
            Some(mut quad) => {
                let ret = quad.primal_quadratic2(&mut info, phase);
                self.num_iterations += quad.num_iterations;
                ret?;
                self.end_quadratic(quad, &info)
            },
        }
    }

    /// Runs the phase loop on an enlarged model made by [`Simplex::make_quadratic`].
    ///
    /// Every failure of the loop is reported as [`SolverError::Infeasible`].
    pub fn primal_quadratic2(&mut self, info: &mut QuadraticInfo<'_, L>, phase: Phase) -> Result<(), SolverError>
    {
        if info.number_sequences() != self.n_col + self.n_row {
            log::error!("Size mismatch: info {}, model {}", info.number_sequences(), self.n_col + self.n_row);
            return Err(SolverError::InvalidOp);
        }

        log::info!("----- Started");
        self.finished = false;
        info.set_current_phase(phase);
        info.set_crucial_sj(None);
        info.set_sequence_in(None);
        info.num_rollbacks = 0;

        match self.while_iterating(info) {
            Ok(()) => {
                self.finished = true;
                log::info!("----- Optimal");
                Ok(())
            },
            Err(e) => {
                log::warn!("----- Infeasible ({:?})", e);
                Err(SolverError::Infeasible)
            },
        }
    }

    /// Phase loop.
    ///
    /// * [`Phase::Complementary`] pivots on phase-one reduced costs and takes only
    ///   steps that keep every pair complementary.
    /// * [`Phase::Normal`] takes the best step anyway, then pivots on partners of
    ///   the leaving variables until the broken pair is complementary again.
    /// * [`Phase::Basic`] removes pairs basic together at a feasible complementary point.
    ///
    /// Failures roll back to the last valid snapshot with a lower phase.
    pub fn while_iterating(&mut self, info: &mut QuadraticInfo<'_, L>) -> Result<(), SolverError>
    {
        let n_total = self.n_col + self.n_row;
        let mut w = Workspace::new(self.n_row, n_total);
        let mut progress = SimplexProgress::new(self.par.zero_tolerance);
        let mut last_cleaned = self.num_iterations;

        self.status_of_problem_in_primal(&mut last_cleaned, ProblemCheck::Initial, &mut progress, info)?;

        let mut i = 0;
        loop {
            let excess_iter = if let Some(max_iter) = self.par.max_iter {
                i + 1 >= max_iter
            } else {
                false
            };
            if excess_iter {
                log::warn!("----- ExcessIter");
                return Err(SolverError::ExcessIter);
            }

            let log_trig = if self.par.log_period > 0 {
                i % self.par.log_period == 0
            }
            else {
                if i == 0 && log::log_enabled!(log::Level::Debug) {
                    log::warn!("log_period == 0: no periodic log");
                }
                false
            };
            i += 1;

            if self.num_iterations >= last_cleaned + self.par.refactor_freq || info.drift > self.par.primal_tolerance {
                self.status_of_problem_in_primal(&mut last_cleaned, ProblemCheck::Normal, &mut progress, info)?;
            }

            let (infeas, n_infeas) = self.sum_infeasibility();
            let violated = self.check_complementarity(info, &mut w.array1, &mut w.array2);

            if log_trig {
                log::debug!("{}: {:?} infeas {:.2e} ({}) compl {:.2e} ({})",
                    i, info.current_phase(), infeas, n_infeas, info.sum_complementarity, violated);
            }
            else {
                log::trace!("{}: {:?} infeas {:.2e} ({}) compl {:.2e} ({})",
                    i, info.current_phase(), infeas, n_infeas, info.sum_complementarity, violated);
            }

            if info.current_phase() != Phase::Basic {
                let stalled = progress.num_bad() > n_total + STALL_PIVOTS
                    || (progress.looping() && progress.num_bad() > STALL_PIVOTS);
                if stalled {
                    log::debug!("{}: no progress in {} pivots", i, progress.num_bad());
                    self.rollback(info, progress.last_sequence_in(), &mut last_cleaned, &mut progress)?;
                    continue;
                }
            }
            info.lowest_index_ties = progress.looping();

            match info.current_phase() {
                Phase::Basic => {
                    if n_infeas > 0 || violated > 0 {
                        if i == 1 {
                            log::debug!("{}: restarted as {:?}", i, Phase::Complementary);
                            info.set_current_phase(Phase::Complementary);
                        }
                        else {
                            self.rollback(info, None, &mut last_cleaned, &mut progress)?;
                        }
                        continue;
                    }
                    if self.remove_implied_pair(info, &mut w)? {
                        continue;
                    }
                    return Ok(());
                },
                Phase::Complementary => {
                    if violated > 0 {
                        self.rollback(info, None, &mut last_cleaned, &mut progress)?;
                        continue;
                    }
                    if n_infeas == 0 {
                        info.change_phase(Phase::Basic, false);
                        self.status_of_problem_in_primal(&mut last_cleaned, ProblemCheck::Normal, &mut progress, info)?;
                        log::debug!("{}: complementary feasible", i);
                        continue;
                    }

                    self.create_djs(info, &mut w.array1, &mut w.array2);
                    self.collect_candidates(info, &w.array1, info.lowest_index_ties, &mut w.candidates);
                    if w.candidates.is_empty() {
                        log::debug!("{}: no entering candidate", i);
                        return Err(SolverError::Infeasible);
                    }

                    let mut pivoted = false;
                    for k in 0.. w.candidates.len() {
                        let (_, seq, dir) = w.candidates[k];
                        self.pivot_column(seq, &mut w.row_array, &mut w.column);
                        info.set_sequence_in(Some(seq));

                        let outcome = self.primal_row_quadratic(&w.row_array, &mut w.rhs_array,
                            &mut w.spare, &mut w.spare2, info, CleanupMode::None, dir);
                        if let RatioOutcome::Pivot(step) = outcome {
                            let out = self.quadratic_pivot(info, seq, dir, &step, &w.row_array)?;
                            log::trace!("{}: in {} out {:?} theta {:.2e}", i, seq, out, step.theta);
                            progress.record(info.sum_complementarity, infeas, Some(seq), out);
                            pivoted = true;
                            break;
                        }
                    }
                    info.set_sequence_in(None);

                    if !pivoted {
                        log::debug!("{}: every candidate loses complementarity", i);
                        self.status_of_problem_in_primal(&mut last_cleaned, ProblemCheck::Normal, &mut progress, info)?;
                        info.change_phase(Phase::Normal, false);
                    }
                },
                Phase::Normal => {
                    if violated > 0 {
                        self.rollback(info, None, &mut last_cleaned, &mut progress)?;
                        continue;
                    }
                    if n_infeas == 0 {
                        info.change_phase(Phase::Complementary, false);
                        continue;
                    }

                    self.create_djs(info, &mut w.array1, &mut w.array2);
                    self.collect_candidates(info, &w.array1, info.lowest_index_ties, &mut w.candidates);
                    let (seq, dir) = match w.candidates.first() {
                        Some((_, seq, dir)) => (*seq, *dir),
                        None => {
                            log::debug!("{}: no entering candidate", i);
                            return Err(SolverError::Infeasible);
                        },
                    };

                    self.pivot_column(seq, &mut w.row_array, &mut w.column);
                    info.set_sequence_in(Some(seq));

                    let outcome = self.primal_row_quadratic(&w.row_array, &mut w.rhs_array,
                        &mut w.spare, &mut w.spare2, info, CleanupMode::Cleanup, dir);
                    match outcome {
                        RatioOutcome::Pivot(step) => {
                            let out = self.quadratic_pivot(info, seq, dir, &step, &w.row_array)?;
                            log::trace!("{}: in {} out {:?} theta {:.2e}", i, seq, out, step.theta);
                            progress.record(info.sum_complementarity, infeas, Some(seq), out);
                            info.set_sequence_in(None);
                            info.change_phase(Phase::Complementary, false);
                        },
                        RatioOutcome::LosingComplementarity(step) => {
                            let out = self.quadratic_pivot(info, seq, dir, &step, &w.row_array)?;
                            log::trace!("{}: cleanup in {} out {:?} theta {:.2e}", i, seq, out, step.theta);
                            info.set_crucial_sj(Some(info.partner(seq)));

                            if self.restore_complementarity(info, out, &mut w)? {
                                progress.record(info.sum_complementarity, infeas, Some(seq), out);
                                info.set_crucial_sj(None);
                                info.set_sequence_in(None);
                                info.change_phase(Phase::Complementary, false);
                            }
                            else {
                                self.rollback(info, Some(seq), &mut last_cleaned, &mut progress)?;
                            }
                        },
                        RatioOutcome::Unbounded => {
                            self.rollback(info, Some(seq), &mut last_cleaned, &mut progress)?;
                        },
                    }
                },
            }
        } // end of loop
    }

    /// Ratio test of the entering variable `info.sequence_in()` moving in `dir`.
    ///
    /// * `row_array` is its column after ftran.
    /// * `rhs_array` gets the phase-one cost change of each basis position the step changes.
    /// * `spare` gets the step length at which each basis position blocks.
    /// * `spare2` gets the change of each basic value.
    ///
    /// A basic variable at a bound whose partner is also basic holds the step at zero,
    /// as does the entering variable's partner at a bound.
    /// Ties prefer that partner (or the crucial sequence in [`CleanupMode::Restore`]),
    /// then the largest pivot, then the lowest sequence.
    /// While the loop is cycling, the lowest sequence wins over the largest pivot.
    pub fn primal_row_quadratic(&self,
        row_array: &IndexedVector<L::F>, rhs_array: &mut IndexedVector<L::F>,
        spare: &mut IndexedVector<L::F>, spare2: &mut IndexedVector<L::F>,
        info: &QuadraticInfo<'_, L>, cleanup: CleanupMode, dir: L::F) -> RatioOutcome<L::F>
    {
        let f0 = L::F::zero();
        let tol = self.par.primal_tolerance;
        let tie = self.par.zero_tolerance;
        let piv = self.par.pivot_tolerance;

        rhs_array.clear();
        spare.clear();
        spare2.clear();

        let seq_in = match info.sequence_in() {
            Some(seq) => seq,
            None => {
                log::error!("No entering sequence");
                return RatioOutcome::Unbounded;
            },
        };
        let partner_in = info.partner(seq_in);
        let partner_row = info.basic_row()[partner_in];
        let crucial = if cleanup == CleanupMode::Restore {info.crucial_sj()} else {None};

        // step, preferred, |alpha|, sequence
        let mut best: Option<(Step<L::F>, bool, L::F, usize)> = None;

        for &r in row_array.indices() {
            let a = row_array.get(r);
            if a.abs() < piv {
                continue;
            }
            let rate = -dir * a;
            let seq = self.pivot_variable[r];
            let (x, lo, up) = (self.solution[seq], self.lower[seq], self.upper[seq]);

            let preferred = Some(seq) == crucial || Some(r) == partner_row;
            let held = self.at_bound(seq)
                && (Some(r) == partner_row || (info.implied_sj()[seq] && Some(seq) != crucial));

            let (theta, to_upper) = if held {
                (f0, (x - up).abs() < (x - lo).abs())
            }
            else if rate > f0 {
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
            spare.insert(r, theta);

            let better = match &best {
                None => true,
                Some((b, b_pref, b_a, b_seq)) => {
                    if theta < b.theta - tie {
                        true
                    }
                    else if theta > b.theta + tie {
                        false
                    }
                    else if preferred != *b_pref {
                        preferred
                    }
                    else if info.lowest_index_ties {
                        seq < *b_seq
                    }
                    else {
                        a.abs() > *b_a || (a.abs() == *b_a && seq < *b_seq)
                    }
                },
            };
            if better {
                best = Some((Step {row: Some(r), theta, to_upper}, preferred, a.abs(), seq));
            }
        }

        let span = self.upper[seq_in] - self.lower[seq_in];
        let step = match best {
            Some((b, _, _, _)) if !(span.is_finite() && span < b.theta - tie) => b,
            _ if span.is_finite() => Step {row: None, theta: span, to_upper: dir > f0},
            _ => return RatioOutcome::Unbounded,
        };

        let mut losing = false;
        if let (Some(pr), Some(r)) = (partner_row, step.row) {
            let stays = row_array.get(pr).abs() < piv && self.at_bound(partner_in);
            if pr != r && !stays {
                if cleanup == CleanupMode::None {
                    return RatioOutcome::LosingComplementarity(step);
                }
                losing = true;
            }
        }

        for &r in row_array.indices() {
            let dx = -dir * step.theta * row_array.get(r);
            if dx == f0 {
                continue;
            }
            spare2.insert(r, dx);

            let seq = self.pivot_variable[r];
            let before = self.phase_cost_of(seq, self.solution[seq]);
            let after = if step.row == Some(r) {
                f0
            }
            else {
                self.phase_cost_of(seq, self.solution[seq] + dx)
            };
            if after != before {
                rhs_array.insert(r, (after - before) * info.infeas_cost());
            }
        }

        if losing {
            RatioOutcome::LosingComplementarity(step)
        }
        else {
            RatioOutcome::Pivot(step)
        }
    }

    /// Refactorizes, recomputes values, gradient and basic rows, and checkpoints.
    ///
    /// [`ProblemCheck::Restore`] first loads the current snapshot of `info` into the model.
    /// A complementary state without a pending restore becomes the new valid snapshot.
    pub fn status_of_problem_in_primal(&mut self, last_cleaned: &mut usize, typ: ProblemCheck,
        progress: &mut SimplexProgress<L::F>, info: &mut QuadraticInfo<'_, L>) -> Result<(), SolverError>
    {
        if typ == ProblemCheck::Restore {
            self.solution.copy_from_slice(info.current_solution());
            self.status.copy_from_slice(info.current_status());
            self.pivot_variable.copy_from_slice(info.current_pivots());
        }

        self.factorize()?;
        self.compute_primals();
        info.create_gradient(self);
        info.update_basic_row(&self.pivot_variable);
        *last_cleaned = self.num_iterations;

        if typ != ProblemCheck::Normal {
            progress.reset();
        }

        let mut distance = core::mem::take(&mut info.check_distance);
        let mut violation = core::mem::take(&mut info.check_violation);
        let violated = self.check_complementarity(info, &mut distance, &mut violation);
        info.check_distance = distance;
        info.check_violation = violation;

        if typ != ProblemCheck::Restore && info.crucial_sj().is_none() && violated == 0 {
            let (infeas, _) = self.sum_infeasibility();
            // rollbacks count from the best infeasibility checkpointed
            if infeas < info.valid_infeasibility - self.par.primal_tolerance {
                info.num_rollbacks = 0;
                info.valid_infeasibility = infeas;
            }
            info.set_current_solution(&self.solution, &self.status, &self.pivot_variable);
            info.save_status();
            log::trace!("checkpoint at {:?}, infeas {:.2e}", info.current_phase(), infeas);
        }
        Ok(())
    }

    /// Counts complementary pairs with both members off their bounds.
    ///
    /// * `array1` gets the distance of each basic sequence to its nearest bound, zero if nonbasic.
    ///   For `s_j` the value implied by the gradient is measured.
    /// * `array2` gets the violation, the smaller distance of the pair, at both members.
    ///
    /// Also sets `sum_complementarity` and `drift` of `info`.
    pub fn check_complementarity(&self, info: &mut QuadraticInfo<'_, L>, array1: &mut [L::F], array2: &mut [L::F]) -> usize
    {
        let f0 = L::F::zero();
        let tol = self.par.primal_tolerance;
        let n_total = self.n_col + self.n_row;
        let s0 = info.number_columns() + info.number_quadratic_columns();

        self.sj_from_gradient(info);

        for v in array1.iter_mut() {
            *v = f0;
        }
        for v in array2.iter_mut() {
            *v = f0;
        }

        let mut drift = f0;
        for seq in 0.. n_total {
            if info.basic_row()[seq].is_some() {
                let x = if seq >= s0 {
                    let g = info.sj_gradient[seq - s0];
                    drift = drift.max((self.solution[seq] - g).abs());
                    g
                }
                else {
                    self.solution[seq]
                };
                array1[seq] = self.bound_distance(seq, x);
            }
        }

        let mut count = 0;
        let mut sum = f0;
        for seq in 0.. n_total {
            let p = info.partner(seq);
            if seq < p {
                let v = array1[seq].min(array1[p]);
                if v > tol {
                    count += 1;
                    if v.is_finite() {
                        sum = sum + v;
                    }
                    array2[seq] = v;
                    array2[p] = v;
                }
            }
        }

        info.sum_complementarity = sum;
        info.drift = drift;
        count
    }

    /// Prices the phase-one costs of the enlarged model.
    ///
    /// * `array1` gets the reduced cost of every sequence.
    /// * `array2` gets the reduced cost \\(c_j + (Qx - A^T \\pi)_j\\) of the original columns.
    pub fn create_djs(&mut self, info: &mut QuadraticInfo<'_, L>, array1: &mut [L::F], array2: &mut [L::F])
    {
        self.phase_costs(&mut info.work);
        L::scale(info.infeas_cost(), &mut info.work);
        self.compute_duals(&info.work);
        array1.copy_from_slice(&self.dj);

        self.sj_from_gradient(info);
        let c = info.linear_objective();
        for v in array2.iter_mut() {
            *v = L::F::zero();
        }
        for j in 0.. info.number_x_columns() {
            array2[j] = c[j] + info.sj_gradient[j];
        }
    }

    fn sj_from_gradient(&self, info: &mut QuadraticInfo<'_, L>)
    {
        let n = info.number_x_columns();
        let mx = info.number_quadratic_columns();

        info.reset_sj_gradient();
        for i in 0.. mx {
            let pi = self.solution[n + i];
            if pi != L::F::zero() {
                let (rows, vals) = self.matrix.col(n + i);
                for (r, a) in rows.iter().zip(vals) {
                    if *r >= mx {
                        info.sj_gradient[*r - mx] = info.sj_gradient[*r - mx] + *a * pi;
                    }
                }
            }
        }
    }

    fn collect_candidates(&self, info: &QuadraticInfo<'_, L>, dj: &[L::F], bland: bool, candidates: &mut Vec<(L::F, usize, L::F)>)
    {
        candidates.clear();
        for (seq, &d) in dj.iter().enumerate() {
            if let Some(dir) = self.attractive(seq, d) {
                candidates.push((d.abs() * info.dj_weight()[seq], seq, dir));
            }
        }
        if !bland {
            candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));
        }
    }

    fn pivot_column(&self, seq: usize, row_array: &mut IndexedVector<L::F>, column: &mut [L::F])
    {
        self.unpack(seq, row_array);
        column.copy_from_slice(row_array.dense());
        self.factorization.ftran(column);
        row_array.set_dense(column, self.par.zero_tolerance);
    }

    fn quadratic_pivot(&mut self, info: &mut QuadraticInfo<'_, L>,
        seq_in: usize, dir: L::F, step: &Step<L::F>, row_array: &IndexedVector<L::F>) -> Result<Option<usize>, SolverError>
    {
        let delta = dir * step.theta;
        if delta != L::F::zero() {
            info.update_gradient(seq_in, delta);
            for &r in row_array.indices() {
                info.update_gradient(self.pivot_variable[r], -delta * row_array.get(r));
            }
        }

        let out = self.pivot(seq_in, dir, step, row_array)?;

        if step.row.is_some() && self.factorization.num_updates() == 0 {
            // refactorized with fresh values
            info.create_gradient(self);
        }
        info.update_basic_row(&self.pivot_variable);
        Ok(out)
    }

    /// Pivots on partners of the leaving variables until the crucial pair is complementary.
    fn restore_complementarity(&mut self, info: &mut QuadraticInfo<'_, L>, left: Option<usize>, w: &mut Workspace<L::F>) -> Result<bool, SolverError>
    {
        let f1 = L::F::one();

        let crucial = match info.crucial_sj() {
            Some(crucial) => crucial,
            None => return Ok(true),
        };
        let pair = [crucial, info.partner(crucial)];
        let mut left = left;

        for _ in 0.. self.n_col + self.n_row {
            let out = match left {
                Some(out) => out,
                None => return Ok(false),
            };
            if pair.contains(&out) {
                return Ok(true);
            }

            let seq = info.partner(out);
            if self.lower[seq] == self.upper[seq] {
                return Ok(false);
            }
            let dir = match self.status[seq] {
                Status::Basic => return Ok(false),
                Status::AtLower => f1,
                Status::AtUpper => -f1,
                Status::IsFree => {
                    self.create_djs(info, &mut w.array1, &mut w.array2);
                    if w.array1[seq] > L::F::zero() {-f1} else {f1}
                },
            };

            self.pivot_column(seq, &mut w.row_array, &mut w.column);
            info.set_sequence_in(Some(seq));

            let outcome = self.primal_row_quadratic(&w.row_array, &mut w.rhs_array,
                &mut w.spare, &mut w.spare2, info, CleanupMode::Restore, dir);
            let step = match outcome {
                RatioOutcome::Pivot(step) if step.row.is_some() => step,
                _ => return Ok(false),
            };
            left = self.quadratic_pivot(info, seq, dir, &step, &w.row_array)?;
            log::trace!("restore: in {} out {:?} theta {:.2e}", seq, left, step.theta);
        }

        Ok(false)
    }

    /// Degenerate pivot replacing the member at a bound of a pair basic together.
    ///
    /// Pairs are tried from the lowest sequence up; one without an entering column is skipped.
    fn remove_implied_pair(&mut self, info: &mut QuadraticInfo<'_, L>, w: &mut Workspace<L::F>) -> Result<bool, SolverError>
    {
        let n_total = self.n_col + self.n_row;

        for seq in 0.. n_total {
            let p = info.partner(seq);
            if seq > p || !info.implied_sj()[seq] {
                continue;
            }
            let out = if self.at_bound(seq) {
                seq
            }
            else if self.at_bound(p) {
                p
            }
            else {
                continue;
            };
            let r = match info.basic_row()[out] {
                Some(r) => r,
                None => continue,
            };

            let seq_in = match self.implied_pair_entering(info, r, &mut w.column) {
                Some(seq_in) => seq_in,
                None => {
                    log::debug!("pair of {} stays basic", out);
                    continue;
                },
            };

            let x = self.solution[out];
            let step = Step {
                row: Some(r),
                theta: L::F::zero(),
                to_upper: (x - self.upper[out]).abs() < (x - self.lower[out]).abs(),
            };
            self.pivot_column(seq_in, &mut w.row_array, &mut w.column);
            self.quadratic_pivot(info, seq_in, L::F::one(), &step, &w.row_array)?;
            log::debug!("pair of {}: replaced by {}", out, seq_in);
            return Ok(true);
        }

        Ok(false)
    }

    /// Nonbasic sequence with a nonbasic partner and the largest pivot in basis row `r`.
    fn implied_pair_entering(&self, info: &QuadraticInfo<'_, L>, r: usize, column: &mut [L::F]) -> Option<usize>
    {
        let n = self.n_col;
        let n_total = self.n_col + self.n_row;
        let piv = self.par.pivot_tolerance;

        // row r of the basis inverse
        for v in column.iter_mut() {
            *v = L::F::zero();
        }
        column[r] = L::F::one();
        self.factorization.btran(column);

        let mut best: Option<(usize, L::F)> = None;
        for seq in 0.. n_total {
            if self.status[seq] == Status::Basic || info.basic_row()[info.partner(seq)].is_some() {
                continue;
            }
            let alpha = if seq < n {
                let (rows, vals) = self.matrix.col(seq);
                rows.iter().zip(vals).fold(L::F::zero(), |s, (i, a)| s + column[*i] * *a)
            }
            else {
                -column[seq - n]
            };
            if alpha.abs() > piv && best.map_or(true, |(_, b)| alpha.abs() > b) {
                best = Some((seq, alpha.abs()));
            }
        }
        best.map(|(seq, _)| seq)
    }

    /// Returns to the valid snapshot one phase lower.
    ///
    /// The pricing weight of `offending` is halved so that it is less likely chosen again.
    fn rollback(&mut self, info: &mut QuadraticInfo<'_, L>, offending: Option<usize>,
        last_cleaned: &mut usize, progress: &mut SimplexProgress<L::F>) -> Result<(), SolverError>
    {
        let f2 = L::F::one() + L::F::one();

        info.num_rollbacks += 1;
        if info.num_rollbacks > self.par.max_rollbacks {
            log::warn!("{} rollbacks without progress", info.num_rollbacks - 1);
            return Err(SolverError::Infeasible);
        }

        if let Some(seq) = offending {
            let wt = &mut info.dj_weight_mut()[seq];
            *wt = *wt / f2;
        }

        info.restore_status();
        self.status_of_problem_in_primal(last_cleaned, ProblemCheck::Restore, progress, info)?;

        let phase = info.current_phase().demoted();
        info.change_phase(phase, true);
        info.set_crucial_sj(None);
        info.set_sequence_in(None);
        log::debug!("rollback {} to {:?}", info.num_rollbacks, phase);
        Ok(())
    }

    fn at_bound(&self, seq: usize) -> bool
    {
        let x = self.solution[seq];
        let tol = self.par.primal_tolerance;

        (x - self.lower[seq]).abs() <= tol || (x - self.upper[seq]).abs() <= tol
    }

    fn bound_distance(&self, seq: usize, x: L::F) -> L::F
    {
        let mut d = L::F::infinity();
        if self.lower[seq].is_finite() {
            d = d.min((x - self.lower[seq]).abs());
        }
        if self.upper[seq].is_finite() {
            d = d.min((x - self.upper[seq]).abs());
        }
        d
    }

    fn phase_cost_of(&self, seq: usize, x: L::F) -> L::F
    {
        let tol = self.par.primal_tolerance;

        if x < self.lower[seq] - tol {
            -L::F::one()
        }
        else if x > self.upper[seq] + tol {
            L::F::one()
        }
        else {
            L::F::zero()
        }
    }
}

//

#[cfg(test)]
fn test_model(row_lower: f64) -> Simplex<crate::FloatGeneric<f64>>
{
    use crate::PackedMatrix;

    // x0 >= 0, x0 >= row_lower
    let a = PackedMatrix::from_triplets(1, 1, &[(0, 0, 1.)]).unwrap();
    let mut s = Simplex::new();
    s.load_problem(a, &[0.], &[f64::INFINITY], &[0.], &[row_lower], &[f64::INFINITY]).unwrap();
    s
}

#[test]
fn test_quadratic_primal1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    // minimize x0^2 + x0 s.t. x0 >= 2
    let obj = QuadraticObjective::<L>::from_sym_pack(&[1.], &[2.]).unwrap();
    let s = test_model(2.);
    let mut info = QuadraticInfo::new(&obj);
    let mut quad = s.make_quadratic(&mut info).unwrap().unwrap();
    let mut w = Workspace::new(quad.num_rows(), quad.num_cols() + quad.num_rows());

    // x0, pi0, r0, s0 from the all-logical basis
    assert_eq!(quad.check_complementarity(&mut info, &mut w.array1, &mut w.array2), 0);

    // pi0 up: s0 blocks, but r0 is infeasible off its bound
    info.set_sequence_in(Some(1));
    quad.pivot_column(1, &mut w.row_array, &mut w.column);
    let outcome = quad.primal_row_quadratic(&w.row_array, &mut w.rhs_array,
        &mut w.spare, &mut w.spare2, &info, CleanupMode::None, 1.);
    assert_eq!(outcome, RatioOutcome::LosingComplementarity(Step {row: Some(1), theta: 1., to_upper: false}));

    // x0 up: r0 blocks at 2 while s0 grows
    info.set_sequence_in(Some(0));
    quad.pivot_column(0, &mut w.row_array, &mut w.column);
    let outcome = quad.primal_row_quadratic(&w.row_array, &mut w.rhs_array,
        &mut w.spare, &mut w.spare2, &info, CleanupMode::Cleanup, 1.);
    let step = match outcome {
        RatioOutcome::LosingComplementarity(step) => step,
        _ => panic!("{:?}", outcome),
    };
    assert_eq!(step.row, Some(0));
    assert_float_eq!(step.theta, 2., abs <= 1e-12);
    assert_float_eq!(w.spare2.get(1), 4., abs <= 1e-12);
    assert_float_eq!(w.rhs_array.get(0), 1., abs <= 1e-12);

    let out = quad.quadratic_pivot(&mut info, 0, 1., &step, &w.row_array).unwrap();
    assert_eq!(out, Some(2));
    assert_float_eq!(info.gradient(), [4.].as_ref(), abs_all <= 1e-12);
    assert!(info.implied_sj()[0] && info.implied_sj()[3]);
    assert_eq!(quad.check_complementarity(&mut info, &mut w.array1, &mut w.array2), 1);
    assert_float_eq!(w.array2[0], 2., abs <= 1e-12);
}

#[test]
fn test_quadratic_primal2()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    // minimize x0^2 + x0 s.t. x0 >= 2
    let obj = QuadraticObjective::<L>::from_sym_pack(&[1.], &[2.]).unwrap();
    let s = test_model(2.);
    let mut info = QuadraticInfo::new(&obj);
    let mut quad = s.make_quadratic(&mut info).unwrap().unwrap();

    quad.primal_quadratic2(&mut info, Phase::Basic).unwrap();
    assert!(quad.is_optimal());
    assert_float_eq!(quad.col_solution(), [2., 5.].as_ref(), abs_all <= 1e-9);
    // s0 = Q x - pi at its lower bound -c
    assert_eq!(quad.statuses()[3], Status::AtLower);
    assert_float_eq!(quad.row_activity()[1], -1., abs <= 1e-9);

    let mut w = Workspace::new(quad.num_rows(), quad.num_cols() + quad.num_rows());
    assert_eq!(quad.check_complementarity(&mut info, &mut w.array1, &mut w.array2), 0);
    assert_eq!(info.current_phase(), Phase::Basic);
}

#[test]
fn test_quadratic_primal3()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    // minimize x0^2 + x0 s.t. x0 >= 2, on the original model
    let obj = QuadraticObjective::<L>::from_sym_pack(&[1.], &[2.]).unwrap();
    let mut s = test_model(2.);

    s.primal_quadratic(&obj, Phase::Basic).unwrap();
    assert!(s.is_optimal());
    assert_float_eq!(s.col_solution(), [2.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.row_dual(), [5.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.reduced_cost(), [0.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), 6., abs <= 1e-9);
    assert_eq!(s.cost(), &[1.]);

    // x0 >= 2 and x0 <= 1
    let a = crate::PackedMatrix::from_triplets(2, 1, &[(0, 0, 1.), (1, 0, 1.)]).unwrap();
    let mut s = Simplex::<L>::new();
    let inf = f64::INFINITY;
    s.load_problem(a, &[0.], &[inf], &[0.], &[2., -inf], &[inf, 1.]).unwrap();
    let obj = QuadraticObjective::<L>::from_sym_pack(&[0.], &[1.]).unwrap();
    assert_eq!(s.primal_quadratic(&obj, Phase::Basic), Err(SolverError::Infeasible));
    assert!(!s.is_optimal());

    let obj = QuadraticObjective::<L>::from_sym_pack(&[0., 0.], &[1., 0., 1.]).unwrap();
    assert_eq!(s.primal_quadratic(&obj, Phase::Basic), Err(SolverError::InvalidOp));
}

#[test]
fn test_quadratic_primal4()
{
    use crate::{FloatGeneric, PackedMatrix};

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    // minimize x0^2 / 2 s.t. x0 >= 2 and x0 <= 1, without iteration limit
    let a = PackedMatrix::from_triplets(2, 1, &[(0, 0, 1.), (1, 0, 1.)]).unwrap();
    let mut s = Simplex::<L>::new().par(|p| p.max_iter = None);
    let inf = f64::INFINITY;
    s.load_problem(a, &[0.], &[inf], &[0.], &[2., -inf], &[inf, 1.]).unwrap();
    let obj = QuadraticObjective::<L>::from_sym_pack(&[0.], &[1.]).unwrap();

    assert_eq!(s.primal_quadratic(&obj, Phase::Basic), Err(SolverError::Infeasible));
    assert!(s.num_iterations() < 1000, "{} pivots", s.num_iterations());
}

#[test]
fn test_quadratic_primal5()
{
    use crate::{FloatGeneric, PackedMatrix};

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    // minimize (x0^2 + x1^2) / 2 s.t. 100 x0 >= 0, x1 >= 0
    let a = PackedMatrix::from_triplets(2, 2, &[(0, 0, 100.), (1, 1, 1.)]).unwrap();
    let mut s = Simplex::<L>::new();
    let inf = f64::INFINITY;
    s.load_problem(a, &[0., 0.], &[inf, inf], &[0., 0.], &[0., 0.], &[inf, inf]).unwrap();
    let obj = QuadraticObjective::<L>::from_sym_pack(&[0., 0.], &[1., 0., 1.]).unwrap();
    let mut info = QuadraticInfo::new(&obj);
    let mut quad = s.make_quadratic(&mut info).unwrap().unwrap();

    // x0, x1, s0, s1 basic at zero: both (x0, s0) and (x1, s1) basic together
    quad.status[0] = Status::Basic;
    quad.status[1] = Status::Basic;
    quad.status[4] = Status::AtLower;
    quad.status[5] = Status::AtLower;
    quad.pivot_variable.copy_from_slice(&[0, 1, 6, 7]);
    quad.factorize().unwrap();
    quad.compute_primals();
    info.update_basic_row(&quad.pivot_variable);
    assert!(info.implied_sj()[0] && info.implied_sj()[1]);

    // row of x0 pivots only on r0 by 0.01
    quad.par.pivot_tolerance = 0.1;
    let mut w = Workspace::new(quad.num_rows(), quad.num_cols() + quad.num_rows());

    assert!(quad.remove_implied_pair(&mut info, &mut w).unwrap());
    assert_eq!(quad.statuses()[0], Status::Basic);
    assert_eq!(quad.statuses()[1], Status::AtLower);
    assert_eq!(quad.statuses()[5], Status::Basic);
    assert_eq!(info.basic_row()[5], Some(1));
    assert!(info.implied_sj()[0] && !info.implied_sj()[1]);

    assert!(!quad.remove_implied_pair(&mut info, &mut w).unwrap());
}

#[test]
fn test_quadratic_rollback()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    // minimize x0^2 + x0 s.t. x0 >= 2
    let obj = QuadraticObjective::<L>::from_sym_pack(&[1.], &[2.]).unwrap();
    let s = test_model(2.);
    let mut info = QuadraticInfo::new(&obj);
    let mut quad = s.make_quadratic(&mut info).unwrap().unwrap();
    let mut w = Workspace::new(quad.num_rows(), quad.num_cols() + quad.num_rows());
    let mut progress = SimplexProgress::new(quad.par.zero_tolerance);
    let mut last_cleaned = 0;

    let check_buffers = (info.check_distance.as_ptr(), info.check_violation.as_ptr());

    info.set_current_phase(Phase::Complementary);
    quad.status_of_problem_in_primal(&mut last_cleaned, ProblemCheck::Initial, &mut progress, &mut info).unwrap();
    assert_eq!(info.valid_phase(), Phase::Complementary);
    let valid = info.valid_solution().to_vec();

    // x0 up to 2, breaking (x0, s0)
    info.set_sequence_in(Some(0));
    quad.pivot_column(0, &mut w.row_array, &mut w.column);
    let outcome = quad.primal_row_quadratic(&w.row_array, &mut w.rhs_array,
        &mut w.spare, &mut w.spare2, &info, CleanupMode::Cleanup, 1.);
    let step = match outcome {
        RatioOutcome::LosingComplementarity(step) => step,
        _ => panic!("{:?}", outcome),
    };
    quad.quadratic_pivot(&mut info, 0, 1., &step, &w.row_array).unwrap();
    info.set_crucial_sj(Some(3));
    assert_float_eq!(quad.col_solution()[0], 2., abs <= 1e-12);

    quad.rollback(&mut info, Some(0), &mut last_cleaned, &mut progress).unwrap();
    assert_eq!(info.current_solution(), info.valid_solution());
    assert_eq!(info.current_phase(), info.valid_phase().demoted());
    assert_eq!(info.current_phase(), Phase::Normal);
    assert_eq!(info.crucial_sj(), None);
    assert_eq!(info.dj_weight()[0], 0.5);
    assert_eq!(info.num_rollbacks, 1);
    assert_eq!(info.phase_trace, vec![(Phase::Normal, true)]);

    // the model is back at the snapshot
    assert_float_eq!(quad.col_solution(), &valid[.. 2], abs_all <= 1e-12);
    assert_eq!(quad.statuses()[0], Status::AtLower);
    assert_eq!(info.basic_row()[0], None);

    // checks reuse the buffers sized by make_quadratic
    assert_eq!((info.check_distance.as_ptr(), info.check_violation.as_ptr()), check_buffers);
    assert_eq!(info.check_distance.len(), quad.num_cols() + quad.num_rows());

    // rollbacks are bounded
    quad.par.max_rollbacks = 1;
    assert_eq!(quad.rollback(&mut info, None, &mut last_cleaned, &mut progress), Err(SolverError::Infeasible));
}

#[test]
fn test_quadratic_phases()
{
    use crate::{FloatGeneric, PackedMatrix};

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    fn check_trace(trace: &[(Phase, bool)], start: Phase) -> Phase
    {
        let mut phase = start;
        for &(next, rollback) in trace {
            assert!(rollback || phase != Phase::Basic || next == Phase::Basic,
                "{:?} -> {:?} without rollback", phase, next);
            phase = next;
        }
        phase
    }

    // minimize x0^2 + x0 s.t. x0 >= 2
    let obj = QuadraticObjective::<L>::from_sym_pack(&[1.], &[2.]).unwrap();
    let s = test_model(2.);
    let mut info = QuadraticInfo::new(&obj);
    let mut quad = s.make_quadratic(&mut info).unwrap().unwrap();

    quad.primal_quadratic2(&mut info, Phase::Complementary).unwrap();
    assert!(!info.phase_trace.is_empty());
    assert_eq!(check_trace(&info.phase_trace, Phase::Complementary), Phase::Basic);
    assert_eq!(info.current_phase(), Phase::Basic);

    // minimize x0^2 / 2 s.t. x0 >= 2 and x0 <= 1
    let a = PackedMatrix::from_triplets(2, 1, &[(0, 0, 1.), (1, 0, 1.)]).unwrap();
    let mut s = Simplex::<L>::new().par(|p| p.max_iter = None);
    let inf = f64::INFINITY;
    s.load_problem(a, &[0.], &[inf], &[0.], &[2., -inf], &[inf, 1.]).unwrap();
    let obj = QuadraticObjective::<L>::from_sym_pack(&[0.], &[1.]).unwrap();
    let mut info = QuadraticInfo::new(&obj);
    let mut quad = s.make_quadratic(&mut info).unwrap().unwrap();

    assert_eq!(quad.primal_quadratic2(&mut info, Phase::Complementary), Err(SolverError::Infeasible));
    check_trace(&info.phase_trace, Phase::Complementary);
    assert!(!quad.is_optimal());
}
