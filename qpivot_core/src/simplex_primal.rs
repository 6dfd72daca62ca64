//! Two-phase primal simplex

use alloc::vec;
use num_traits::{Float, Zero};
use core::fmt::{Debug, LowerExp};
use crate::solver::{LinAlg, SolverError};
use crate::{IndexedVector, Simplex, SimplexProgress};

//

impl<L: LinAlg> Simplex<L>
where L::F: Float + Debug + LowerExp
{
    /// Solves the loaded linear program from the current basis.
    ///
    /// Phase one minimizes the sum of bound violations, phase two the cost \\(c^T x\\).
    /// Pricing is Dantzig's rule, switching to Bland's rule while looping is detected.
    ///
    /// Returns `Ok` when optimal, or `Err` with [`SolverError::Infeasible`],
    /// [`SolverError::Unbounded`], [`SolverError::ExcessIter`] or [`SolverError::Singular`].
    pub fn primal(&mut self) -> Result<(), SolverError>
    {
        let (n, m) = (self.n_col, self.n_row);

        log::info!("----- Started");
        self.finished = false;
        self.sync_basis();
        self.factorize()?;
        self.compute_primals();

        let mut progress = SimplexProgress::new(self.par.zero_tolerance);
        let mut cost = vec![L::F::zero(); n + m];
        let mut alpha = IndexedVector::new(m);
        let mut column = vec![L::F::zero(); m];

        let mut i = 0;
        loop {
            let excess_iter = if let Some(max_iter) = self.par.max_iter {
                i + 1 >= max_iter
            } else {
                false
            };

            let log_trig = if self.par.log_period > 0 {
                i % self.par.log_period == 0
            }
            else {
                if i == 0 && log::log_enabled!(log::Level::Debug) {
                    log::warn!("log_period == 0: no periodic log");
                }
                false
            };

            let (infeas, n_infeas) = self.sum_infeasibility();
            let phase_one = n_infeas > 0;
            if phase_one {
                self.phase_costs(&mut cost);
            }
            else {
                cost[.. n].copy_from_slice(&self.cost);
                for c in cost[n..].iter_mut() {
                    *c = L::F::zero();
                }
            }
            self.compute_duals(&cost);
            let obj = L::inner_prod(&cost, &self.solution);

            if log_trig {
                log::debug!("{}: obj_infeas {:.2e} {:.2e} ({})", i, obj, infeas, n_infeas);
            }
            else {
                log::trace!("{}: obj_infeas {:.2e} {:.2e} ({})", i, obj, infeas, n_infeas);
            }

            let bland = progress.looping();
            let entering = self.price(bland);

            let (seq_in, dir) = match entering {
                None => {
                    if phase_one {
                        log::warn!("----- Infeasible");
                        return Err(SolverError::Infeasible);
                    }
                    self.compute_objective();
                    self.finished = true;
                    log::info!("----- Optimal");
                    return Ok(());
                },
                Some(e) => e,
            };

            if excess_iter {
                log::warn!("----- ExcessIter");
                return Err(SolverError::ExcessIter);
            }

            self.unpack(seq_in, &mut alpha);
            column.copy_from_slice(alpha.dense());
            self.factorization.ftran(&mut column);
            alpha.set_dense(&column, self.par.zero_tolerance);

            let step = match self.ratio_test(&alpha, seq_in, dir) {
                Some(step) => step,
                None => {
                    if phase_one {
                        log::warn!("----- Infeasible");
                        return Err(SolverError::Infeasible);
                    }
                    log::warn!("----- Unbounded");
                    return Err(SolverError::Unbounded);
                },
            };

            let seq_out = self.pivot(seq_in, dir, &step, &alpha)?;
            log::trace!("{}: in {} out {:?} theta {:.2e}", i, seq_in, seq_out, step.theta);

            progress.record(obj, infeas, Some(seq_in), seq_out);
            i += 1;
        } // end of loop
    }

    /// Picks the entering variable from the current reduced costs.
    ///
    /// Returns the sequence and its moving direction.
    fn price(&self, bland: bool) -> Option<(usize, L::F)>
    {
        let mut best: Option<(usize, L::F, L::F)> = None;

        for (seq, &dj) in self.dj.iter().enumerate() {
            if let Some(dir) = self.attractive(seq, dj) {
                if bland {
                    return Some((seq, dir));
                }
                let score = dj.abs();
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((seq, dir, score));
                }
            }
        }

        best.map(|(seq, dir, _)| (seq, dir))
    }
}

//

#[test]
fn test_primal1()
{
    use float_eq::assert_float_eq;
    use crate::{FloatGeneric, PackedMatrix};

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    let inf = f64::INFINITY;

    // minimize -x0 - 2 x1 s.t. x0 + x1 <= 4, x0 + 3 x1 <= 6, 0 <= x0 <= 3, x1 >= 0
    let a = PackedMatrix::from_triplets(2, 2, &[
        (0, 0, 1.), (0, 1, 1.),
        (1, 0, 1.), (1, 1, 3.),
    ]).unwrap();
    let mut s = Simplex::<L>::new();
    s.load_problem(a, &[0., 0.], &[3., inf], &[-1., -2.], &[-inf, -inf], &[4., 6.]).unwrap();

    s.primal().unwrap();
    assert!(s.is_optimal());
    assert_float_eq!(s.col_solution(), [3., 1.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), -5., abs <= 1e-9);
    assert_float_eq!(s.row_activity(), [4., 6.].as_ref(), abs_all <= 1e-9);
}

#[test]
fn test_primal2()
{
    use crate::{FloatGeneric, PackedMatrix};

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    let inf = f64::INFINITY;

    // x0 >= 2 and x0 <= 1
    let a = PackedMatrix::from_triplets(2, 1, &[(0, 0, 1.), (1, 0, 1.)]).unwrap();
    let mut s = Simplex::<L>::new();
    s.load_problem(a, &[0.], &[inf], &[1.], &[2., -inf], &[inf, 1.]).unwrap();
    assert_eq!(s.primal(), Err(SolverError::Infeasible));

    // minimize -x0 s.t. x0 - x1 <= 1
    let a = PackedMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, -1.)]).unwrap();
    let mut s = Simplex::<L>::new();
    s.load_problem(a, &[0., 0.], &[inf, inf], &[-1., 0.], &[-inf], &[1.]).unwrap();
    assert_eq!(s.primal(), Err(SolverError::Unbounded));
}
