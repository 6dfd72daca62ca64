//! Successive linear programming

use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, Zero, One};
use core::fmt::{Debug, LowerExp};
use crate::solver::{LinAlg, SolverError};
use crate::{Simplex, Status};
use super::QuadraticObjective;

//

/// Termination of [`Simplex::primal_slp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlpStatus
{
    /// The last step moved less than the tolerance.
    Converged,
    /// The number of passes ran out first.
    PassLimit,
}

impl<L: LinAlg> Simplex<L>
where L::F: Float + Debug + LowerExp
{
    /// Solves the quadratic program of `objective` by successive linear programming.
    ///
    /// Each pass solves the linear program of the gradient \\(c + Qx\\) at the current point \\(x\\),
    /// then moves along the direction \\(d\\) to the linear solution by the step
    /// minimizing the objective on \\([0, 1]\\).
    /// An unbounded pass is solved again inside a box around \\(x\\),
    /// doubled after a full step and halved otherwise.
    ///
    /// Returns [`SlpStatus::Converged`] once a step moves less than `delta_tolerance` in max-norm,
    /// or [`SlpStatus::PassLimit`] after `number_passes`.
    /// The cost of the model ends as the linear term of `objective`.
    pub fn primal_slp(&mut self, objective: &QuadraticObjective<L>, number_passes: usize, delta_tolerance: L::F) -> Result<SlpStatus, SolverError>
    {
        let n = self.n_col;
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let f2 = f1 + f1;

        if objective.num_cols() != n {
            log::error!("Size mismatch: objective {}, model {}", objective.num_cols(), n);
            return Err(SolverError::InvalidOp);
        }

        log::info!("----- Started");
        let c = objective.linear();
        let col_lower = self.lower[.. n].to_vec();
        let col_upper = self.upper[.. n].to_vec();

        // feasible start
        self.set_cost(&vec![f0; n]);
        if let Err(e) = self.primal() {
            self.set_cost(c);
            return Err(e);
        }

        let mut x = self.col_solution().to_vec();
        let mut cost = vec![f0; n];
        let mut d = vec![f0; n];
        let mut radius = f1;
        let mut ret = SlpStatus::PassLimit;

        for pass in 0.. number_passes {
            objective.gradient(&x, &mut cost);
            L::add(f1, c, &mut cost);
            self.set_cost(&cost);

            let (solved, boxed) = match self.primal() {
                Err(SolverError::Unbounded) => {
                    for j in 0.. n {
                        self.set_col_bounds(j, col_lower[j].max(x[j] - radius), col_upper[j].min(x[j] + radius));
                    }
                    log::debug!("{}: unbounded, box radius {:.2e}", pass, radius);
                    (self.primal(), true)
                },
                solved => (solved, false),
            };
            for (j, dj) in d.iter_mut().enumerate() {
                *dj = self.solution[j] - x[j];
            }
            if boxed {
                for j in 0.. n {
                    self.set_col_bounds(j, col_lower[j], col_upper[j]);
                }
            }
            if let Err(e) = solved {
                self.set_cost(c);
                return Err(e);
            }

            let slope = L::inner_prod(&cost, &d);
            let curv = objective.curvature(&d);
            let t = if slope >= -self.par.zero_tolerance {
                f0
            }
            else if curv <= self.par.zero_tolerance {
                f1
            }
            else {
                (-slope / curv).min(f1)
            };

            L::add(t, &d, &mut x);
            let moved = t * L::norm_inf(&d);
            log::debug!("{}: slope {:.2e} step {:.2e} moved {:.2e}", pass, slope, t, moved);

            if boxed {
                radius = if t >= f1 {radius * f2} else {radius / f2};
            }
            if moved < delta_tolerance {
                ret = SlpStatus::Converged;
                break;
            }
        }

        self.set_cost(c);
        self.set_solution_from(&x);
        self.objective_value = objective.value(&x);
        self.finished = ret == SlpStatus::Converged;

        match ret {
            SlpStatus::Converged => log::info!("----- Converged"),
            SlpStatus::PassLimit => log::warn!("----- PassLimit"),
        }
        Ok(ret)
    }

    /// Sets column values and row activities, and marks off-bound sequences basic.
    fn set_solution_from(&mut self, x: &[L::F])
    {
        let (n, m) = (self.n_col, self.n_row);
        let tol = self.par.primal_tolerance;

        let mut activity: Vec<L::F> = vec![L::F::zero(); m];
        self.matrix.times(L::F::one(), x, L::F::zero(), &mut activity);
        self.solution[.. n].copy_from_slice(x);
        self.solution[n..].copy_from_slice(&activity);

        for seq in 0.. n + m {
            let v = self.solution[seq];
            self.status[seq] = if (v - self.lower[seq]).abs() <= tol {
                Status::AtLower
            }
            else if (v - self.upper[seq]).abs() <= tol {
                Status::AtUpper
            }
            else {
                Status::Basic
            };
        }
    }
}

//

#[test]
fn test_slp1()
{
    use float_eq::assert_float_eq;
    use crate::{FloatGeneric, PackedMatrix};

    type L = FloatGeneric<f64>;

    let _ = env_logger::builder().is_test(true).try_init();

    let inf = f64::INFINITY;

    // minimize x0^2 + 6 x0 s.t. x0 <= 10, x0 free
    let obj = QuadraticObjective::<L>::from_sym_pack(&[6.], &[2.]).unwrap();
    let a = PackedMatrix::from_triplets(1, 1, &[(0, 0, 1.)]).unwrap();
    let mut s = Simplex::<L>::new();
    s.load_problem(a, &[-inf], &[inf], &[0.], &[-inf], &[10.]).unwrap();

    // unbounded passes go through boxes of radius 1, then 2
    assert_eq!(s.primal_slp(&obj, 10, 1e-9), Ok(SlpStatus::Converged));
    assert!(s.is_optimal());
    assert_float_eq!(s.col_solution(), [-3.].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(s.row_activity(), [-3.].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(s.objective_value(), -9., abs <= 1e-12);
    assert_eq!(s.cost(), &[6.]);
    assert_eq!((s.lower()[0], s.upper()[0]), (-inf, inf));
}
