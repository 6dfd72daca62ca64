use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, Zero, One};
use core::fmt::{Debug, LowerExp};
use crate::solver::{LinAlg, SolverError};
use crate::{PackedMatrix, Simplex, Status};
use super::QuadraticInfo;
use super::info::ExtraRow;

//

impl<L: LinAlg> Simplex<L>
where L::F: Float + Debug + LowerExp
{
    /// Builds the enlarged model of the KKT conditions.
    ///
    /// Bounds are first made one-sided: a boxed column keeps its lower bound and
    /// a ranged row its `>=` side, each other side becoming an extra row.
    /// With `mx` primal rows so obtained, the enlarged model has the columns `x` and
    /// one multiplier `pi_i` per primal row, and the rows
    /// * the primal rows, whose logicals `r_i` pair with `pi_i`,
    /// * one stationarity row \\(\\sum_k Q_{jk} x_k - \\sum_i a_{ij} \\pi_i\\) per column,
    ///   whose logical `s_j` pairs with `x_j` and gives the reduced cost \\(d_j = s_j + c_j\\).
    ///
    /// The sign conditions of the KKT system are carried by the bounds of `pi` and `s`.
    ///
    /// Returns `Ok(None)` if the objective has no quadratic term,
    /// otherwise a new model at its all-logical basis with `info` sized for it.
    /// `self` is not modified.
    pub fn make_quadratic(&self, info: &mut QuadraticInfo<'_, L>) -> Result<Option<Simplex<L>>, SolverError>
    {
        let (n, m) = (self.n_col, self.n_row);
        let objective = info.original_objective();
        let f0 = L::F::zero();
        let inf = L::F::infinity();

        if objective.num_cols() != n {
            log::error!("Size mismatch: objective {}, model {}", objective.num_cols(), n);
            return Err(SolverError::InvalidOp);
        }
        if !objective.has_quadratic() {
            return Ok(None);
        }
        let c = objective.linear();

        // one-sided bounds
        let col_lower = self.lower[.. n].to_vec();
        let mut col_upper = self.upper[.. n].to_vec();
        let mut row_lower = self.lower[n..].to_vec();
        let mut row_upper = self.upper[n..].to_vec();
        let mut extra_rows = Vec::new();

        for j in 0.. n {
            let (lo, up) = (col_lower[j], col_upper[j]);
            if lo.is_finite() && up.is_finite() && lo < up {
                col_upper[j] = inf;
                extra_rows.push(ExtraRow::ColumnUpper(j));
                row_lower.push(-inf);
                row_upper.push(up);
            }
        }
        for i in 0.. m {
            let (lo, up) = (row_lower[i], row_upper[i]);
            if lo.is_finite() && up.is_finite() && lo < up {
                row_upper[i] = inf;
                extra_rows.push(ExtraRow::RowUpper(i));
                row_lower.push(-inf);
                row_upper.push(up);
            }
        }
        let mx = m + extra_rows.len();

        // normalized A, mx by n
        let mut row_copy = vec![None; m];
        for (e, extra) in extra_rows.iter().enumerate() {
            if let ExtraRow::RowUpper(i) = extra {
                row_copy[*i] = Some(m + e);
            }
        }
        let mut a_triplets = Vec::with_capacity(self.matrix.num_elements() + extra_rows.len());
        for j in 0.. n {
            let (rows, vals) = self.matrix.col(j);
            for (r, v) in rows.iter().zip(vals) {
                a_triplets.push((*r, j, *v));
                if let Some(e) = row_copy[*r] {
                    a_triplets.push((e, j, *v));
                }
            }
        }
        for (e, extra) in extra_rows.iter().enumerate() {
            if let ExtraRow::ColumnUpper(j) = extra {
                a_triplets.push((m + e, *j, L::F::one()));
            }
        }

        // enlarged matrix, (mx + n) by (n + mx)
        let mut triplets = Vec::with_capacity(a_triplets.len() * 2 + info.quadratic_objective().num_elements());
        for &(i, j, v) in a_triplets.iter() {
            triplets.push((i, j, v));
            triplets.push((mx + j, n + i, -v));
        }
        for k in 0.. n {
            let (rows, vals) = info.quadratic_objective().col(k);
            for (j, q) in rows.iter().zip(vals) {
                triplets.push((mx + *j, k, *q));
            }
        }
        let matrix = match PackedMatrix::from_triplets(mx + n, n + mx, &triplets) {
            Some(matrix) => matrix,
            None => {
                log::error!("Enlarged matrix out of range");
                return Err(SolverError::InvalidOp);
            },
        };

        let mut e_col_lower = col_lower.clone();
        let mut e_col_upper = col_upper.clone();
        for i in 0.. mx {
            let (lo, up) = match (row_lower[i].is_finite(), row_upper[i].is_finite()) {
                (true, false) => (f0, inf),
                (false, true) => (-inf, f0),
                (true, true) => (-inf, inf),
                (false, false) => (f0, f0),
            };
            e_col_lower.push(lo);
            e_col_upper.push(up);
        }

        let mut e_row_lower = row_lower;
        let mut e_row_upper = row_upper;
        for j in 0.. n {
            let (lo, up) = match (col_lower[j].is_finite(), col_upper[j].is_finite()) {
                (true, false) => (-c[j], inf),
                (false, true) => (-inf, -c[j]),
                (false, false) => (-c[j], -c[j]),
                (true, true) => (-inf, inf),
            };
            e_row_lower.push(lo);
            e_row_upper.push(up);
        }

        let par = self.par.clone();
        let mut quad = Simplex::new().par(|p| *p = par);
        quad.load_problem(matrix,
            &e_col_lower, &e_col_upper, &vec![f0; n + mx],
            &e_row_lower, &e_row_upper)?;

        info.set_dimensions(m, mx, (mx - m) + n);
        info.extra_rows = extra_rows;
        info.set_infeas_cost(self.par.infeasibility_cost);
        info.create_gradient(&quad);
        info.update_basic_row(&quad.pivot_variable);
        info.set_current_solution(&quad.solution, &quad.status, &quad.pivot_variable);
        info.save_status();

        log::debug!("enlarged: {} columns, {} rows ({} extra)", n + mx, mx + n, mx - m);
        Ok(Some(quad))
    }

    /// Maps a solved enlarged model back.
    ///
    /// Copies `x` and its statuses, recomputes row activities, sets row duals
    /// \\(\\pi\\) and reduced costs \\(d\\), and the objective value \\(c^T x + \\frac12 x^T Q x\\).
    /// Statuses are kept as found, so more columns than rows may be basic;
    /// a later [`Simplex::primal`] starts from a basis rebuilt out of them.
    ///
    /// Returns `Err` with [`SolverError::NotFinished`] if the enlarged model is not optimal.
    pub fn end_quadratic(&mut self, quadratic_model: Simplex<L>, info: &QuadraticInfo<'_, L>) -> Result<(), SolverError>
    {
        if !quadratic_model.finished {
            log::error!("Enlarged model is not finished");
            return Err(SolverError::NotFinished);
        }

        let (n, m) = (self.n_col, self.n_row);
        let mx = info.number_quadratic_columns();
        let ne = n + mx;
        let q = &quadratic_model;
        let c = info.linear_objective();

        for j in 0.. n {
            self.solution[j] = q.solution[j];
            self.status[j] = q.status[j];
        }
        for i in 0.. m {
            self.status[n + i] = q.status[ne + i];
            self.dual[i] = q.solution[n + i];
        }

        for (e, extra) in info.extra_rows.iter().enumerate() {
            let upper_active = q.status[ne + m + e] != Status::Basic;
            match extra {
                ExtraRow::ColumnUpper(j) => {
                    if upper_active {
                        self.status[*j] = Status::AtUpper;
                    }
                },
                ExtraRow::RowUpper(i) => {
                    if upper_active && self.status[n + i] == Status::Basic {
                        self.status[n + i] = Status::AtUpper;
                    }
                    self.dual[*i] = self.dual[*i] + q.solution[n + m + e];
                },
            }
        }

        for j in 0.. n {
            self.dj[j] = q.solution[ne + mx + j] + c[j];
        }
        for i in 0.. m {
            self.dj[n + i] = self.dual[i];
        }

        let mut activity = vec![L::F::zero(); m];
        self.matrix.times(L::F::one(), &self.solution[.. n], L::F::zero(), &mut activity);
        self.solution[n..].copy_from_slice(&activity);

        self.objective_value = info.original_objective().value(&self.solution[.. n]);
        self.finished = true;
        Ok(())
    }
}

//

#[test]
fn test_enlarge1()
{
    use crate::FloatGeneric;
    use crate::quadratic::QuadraticObjective;

    type L = FloatGeneric<f64>;

    let inf = f64::INFINITY;

    // 0 <= x0 <= 4, x1 free, 1 <= x0 + x1 <= 3
    let a = PackedMatrix::from_triplets(1, 2, &[(0, 0, 1.), (0, 1, 1.)]).unwrap();
    let mut s = Simplex::<L>::new();
    s.load_problem(a, &[0., -inf], &[4., inf], &[0., 0.], &[1.], &[3.]).unwrap();

    let obj = QuadraticObjective::<L>::from_sym_pack(&[-1., 2.], &[2., 0., 1.]).unwrap();
    let mut info = QuadraticInfo::new(&obj);
    let quad = s.make_quadratic(&mut info).unwrap().unwrap();

    // two extra rows: x0 <= 4, x0 + x1 <= 3
    assert_eq!(info.number_x_rows(), 1);
    assert_eq!(info.number_quadratic_columns(), 3);
    assert_eq!(info.number_quadratic_rows(), 2 + 2);
    assert_eq!(quad.num_cols(), 2 + 3);
    assert_eq!(quad.num_rows(), 3 + 2);

    // stationarity of x0: 2 x0 - pi0 - pi1 - pi2
    assert_eq!(quad.matrix().get(3, 0), 2.);
    assert_eq!(quad.matrix().get(3, 2), -1.);
    assert_eq!(quad.matrix().get(3, 3), -1.);
    assert_eq!(quad.matrix().get(3, 4), -1.);
    assert_eq!(quad.matrix().get(4, 4), -1.);
    assert_eq!(quad.matrix().get(4, 3), 0.);

    // x0 lower-only, x1 free
    assert_eq!((quad.lower()[5 + 3], quad.upper()[5 + 3]), (1., inf));
    assert_eq!((quad.lower()[5 + 4], quad.upper()[5 + 4]), (-2., -2.));
    // pi0 >= 0 for the >= row, pi1 and pi2 <= 0 for the extra rows
    assert_eq!((quad.lower()[2], quad.upper()[2]), (0., inf));
    assert_eq!((quad.lower()[3], quad.upper()[3]), (-inf, 0.));
    assert_eq!((quad.lower()[4], quad.upper()[4]), (-inf, 0.));

    assert_eq!(info.current_solution(), info.valid_solution());

    // the original model is untouched and an unsolved enlarged model is rejected
    assert_eq!(s.num_cols(), 2);
    assert_eq!(s.end_quadratic(quad, &info), Err(SolverError::NotFinished));

    let lin = QuadraticObjective::<L>::from_sym_pack(&[1., 1.], &[0., 0., 0.]).unwrap();
    let mut info = QuadraticInfo::new(&lin);
    assert!(s.make_quadratic(&mut info).unwrap().is_none());
}
