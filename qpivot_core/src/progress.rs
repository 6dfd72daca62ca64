//! Progress tracking

use num_traits::Float;

const PROGRESS_LEN: usize = 8;

/// Progress tracker
///
/// Remembers the last few pivots of a simplex run and the best values so far
/// to detect stalling and looping.
#[derive(Debug, Clone)]
pub struct SimplexProgress<F: Float>
{
    sequence_in: [Option<usize>; PROGRESS_LEN],
    sequence_out: [Option<usize>; PROGRESS_LEN],
    num_records: usize,
    num_bad: usize,
    best_objective: F,
    best_infeasibility: F,
    tolerance: F,
}

impl<F: Float> SimplexProgress<F>
{
    /// Creates an instance.
    ///
    /// * `tolerance` is the smallest change of objective or infeasibility counted as progress.
    pub fn new(tolerance: F) -> Self
    {
        SimplexProgress {
            sequence_in: [None; PROGRESS_LEN],
            sequence_out: [None; PROGRESS_LEN],
            num_records: 0,
            num_bad: 0,
            best_objective: F::infinity(),
            best_infeasibility: F::infinity(),
            tolerance,
        }
    }

    /// Forgets the history.
    pub fn reset(&mut self)
    {
        self.sequence_in = [None; PROGRESS_LEN];
        self.sequence_out = [None; PROGRESS_LEN];
        self.num_records = 0;
        self.num_bad = 0;
        self.best_objective = F::infinity();
        self.best_infeasibility = F::infinity();
    }

    /// Records a pivot.
    ///
    /// A pivot is progress if it beats the best infeasibility so far,
    /// or the best objective at that infeasibility.
    pub fn record(&mut self, objective: F, infeasibility: F, sequence_in: Option<usize>, sequence_out: Option<usize>)
    {
        let k = self.num_records % PROGRESS_LEN;

        if infeasibility < self.best_infeasibility - self.tolerance {
            self.best_infeasibility = infeasibility;
            self.best_objective = objective;
            self.num_bad = 0;
        }
        else if objective < self.best_objective - self.tolerance {
            self.best_objective = objective;
            self.num_bad = 0;
        }
        else {
            self.num_bad += 1;
        }

        self.sequence_in[k] = sequence_in;
        self.sequence_out[k] = sequence_out;
        self.num_records += 1;
    }

    /// Entering sequence of the latest pivot.
    pub fn last_sequence_in(&self) -> Option<usize>
    {
        if self.num_records == 0 {
            None
        }
        else {
            self.sequence_in[(self.num_records - 1) % PROGRESS_LEN]
        }
    }

    /// Number of recorded pivots.
    pub fn num_records(&self) -> usize
    {
        self.num_records
    }

    /// Number of consecutive pivots without progress.
    pub fn num_bad(&self) -> usize
    {
        self.num_bad
    }

    /// Looping test.
    ///
    /// Returns `true` if the latest pivot repeats an earlier remembered one
    /// while nothing improved since then.
    pub fn looping(&self) -> bool
    {
        if self.num_records < 2 || self.num_bad == 0 {
            return false;
        }

        let last = (self.num_records - 1) % PROGRESS_LEN;
        let depth = self.num_bad.min(self.num_records - 1).min(PROGRESS_LEN - 1);

        for back in 1..= depth {
            let k = (self.num_records - 1 - back) % PROGRESS_LEN;
            if self.sequence_in[k] == self.sequence_in[last] && self.sequence_out[k] == self.sequence_out[last] {
                return true;
            }
        }
        false
    }
}

//

#[test]
fn test_progress1()
{
    let mut p = SimplexProgress::<f64>::new(1e-9);

    p.record(3., 1., Some(0), Some(4));
    p.record(2., 1., Some(1), Some(5));
    assert!(!p.looping());
    assert_eq!(p.num_bad(), 0);

    p.record(2., 1., Some(0), Some(4));
    p.record(2., 1., Some(1), Some(5));
    assert_eq!(p.num_bad(), 2);
    assert!(p.looping());

    assert_eq!(p.last_sequence_in(), Some(1));

    p.reset();
    assert!(!p.looping());
    assert_eq!(p.num_records(), 0);
    assert_eq!(p.last_sequence_in(), None);
}

#[test]
fn test_progress2()
{
    let mut p = SimplexProgress::<f64>::new(1e-9);

    // infeasibility going back and forth never beats its best
    p.record(0., 2., Some(0), Some(5));
    p.record(0., 1., Some(5), Some(0));
    assert_eq!(p.num_bad(), 0);
    for _ in 0.. 3 {
        p.record(0., 2., Some(0), Some(5));
        p.record(0., 1., Some(5), Some(0));
    }
    assert_eq!(p.num_bad(), 6);
    assert!(p.looping());

    // a lower infeasibility with a higher objective is progress
    p.record(7., 0.5, Some(2), Some(3));
    assert_eq!(p.num_bad(), 0);
    assert!(!p.looping());
}
