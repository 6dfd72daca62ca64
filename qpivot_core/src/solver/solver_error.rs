/// Solver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError
{
    /// Found no point satisfying the constraints.
    Infeasible,
    /// Found a ray along which the objective decreases without bound.
    Unbounded,
    /// Exceed max iterations.
    ExcessIter,

    /// Invalid problem data.
    InvalidOp,
    /// Basis factorization could not be recovered.
    Singular,
    /// Model is not in a terminal state.
    NotFinished,
}

impl core::fmt::Display for SolverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            SolverError::Infeasible  => "Infeasible: found no feasible point",
            SolverError::Unbounded   => "Unbounded: found an unbounded ray",
            SolverError::ExcessIter  => "ExcessIter: exceed max iterations",
            SolverError::InvalidOp   => "InvalidOp: invalid problem data",
            SolverError::Singular    => "Singular: basis factorization failed",
            SolverError::NotFinished => "NotFinished: model is not in a terminal state",
        })
    }
}

//

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
impl std::error::Error for SolverError {}
