/*!
LP/QP problems that can be solved by [`qpivot_core`] primal simplex and complementary pivoting.

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

A problem built from [`MatBuild`] matrices is loaded into a [`qpivot_core::Simplex`],
then solved by
* [`qpivot_core::Simplex::primal`] for [`ProbLP`],
* [`qpivot_core::Simplex::primal_quadratic`] or [`qpivot_core::Simplex::primal_slp`] for [`ProbQP`].

# Examples
## QP

```
use float_eq::assert_float_eq;
use qpivot::prelude::*;
use qpivot::MatBuild;
use qpivot::ProbQP;

//env_logger::init(); // Use any logger crate as `qpivot` uses `log` crate.

type La = FloatGeneric<f64>;
type AMatBuild = MatBuild<La>;
type AProbQP = ProbQP<La>;
type ASimplex = Simplex<La>;

let n = 2; // x0, x1
let m = 1;
let p = 0;

// (1/2)(x - a)^2 + const
let mut sym_p = AMatBuild::new(MatType::SymPack(n));
sym_p[(0, 0)] = 1.;
sym_p[(1, 1)] = 1.;

let mut vec_q = AMatBuild::new(MatType::General(n, 1));
vec_q[(0, 0)] = -(-1.); // -a0
vec_q[(1, 0)] = -(-2.); // -a1

// 1 - x0/b0 - x1/b1 <= 0
let mut mat_g = AMatBuild::new(MatType::General(m, n));
mat_g[(0, 0)] = -1. / 2.; // -1/b0
mat_g[(0, 1)] = -1. / 3.; // -1/b1

let mut vec_h = AMatBuild::new(MatType::General(m, 1));
vec_h[(0, 0)] = -1.;

let mat_a = AMatBuild::new(MatType::General(p, n));

let vec_b = AMatBuild::new(MatType::General(p, 1));

let mut s = ASimplex::new().par(|p| {
    p.max_iter = Some(100_000);
});
let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b);
let objective = qp.problem(&mut s).unwrap();
s.primal_quadratic(&objective, Phase::Basic).unwrap();

assert_float_eq!(s.col_solution(), [2., 0.].as_ref(), abs_all <= 1e-6);
```

## Other Examples

You can find other [tests](https://github.com/convexbrain/Totsu/tree/master/qpivot/tests) of the problems.
*/

mod matbuild;

pub use matbuild::*;

//

mod problem;

pub use problem::*;

//

/// Prelude
pub mod prelude
{
    pub use qpivot_core::solver::SolverError;
    pub use qpivot_core::{Simplex, SimplexParam, Status, FloatGeneric, MatType};
    pub use qpivot_core::quadratic::{Phase, SlpStatus, QuadraticObjective};
}
