use float_eq::assert_float_eq;
use qpivot::prelude::*;
use qpivot::*;

type La = FloatGeneric<f64>;

type AMatBuild = MatBuild<La>;
type AProbQP = ProbQP<La>;
type ASimplex = Simplex<La>;

//

#[test]
fn test_slp1()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 2;
    let m = 1;
    let p = 0;

    // x0^2 + x1^2 - x0 + x1
    let sym_p = AMatBuild::new(MatType::SymPack(n)).iter_colmaj(&[
        2.,
        0., 2.,
    ]);
    let vec_q = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        -1., 1.,
    ]);

    // x0 + x1 <= 2
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        1., 1.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
        2.,
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));

    let mut s = ASimplex::new();
    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&[0., 0.], &[f64::INFINITY, f64::INFINITY]);
    let objective = qp.problem(&mut s).unwrap();
    let rslt = s.primal_slp(&objective, 20, 1e-9).unwrap();

    assert_eq!(rslt, SlpStatus::Converged);
    assert!(s.is_optimal());
    assert_float_eq!(s.col_solution(), [0.5, 0.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), -0.25, abs <= 1e-9);
    assert_eq!(s.cost(), &[-1., 1.]);
}

//

#[test]
fn test_slp2()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 2;
    let m = 1;
    let p = 0;

    // x0^2 - x0 + x1
    let sym_p = AMatBuild::new(MatType::SymPack(n)).iter_colmaj(&[
        2.,
        0., 0.,
    ]);
    let vec_q = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        -1., 1.,
    ]);

    // x0 + x1 <= 2
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        1., 1.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
        2.,
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));

    let mut s = ASimplex::new();
    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&[0., 0.], &[f64::INFINITY, f64::INFINITY]);
    let objective = qp.problem(&mut s).unwrap();

    // a half step to (0.5, 0), then no descent left
    assert_eq!(s.primal_slp(&objective, 20, 1e-9), Ok(SlpStatus::Converged));
    assert_float_eq!(s.col_solution(), [0.5, 0.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), -0.25, abs <= 1e-9);
}

//

#[test]
fn test_slp3()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 1;
    let m = 2;
    let p = 0;

    let sym_p = AMatBuild::new(MatType::SymPack(n)).iter_colmaj(&[
        2.,
    ]);
    let vec_q = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        1.,
    ]);

    // x >= 2, x <= 1
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        -1., 1.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
        -2., 1.,
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));

    let mut s = ASimplex::new();
    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&[0.], &[f64::INFINITY]);
    let objective = qp.problem(&mut s).unwrap();
    let rslt = s.primal_slp(&objective, 20, 1e-9).unwrap_err();
    println!("{}", rslt);

    assert_eq!(rslt, SolverError::Infeasible);
    assert!(!s.is_optimal());
    assert_eq!(s.cost(), &[1.]);
}

//

fn box_problem(s: &mut ASimplex) -> QuadraticObjective<La>
{
    let n = 2;
    let m = 1;
    let p = 0;

    // (x0 - 0.3)^2 + (x1 - 0.6)^2 without the constant
    let sym_p = AMatBuild::new(MatType::SymPack(n)).iter_colmaj(&[
        2.,
        0., 2.,
    ]);
    let vec_q = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        -0.6, -1.2,
    ]);

    // x0 + x1 <= 2, never active in the box
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        1., 1.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
        2.,
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));

    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&[0., 0.], &[1., 1.]);
    qp.problem(s).unwrap()
}

#[test]
fn test_slp4()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut s1 = ASimplex::new();
    let objective = box_problem(&mut s1);
    let rslt = s1.primal_slp(&objective, 2, 1e-9).unwrap();

    assert_eq!(rslt, SlpStatus::PassLimit);
    assert!(!s1.is_optimal());
    for x in s1.col_solution() {
        assert!((0. ..= 1.).contains(x));
    }
    // better than the first pass at (0.45, 0.45), not below the minimum
    let obj = s1.objective_value();
    assert!(obj < -0.44 && obj >= -0.45 - 1e-12);

    let mut s2 = ASimplex::new();
    let objective = box_problem(&mut s2);
    s2.primal_slp(&objective, 2, 1e-9).unwrap();

    assert_eq!(s1.col_solution(), s2.col_solution());
}
