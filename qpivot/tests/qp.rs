use float_eq::assert_float_eq;
use qpivot::prelude::*;
use qpivot::*;

type La = FloatGeneric<f64>;

type AMatBuild = MatBuild<La>;
type AProbLP = ProbLP<La>;
type AProbQP = ProbQP<La>;
type ASimplex = Simplex<La>;

//

#[test]
fn test_qp1()
{
    let _ = env_logger::builder().is_test(true).try_init();

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
    println!("{:?}", s.col_solution());

    assert!(s.is_optimal());
    assert_float_eq!(s.col_solution(), [2., 0.].as_ref(), abs_all <= 1e-6);
    assert_float_eq!(s.row_dual(), [-6.].as_ref(), abs_all <= 1e-6);
    assert_float_eq!(&s.reduced_cost()[.. n], [0., 0.].as_ref(), abs_all <= 1e-6);
    // 3 + 2x0 + 2x1 + (x0^2 + x1^2)/2 without the constant 3
    assert_float_eq!(s.objective_value(), 4., abs <= 1e-6);
}

//

#[test]
fn test_qp2()
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
    s.primal_quadratic(&objective, Phase::Basic).unwrap();

    assert_float_eq!(s.col_solution(), [0.5, 0.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), -0.25, abs <= 1e-9);
    assert_float_eq!(s.row_dual(), [0.].as_ref(), abs_all <= 1e-9);
    // x1 held at its bound by a positive reduced cost
    assert_float_eq!(&s.reduced_cost()[.. n], [0., 1.].as_ref(), abs_all <= 1e-9);
    assert_eq!(s.cost(), &[-1., 1.]);
}

//

#[test]
fn test_qp3()
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

    // no iteration limit: the pivoting loop itself has to give up
    let mut s = ASimplex::new().par(|par| par.max_iter = None);
    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&[0.], &[f64::INFINITY]);
    let objective = qp.problem(&mut s).unwrap();
    let rslt = s.primal_quadratic(&objective, Phase::Basic).unwrap_err();
    println!("{}", rslt);

    assert_eq!(rslt, SolverError::Infeasible);
    assert!(!s.is_optimal());
    assert!(s.num_iterations() < 1000);
}

//

#[test]
fn test_qp4()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 2;
    let m = 1;
    let p = 0;

    let data_c = [1., 1.];
    // x0 + x1 >= 1
    let data_g = [-1., -1.];
    let data_h = [-1.];
    let bounds = ([0., 0.], [f64::INFINITY, f64::INFINITY]);

    let sym_p = AMatBuild::new(MatType::SymPack(n));
    let vec_q = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&data_c);
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&data_g);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&data_h);
    let mat_a = AMatBuild::new(MatType::General(p, n));
    let vec_b = AMatBuild::new(MatType::General(p, 1));

    let mut s_qp = ASimplex::new();
    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&bounds.0, &bounds.1);
    let objective = qp.problem(&mut s_qp).unwrap();
    // no quadratic term: solved as the linear program itself
    s_qp.primal_quadratic(&objective, Phase::Basic).unwrap();

    let vec_c = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&data_c);
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&data_g);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&data_h);
    let mat_a = AMatBuild::new(MatType::General(p, n));
    let vec_b = AMatBuild::new(MatType::General(p, 1));

    let mut s_lp = ASimplex::new();
    let lp = AProbLP::new(vec_c, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&bounds.0, &bounds.1);
    lp.problem(&mut s_lp).unwrap();
    s_lp.primal().unwrap();

    assert_float_eq!(s_qp.objective_value(), 1., abs <= 1e-9);
    assert_float_eq!(s_qp.objective_value(), s_lp.objective_value(), abs <= 1e-12);
    assert_float_eq!(s_qp.col_solution(), s_lp.col_solution(), abs_all <= 1e-12);
}

//

#[test]
fn test_qp5()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 2;
    let m = 0;
    let p = 1;

    // (x0^2 + x1^2)/2
    let sym_p = AMatBuild::new(MatType::SymPack(n)).iter_colmaj(&[
        1.,
        0., 1.,
    ]);
    let vec_q = AMatBuild::new(MatType::General(n, 1));

    let mat_g = AMatBuild::new(MatType::General(m, n));
    let vec_h = AMatBuild::new(MatType::General(m, 1));

    // x0 + x1 = 1
    let mat_a = AMatBuild::new(MatType::General(p, n)).iter_rowmaj(&[
        1., 1.,
    ]);
    let vec_b = AMatBuild::new(MatType::General(p, 1)).iter_colmaj(&[
        1.,
    ]);

    let mut s = ASimplex::new();
    let qp = AProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b);
    let objective = qp.problem(&mut s).unwrap();
    s.primal_quadratic(&objective, Phase::Basic).unwrap();

    assert_float_eq!(s.col_solution(), [0.5, 0.5].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.row_activity(), [1.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.row_dual(), [0.5].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), 0.25, abs <= 1e-9);
}

//

#[test]
fn test_qp6()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 2;
    let m = 1;
    let p = 0;

    // x0^2 - x0 + x1, no curvature along x1
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
    s.primal_quadratic(&objective, Phase::Basic).unwrap();

    assert_float_eq!(s.col_solution(), [0.5, 0.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), -0.25, abs <= 1e-9);
    // x0 basic, its stationarity logical at the bound: zero reduced cost
    assert_eq!(s.statuses()[0], Status::Basic);
    assert_eq!(s.statuses()[1], Status::AtLower);
    assert_float_eq!(&s.reduced_cost()[.. n], [0., 1.].as_ref(), abs_all <= 1e-9);
}
