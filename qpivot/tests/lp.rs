use float_eq::assert_float_eq;
use qpivot::prelude::*;
use qpivot::*;

type La = FloatGeneric<f64>;

type AMatBuild = MatBuild<La>;
type AProbLP = ProbLP<La>;
type ASimplex = Simplex<La>;

//

#[test]
fn test_lp1()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 1;
    let m = 2;
    let p = 0;

    let vec_c = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        1.,
    ]);

    // x <= b, x >= c
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        1., -1.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
          -5. ,  // b
        -(10.),  // -c
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));


    let mut s = ASimplex::new().par(|p| {p.max_iter = Some(100_000)});
    let lp = AProbLP::new(vec_c, mat_g, vec_h, mat_a, vec_b);
    lp.problem(&mut s).unwrap();
    let rslt = s.primal().unwrap_err();
    println!("{}", rslt);

    assert_eq!(rslt, SolverError::Infeasible);
}

//

#[test]
fn test_lp2()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 1;
    let m = 2;
    let p = 0;

    let vec_c = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        1.,
    ]);

    // x <= b, x <= c
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        1., 1.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
         5.,  // b
        10.,  // c
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));


    let mut s = ASimplex::new().par(|p| {p.max_iter = Some(100_000)});
    let lp = AProbLP::new(vec_c, mat_g, vec_h, mat_a, vec_b);
    lp.problem(&mut s).unwrap();
    let rslt = s.primal().unwrap_err();
    println!("{}", rslt);

    assert_eq!(rslt, SolverError::Unbounded);
}

//

#[test]
fn test_lp3()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 2;
    let m = 3;
    let p = 0;

    let vec_c = AMatBuild::new(MatType::General(n, 1)).iter_colmaj(&[
        -1., -2.,
    ]);

    // x0 + x1 <= 4, x0 + 3 x1 <= 6, x0 <= 3
    let mat_g = AMatBuild::new(MatType::General(m, n)).iter_rowmaj(&[
        1., 1.,
        1., 3.,
        1., 0.,
    ]);
    let vec_h = AMatBuild::new(MatType::General(m, 1)).iter_colmaj(&[
        4., 6., 3.,
    ]);

    let mat_a = AMatBuild::new(MatType::General(p, n));

    let vec_b = AMatBuild::new(MatType::General(p, 1));


    let mut s = ASimplex::new();
    let lp = AProbLP::new(vec_c, mat_g, vec_h, mat_a, vec_b)
             .col_bounds(&[0., 0.], &[f64::INFINITY, f64::INFINITY]);
    lp.problem(&mut s).unwrap();
    s.primal().unwrap();

    assert!(s.is_optimal());
    assert_float_eq!(s.col_solution(), [3., 1.].as_ref(), abs_all <= 1e-9);
    assert_float_eq!(s.objective_value(), -5., abs <= 1e-9);
}
