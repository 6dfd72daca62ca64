use num_traits::Float;
use core::marker::PhantomData;
use crate::solver::LinAlg;

/// `num::Float`-generic [`LinAlg`] implementation
/// 
/// All numeric operations are written in pure Rust.
#[derive(Debug, Clone)]
pub struct FloatGeneric<F>
{
    ph_f: PhantomData<F>,
}

impl<F: Float> LinAlg for FloatGeneric<F>
{
    type F = F;

    fn norm_inf(x: &[F]) -> F
    {
        let mut m = F::zero();
        for u in x {
            m = m.max(u.abs());
        }
        m
    }

    fn inner_prod(x: &[F], y: &[F]) -> F
    {
        assert_eq!(x.len(), y.len());

        let mut sum = F::zero();
        for (u, v) in x.iter().zip(y) {
            sum = sum + *u * *v;
        }
        sum
    }

    fn copy(x: &[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());
    
        for (u, v) in x.iter().zip(y) {
            *v = *u;
        }
    }

    fn scale(alpha: F, x: &mut[F])
    {
        for u in x {
            *u = alpha * *u;
        }
    }
    
    fn add(alpha: F, x: &[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());
    
        for (u, v) in x.iter().zip(y) {
            *v = *v + alpha * *u;
        }
    }
}

//

#[test]
fn test_floatgeneric1()
{
    use float_eq::assert_float_eq;

    type L = FloatGeneric<f64>;

    let x = [3., -4., 0.];
    let mut y = [1., 1., 1.];

    assert_float_eq!(L::norm_inf(&x), 4., abs <= 1e-12);
    assert_float_eq!(L::inner_prod(&x, &y), -1., abs <= 1e-12);

    L::add(2., &x, &mut y);
    assert_float_eq!(y.as_ref(), [7., -7., 1.].as_ref(), abs_all <= 1e-12);

    L::scale(0.5, &mut y);
    assert_float_eq!(y.as_ref(), [3.5, -3.5, 0.5].as_ref(), abs_all <= 1e-12);

    L::copy(&x, &mut y);
    assert_eq!(y, x);
}
