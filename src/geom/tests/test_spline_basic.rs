use crate::geom::{CubicSpline, SplineBoundary, SplineError, linspace};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn spline_passes_through_knots() {
    let knots = linspace(0.0, 1.0, 6);
    let values = [0.3, 1.2, 0.7, 2.5, 2.0, 3.1];
    for boundary in [SplineBoundary::Natural, SplineBoundary::NotAKnot] {
        let spline = CubicSpline::fit(&knots, &values, boundary).unwrap();
        for (t, y) in knots.iter().zip(values) {
            assert!(approx_eq(spline.eval(*t), y, 1e-12), "{boundary:?} t={t}");
        }
    }
}

#[test]
fn natural_spline_has_flat_ends() {
    let knots = [0.0, 0.5, 1.5, 2.0, 3.0];
    let spline = CubicSpline::natural(&knots, &[1.0, -1.0, 2.0, 0.0, 4.0]).unwrap();
    let m = spline.second_derivatives();
    assert_eq!(m[0], 0.0);
    assert_eq!(m[m.len() - 1], 0.0);
    assert!(m[1..m.len() - 1].iter().any(|v| v.abs() > 1e-6));
}

#[test]
fn linear_data_is_reproduced_and_extrapolated() {
    let knots = linspace(0.0, 4.0, 5);
    let values: Vec<f64> = knots.iter().map(|t| 2.0 * t - 1.0).collect();
    for boundary in [SplineBoundary::Natural, SplineBoundary::NotAKnot] {
        let spline = CubicSpline::fit(&knots, &values, boundary).unwrap();
        for t in [-1.0, 0.25, 1.7, 3.9, 5.5] {
            assert!(approx_eq(spline.eval(t), 2.0 * t - 1.0, 1e-9), "{boundary:?} t={t}");
        }
    }
}

#[test]
fn not_a_knot_reproduces_a_cubic() {
    let f = |t: f64| t * t * t - 2.0 * t * t + 0.5 * t + 1.0;
    let knots = [0.0, 0.4, 1.0, 1.3, 2.0, 2.6];
    let values: Vec<f64> = knots.iter().map(|&t| f(t)).collect();
    let spline = CubicSpline::fit(&knots, &values, SplineBoundary::NotAKnot).unwrap();
    for t in linspace(-0.5, 3.0, 15) {
        assert!(approx_eq(spline.eval(t), f(t), 1e-9), "t={t}");
    }
}

#[test]
fn not_a_knot_falls_back_with_few_knots() {
    let knots = [0.0, 1.0, 2.0];
    let values = [0.0, 1.0, 0.0];
    let a = CubicSpline::fit(&knots, &values, SplineBoundary::NotAKnot).unwrap();
    let b = CubicSpline::natural(&knots, &values).unwrap();
    assert_eq!(a, b);
}

#[test]
fn two_knots_interpolate_linearly() {
    let spline = CubicSpline::natural(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
    assert!(approx_eq(spline.eval(0.5), 2.0, 1e-12));
    assert_eq!(spline.eval_many(&[0.0, 2.0]), vec![1.0, 5.0]);
}

#[test]
fn fit_rejects_bad_input() {
    assert_eq!(
        CubicSpline::natural(&[0.0], &[1.0]),
        Err(SplineError::TooFewKnots(1))
    );
    assert_eq!(
        CubicSpline::natural(&[0.0, 1.0], &[1.0]),
        Err(SplineError::LengthMismatch { knots: 2, values: 1 })
    );
    assert_eq!(
        CubicSpline::natural(&[0.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
        Err(SplineError::NonIncreasingKnots)
    );
    assert_eq!(
        CubicSpline::natural(&[0.0, 1.0], &[1.0, f64::NAN]),
        Err(SplineError::NonFiniteValues)
    );
}

#[test]
fn linspace_includes_both_ends() {
    assert!(linspace(0.0, 1.0, 0).is_empty());
    assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    let ts = linspace(0.0, 1.0, 14);
    assert_eq!(ts.len(), 14);
    assert_eq!(ts[0], 0.0);
    assert_eq!(ts[13], 1.0);
    assert!(ts.windows(2).all(|w| w[1] > w[0]));
}
