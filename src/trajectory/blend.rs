use super::path::Path;
use crate::geom::{CubicSpline, SplineBoundary, SplineError, TorusSurface, linspace, wrap_angle};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlendError {
    #[error("cannot blend an empty path")]
    EmptyPath,
    #[error("blend factor must lie in [0, 1] (got {0})")]
    AlphaOutOfRange(f64),
    #[error("resampling failed: {0}")]
    Resample(#[from] SplineError),
}

/// Resamples `values`, taken at evenly spaced times on `[0, 1]`, onto
/// `target_len` evenly spaced times using a not-a-knot cubic. The end pieces
/// extrapolate. Two or three samples fall back to a natural spline, a single
/// sample is repeated.
pub fn resample(values: &[f64], target_len: usize) -> Result<Vec<f64>, SplineError> {
    match values.len() {
        0 => Err(SplineError::TooFewKnots(0)),
        1 => Ok(vec![values[0]; target_len]),
        n if n == target_len => Ok(values.to_vec()),
        n => {
            let knots = linspace(0.0, 1.0, n);
            let spline = CubicSpline::fit(&knots, values, SplineBoundary::NotAKnot)?;
            Ok(spline.eval_many(&linspace(0.0, 1.0, target_len)))
        }
    }
}

/// Blends `b` into `a` in parameter space: `(1 - alpha) · a + alpha · b`,
/// wrapped and projected. The result always has `a`'s length; `b` is
/// resampled onto `a`'s time grid when the lengths differ.
pub fn blend(a: &Path, b: &Path, alpha: f64, surface: &TorusSurface) -> Result<Path, BlendError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(BlendError::AlphaOutOfRange(alpha));
    }
    if a.is_empty() || b.is_empty() {
        return Err(BlendError::EmptyPath);
    }
    if alpha == 0.0 && a.len() == b.len() {
        return Ok(a.clone());
    }

    let n = a.len();
    let bu = resample(b.u(), n)?;
    let bv = resample(b.v(), n)?;

    let mix = |from: &[f64], to: &[f64]| -> Vec<f64> {
        from.iter()
            .zip(to)
            .map(|(&p, &q)| wrap_angle((1.0 - alpha) * p + alpha * q))
            .collect()
    };
    let u = mix(a.u(), &bu);
    let v = mix(a.v(), &bv);
    Ok(Path::from_params(u, v, surface))
}
