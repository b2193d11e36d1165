//! Piecewise cubic interpolation of scalar samples.
//!
//! Splines are stored in second-derivative form: on `[t_i, t_{i+1}]` with
//! `h = t_{i+1} - t_i`, `a = (t_{i+1} - t) / h` and `b = (t - t_i) / h`,
//!
//! ```text
//! S(t) = a·y_i + b·y_{i+1} + ((a³ - a)·M_i + (b³ - b)·M_{i+1})·h² / 6
//! ```
//!
//! The same cubic keeps being evaluated outside the knot range, so the end
//! pieces extrapolate.

use super::core::Tolerance;

/// End conditions for [`CubicSpline::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplineBoundary {
    /// Zero second derivative at both ends.
    #[default]
    Natural,
    /// Continuous third derivative across the second and second-to-last knots.
    /// Needs at least 4 knots; shorter inputs fall back to [`Natural`](Self::Natural).
    NotAKnot,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("spline needs at least 2 knots (got {0})")]
    TooFewKnots(usize),
    #[error("knot and value arrays differ in length ({knots} vs {values})")]
    LengthMismatch { knots: usize, values: usize },
    #[error("spline knots must be finite and strictly increasing")]
    NonIncreasingKnots,
    #[error("spline values must be finite")]
    NonFiniteValues,
    #[error("spline system is singular")]
    Singular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    pub fn fit(knots: &[f64], values: &[f64], boundary: SplineBoundary) -> Result<Self, SplineError> {
        if knots.len() != values.len() {
            return Err(SplineError::LengthMismatch {
                knots: knots.len(),
                values: values.len(),
            });
        }
        if knots.len() < 2 {
            return Err(SplineError::TooFewKnots(knots.len()));
        }
        if knots.iter().any(|k| !k.is_finite()) || knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SplineError::NonIncreasingKnots);
        }
        if values.iter().any(|y| !y.is_finite()) {
            return Err(SplineError::NonFiniteValues);
        }

        let second_derivatives = match boundary {
            SplineBoundary::NotAKnot if knots.len() >= 4 => not_a_knot_moments(knots, values)?,
            _ => natural_moments(knots, values),
        };

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second_derivatives,
        })
    }

    pub fn natural(knots: &[f64], values: &[f64]) -> Result<Self, SplineError> {
        Self::fit(knots, values, SplineBoundary::Natural)
    }

    /// Second derivative of the spline at each knot.
    #[must_use]
    pub fn second_derivatives(&self) -> &[f64] {
        &self.second_derivatives
    }

    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        let last = self.knots.len() - 2;
        let i = self
            .knots
            .partition_point(|&k| k <= t)
            .saturating_sub(1)
            .min(last);

        let h = self.knots[i + 1] - self.knots[i];
        let a = (self.knots[i + 1] - t) / h;
        let b = (t - self.knots[i]) / h;
        a * self.values[i]
            + b * self.values[i + 1]
            + ((a * a * a - a) * self.second_derivatives[i]
                + (b * b * b - b) * self.second_derivatives[i + 1])
                * h
                * h
                / 6.0
    }

    #[must_use]
    pub fn eval_many(&self, ts: &[f64]) -> Vec<f64> {
        ts.iter().map(|&t| self.eval(t)).collect()
    }
}

/// `count` evenly spaced values from `start` to `end`, both included.
#[must_use]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut out: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            out[count - 1] = end;
            out
        }
    }
}

fn slope(knots: &[f64], values: &[f64], i: usize) -> f64 {
    (values[i + 1] - values[i]) / (knots[i + 1] - knots[i])
}

fn natural_moments(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let n = knots.len();
    let mut moments = vec![0.0; n];
    if n < 3 {
        return moments;
    }

    let m = n - 2;
    let mut lower = Vec::with_capacity(m);
    let mut diag = Vec::with_capacity(m);
    let mut upper = Vec::with_capacity(m);
    let mut rhs = Vec::with_capacity(m);
    for i in 1..n - 1 {
        let h0 = knots[i] - knots[i - 1];
        let h1 = knots[i + 1] - knots[i];
        lower.push(h0);
        diag.push(2.0 * (h0 + h1));
        upper.push(h1);
        rhs.push(6.0 * (slope(knots, values, i) - slope(knots, values, i - 1)));
    }

    let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs);
    moments[1..n - 1].copy_from_slice(&interior);
    moments
}

/// Thomas algorithm. The natural-spline system is strictly diagonally
/// dominant, so no pivoting is needed.
fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    c[0] = upper[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - lower[i] * c[i - 1];
        c[i] = upper[i] / denom;
        d[i] = (rhs[i] - lower[i] * d[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}

fn not_a_knot_moments(knots: &[f64], values: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = knots.len();
    let h = |i: usize| knots[i + 1] - knots[i];
    let mut matrix = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];

    // Equal third derivative on both sides of knot 1.
    matrix[0][0] = -h(1);
    matrix[0][1] = h(0) + h(1);
    matrix[0][2] = -h(0);

    for i in 1..n - 1 {
        matrix[i][i - 1] = h(i - 1);
        matrix[i][i] = 2.0 * (h(i - 1) + h(i));
        matrix[i][i + 1] = h(i);
        rhs[i] = 6.0 * (slope(knots, values, i) - slope(knots, values, i - 1));
    }

    // Same condition across knot n - 2.
    matrix[n - 1][n - 3] = -h(n - 2);
    matrix[n - 1][n - 2] = h(n - 3) + h(n - 2);
    matrix[n - 1][n - 1] = -h(n - 3);

    solve_dense(matrix, rhs)
}

/// Gaussian elimination with partial pivoting.
fn solve_dense(mut aug: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>, SplineError> {
    let n = rhs.len();

    for k in 0..n {
        let mut max_row = k;
        let mut max_val = aug[k][k].abs();
        for (i, row) in aug.iter().enumerate().skip(k + 1) {
            if row[k].abs() > max_val {
                max_val = row[k].abs();
                max_row = i;
            }
        }

        if max_val < Tolerance::PIVOT.eps {
            return Err(SplineError::Singular);
        }

        if max_row != k {
            aug.swap(k, max_row);
            rhs.swap(k, max_row);
        }

        let pivot = aug[k][k];
        for i in (k + 1)..n {
            let factor = aug[i][k] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                aug[i][j] -= factor * aug[k][j];
            }
            rhs[i] -= factor * rhs[k];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| aug[i][j] * x[j]).sum();
        x[i] = (rhs[i] - tail) / aug[i][i];
    }
    Ok(x)
}
