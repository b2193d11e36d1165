/// Kernel half-width is `truncate · σ` samples, rounded.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Normalized 1-D Gaussian kernel of radius `(truncate · σ + 0.5) as usize`.
#[must_use]
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    if !(sigma > 0.0) || !sigma.is_finite() {
        return vec![1.0];
    }
    let radius = (truncate * sigma + 0.5) as usize;
    let radius = radius as isize;
    let inv = -0.5 / (sigma * sigma);
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|x| (inv * (x * x) as f64).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Maps an out-of-range index back into `0..len` by mirroring about the
/// edge samples (`d c b a | a b c d | d c b a`).
fn reflect_index(i: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let j = i.rem_euclid(period) as usize;
    if j >= len { 2 * len - 1 - j } else { j }
}

/// Gaussian smoothing of a 1-D signal with reflected boundaries and the
/// default truncation of four standard deviations.
#[must_use]
pub fn gaussian_filter1d(signal: &[f64], sigma: f64) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let kernel = gaussian_kernel(sigma, GAUSSIAN_TRUNCATE);
    let radius = (kernel.len() / 2) as isize;
    let len = signal.len();

    (0..len as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * signal[reflect_index(i + k as isize - radius, len)])
                .sum()
        })
        .collect()
}
