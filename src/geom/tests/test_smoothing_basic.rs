use crate::geom::{gaussian_filter1d, gaussian_kernel};

#[test]
fn constant_signal_is_unchanged() {
    let signal = vec![2.5; 20];
    let smoothed = gaussian_filter1d(&signal, 3.0);
    assert_eq!(smoothed.len(), 20);
    assert!(smoothed.iter().all(|v| (v - 2.5).abs() < 1e-12));
}

#[test]
fn linear_signal_interior_is_preserved() {
    let signal: Vec<f64> = (0..60).map(|i| 0.1 * i as f64).collect();
    let smoothed = gaussian_filter1d(&signal, 3.0);
    // Kernel radius is 12; away from the reflected edges a ramp passes through.
    for i in 12..48 {
        assert!((smoothed[i] - signal[i]).abs() < 1e-9, "i={i}");
    }
}

#[test]
fn impulse_spreads_into_kernel_shape() {
    let mut signal = vec![0.0; 41];
    signal[20] = 1.0;
    let smoothed = gaussian_filter1d(&signal, 3.0);
    let kernel = gaussian_kernel(3.0, 4.0);
    for (k, w) in kernel.iter().enumerate() {
        assert!((smoothed[8 + k] - w).abs() < 1e-12);
    }
    assert!((smoothed.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn short_signals_reflect_repeatedly() {
    assert!(gaussian_filter1d(&[], 3.0).is_empty());
    let one = gaussian_filter1d(&[4.0], 3.0);
    assert!((one[0] - 4.0).abs() < 1e-12);

    let two = gaussian_filter1d(&[0.0, 1.0], 3.0);
    assert!(two[0] > 0.0 && two[0] < 0.5);
    assert!(two[1] > 0.5 && two[1] < 1.0);
}
