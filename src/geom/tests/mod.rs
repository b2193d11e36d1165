mod test_smoothing_basic;
mod test_spline_basic;
