use nalgebra as na;

use crate::Float;

/// Vandermonde matrix of `x` up to `order`, one row per sample.
pub fn vandermonde<T: Float>(x: &[T], order: usize) -> na::DMatrix<T> {
    na::DMatrix::from_fn(x.len(), order + 1, |r, c| x[r].powi(c as i32))
}

/// Savitzky-Golay projection matrix for one window.
///
/// Row `i` holds the weights that evaluate, at sample `i`, the polynomial of
/// degree `order` fitted by least squares to all `window` samples. The middle
/// row is the usual convolution kernel; the outer rows give the fitted edge
/// values.
pub fn savgol_matrix<T: Float>(window: usize, order: usize) -> na::DMatrix<T> {
    let half = (window / 2).max(1) as f64;
    let x: Vec<T> = (0..window)
        .map(|i| na::convert::<f64, T>((i as f64 - (window / 2) as f64) / half))
        .collect();

    let q = vandermonde(&x, order).qr().q();

    &q * q.transpose()
}

/// Filters `data` with a precomputed [`savgol_matrix`].
///
/// `data` must be at least as long as the window. The first and last
/// `window / 2` samples come from the polynomials fitted to the first and
/// last window.
pub fn savgol_filter<T: Float>(data: &[T], weights: &na::DMatrix<T>) -> Vec<T> {
    let window = weights.nrows();
    let half = window / 2;
    let n = data.len();
    debug_assert!(n >= window);

    let apply = |row: usize, start: usize| -> T {
        (0..window).fold(T::zero(), |acc, j| acc + weights[(row, j)] * data[start + j])
    };

    (0..n)
        .map(|i| {
            if i < half {
                apply(i, 0)
            } else if i + half >= n {
                apply(i + window - n, n - window)
            } else {
                apply(half, i - half)
            }
        })
        .collect()
}
