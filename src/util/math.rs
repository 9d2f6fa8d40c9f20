//! Numeric helpers shared by the shell generator and the search loop.

/// Number of samples needed to cover `length` with gaps no larger than `step`.
///
/// Returns `ceil(length / step) + 1`, so a zero length yields one sample.
pub(crate) fn covering_count(length: f64, step: f64) -> usize {
    (length / step).ceil() as usize + 1
}

/// Returns the `idx`-th of `count` evenly spaced values in `[0, stop)`.
pub(crate) fn open_linspace_at(stop: f64, count: usize, idx: usize) -> f64 {
    debug_assert!(idx < count);
    idx as f64 * (stop / count as f64)
}

/// Returns the `idx`-th of `count` evenly spaced values in `[0, stop]`.
///
/// The final sample is exactly `stop`; a single sample sits at zero.
pub(crate) fn closed_linspace_at(stop: f64, count: usize, idx: usize) -> f64 {
    debug_assert!(idx < count);
    if count == 1 {
        return 0.0;
    }
    if idx == count - 1 {
        return stop;
    }
    idx as f64 * (stop / (count - 1) as f64)
}
