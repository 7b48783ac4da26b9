//! Curve smoothing: exponential moving average and Savitzky–Golay.
//!
//! Smoothing is best effort: a sequence too short for the requested filter
//! passes through unchanged, and the result says so. [`Smoothed::Applied`]
//! carries a filtered sequence, [`Smoothed::Unchanged`] carries the input and
//! the reason the filter did not run, so a pass-through can never be mistaken
//! for a smoothed curve. Neither method reorders, resizes, or introduces NaN.

use serde::{Deserialize, Serialize};

/// Largest Savitzky–Golay window ever used; shrinks to fit short sequences.
const SAVGOL_MAX_WINDOW: usize = 31;

/// Smoothing method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmoothMethod {
    /// Non-adjusted exponential moving average with span `window`.
    Ema { window: usize },
    /// Degree-2 Savitzky–Golay with an odd window capped at 31.
    Savgol,
}

/// Why a filter passed the input through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// Length 0 or 1 is always left alone.
    TooShort,
    /// An EMA span of 0 or 1 has nothing to average.
    WindowTooSmall,
    /// EMA needs strictly more samples than its span.
    SpanExceedsLength,
    /// The resolved Savitzky–Golay window fell below 3.
    WindowBelowMinimum,
}

impl std::fmt::Display for PassReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassReason::TooShort => write!(f, "sequence too short to smooth"),
            PassReason::WindowTooSmall => write!(f, "smoothing window below 2"),
            PassReason::SpanExceedsLength => write!(f, "smoothing window exceeds sequence length"),
            PassReason::WindowBelowMinimum => write!(f, "resolved window below 3"),
        }
    }
}

/// Outcome of a smoothing pass. `Unchanged` still carries the (copied)
/// input, so callers always get a same-length sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Smoothed {
    Applied(Vec<f64>),
    Unchanged(Vec<f64>, PassReason),
}

impl Smoothed {
    pub fn values(&self) -> &[f64] {
        match self {
            Smoothed::Applied(v) | Smoothed::Unchanged(v, _) => v,
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        match self {
            Smoothed::Applied(v) | Smoothed::Unchanged(v, _) => v,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Smoothed::Applied(_))
    }

    pub fn pass_reason(&self) -> Option<PassReason> {
        match self {
            Smoothed::Applied(_) => None,
            Smoothed::Unchanged(_, reason) => Some(*reason),
        }
    }
}

/// Apply `method` to `values`.
pub fn smooth(values: &[f64], method: SmoothMethod) -> Smoothed {
    match method {
        SmoothMethod::Ema { window } => ema(values, window),
        SmoothMethod::Savgol => savgol(values),
    }
}

/// Non-adjusted EMA: `y[0] = v[0]`, `y[i] = α·v[i] + (1−α)·y[i−1]` with
/// `α = 2/(w+1)`. Runs only when `len > w` and `w > 1`.
pub fn ema(values: &[f64], window: usize) -> Smoothed {
    if values.len() <= 1 {
        return Smoothed::Unchanged(values.to_vec(), PassReason::TooShort);
    }
    if window <= 1 {
        return Smoothed::Unchanged(values.to_vec(), PassReason::WindowTooSmall);
    }
    if values.len() <= window {
        return Smoothed::Unchanged(values.to_vec(), PassReason::SpanExceedsLength);
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    Smoothed::Applied(out)
}

/// Degree-2 Savitzky–Golay. The window starts at [`SAVGOL_MAX_WINDOW`] and is
/// reduced to the largest odd number ≤ the sequence length; a resolved window
/// below 3 passes through.
pub fn savgol(values: &[f64]) -> Smoothed {
    if values.len() <= 1 {
        return Smoothed::Unchanged(values.to_vec(), PassReason::TooShort);
    }
    let window = resolve_window(values.len());
    if window < 3 {
        return Smoothed::Unchanged(values.to_vec(), PassReason::WindowBelowMinimum);
    }
    Smoothed::Applied(savgol_filter(values, window))
}

fn resolve_window(len: usize) -> usize {
    let capped = len.min(SAVGOL_MAX_WINDOW);
    if capped % 2 == 0 {
        capped - 1
    } else {
        capped
    }
}

/// `window` is odd, 3 ≤ window ≤ len. Interior points convolve with the
/// least-squares quadratic weights; the first and last half-window positions
/// evaluate a quadratic fitted to the boundary window instead of padding.
fn savgol_filter(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let h = window / 2;
    let weights = central_weights(window);
    let mut out = vec![0.0; n];

    for i in h..n - h {
        let mut acc = 0.0;
        for (j, w) in weights.iter().enumerate() {
            acc += w * values[i + j - h];
        }
        out[i] = acc;
    }

    let head = fit_quadratic(&values[..window]);
    for (i, slot) in out.iter_mut().take(h).enumerate() {
        *slot = eval_quadratic(head, i as f64);
    }
    let tail = fit_quadratic(&values[n - window..]);
    for i in n - h..n {
        out[i] = eval_quadratic(tail, (i - (n - window)) as f64);
    }
    out
}

/// Closed-form smoothing weights for a degree-2 fit on a symmetric window of
/// odd size m: `c_i = 3(3m² − 7 − 20i²) / (4m(m² − 4))` for i in −h..=h.
fn central_weights(window: usize) -> Vec<f64> {
    let m = window as f64;
    let h = (window / 2) as i64;
    let denom = 4.0 * m * (m * m - 4.0);
    (-h..=h)
        .map(|i| {
            let i = i as f64;
            3.0 * (3.0 * m * m - 7.0 - 20.0 * i * i) / denom
        })
        .collect()
}

/// Least-squares quadratic over y sampled at x = 0, 1, …, len−1.
/// Returns (a, b, c) for a + b·x + c·x².
fn fit_quadratic(y: &[f64]) -> (f64, f64, f64) {
    let m = y.len() as f64;
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut t0, mut t1, mut t2) = (0.0, 0.0, 0.0);
    for (i, &yi) in y.iter().enumerate() {
        let x = i as f64;
        let x2 = x * x;
        s1 += x;
        s2 += x2;
        s3 += x2 * x;
        s4 += x2 * x2;
        t0 += yi;
        t1 += x * yi;
        t2 += x2 * yi;
    }

    // Cramer's rule on the 3x3 normal equations; the design matrix has
    // distinct x, so the determinant is nonzero for len >= 3.
    let det = m * (s2 * s4 - s3 * s3) - s1 * (s1 * s4 - s2 * s3) + s2 * (s1 * s3 - s2 * s2);
    let det_a = t0 * (s2 * s4 - s3 * s3) - s1 * (t1 * s4 - t2 * s3) + s2 * (t1 * s3 - t2 * s2);
    let det_b = m * (t1 * s4 - t2 * s3) - t0 * (s1 * s4 - s2 * s3) + s2 * (s1 * t2 - s2 * t1);
    let det_c = m * (s2 * t2 - s3 * t1) - s1 * (s1 * t2 - s2 * t1) + t0 * (s1 * s3 - s2 * s2);

    (det_a / det, det_b / det, det_c / det)
}

fn eval_quadratic((a, b, c): (f64, f64, f64), x: f64) -> f64 {
    a + b * x + c * x * x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_approx(actual: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).abs() < epsilon,
                "index {i}: actual={a}, expected={e}"
            );
        }
    }

    // ── EMA ─────────────────────────────────────────────────────────────

    #[test]
    fn ema_known_values() {
        // window=2, alpha=2/3.
        let out = ema(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(out.is_applied());
        assert_all_approx(
            out.values(),
            &[1.0, 5.0 / 3.0, 23.0 / 9.0, 95.0 / 27.0],
            1e-12,
        );
    }

    #[test]
    fn ema_window_one_passes_through() {
        let out = ema(&[1.0, 2.0, 3.0], 1);
        assert_eq!(out.pass_reason(), Some(PassReason::WindowTooSmall));
        assert_eq!(out.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn ema_short_sequence_passes_through() {
        let out = ema(&[1.0, 2.0, 3.0], 3);
        assert_eq!(out.pass_reason(), Some(PassReason::SpanExceedsLength));

        let out = ema(&[5.0], 2);
        assert_eq!(out.pass_reason(), Some(PassReason::TooShort));
    }

    #[test]
    fn ema_of_constant_is_constant() {
        let out = ema(&[3.0; 10], 4);
        assert!(out.is_applied());
        assert_all_approx(out.values(), &[3.0; 10], 1e-12);
    }

    // ── Savitzky–Golay ──────────────────────────────────────────────────

    #[test]
    fn savgol_weights_match_tabulated_values() {
        // Classic window-5 quadratic weights: (-3, 12, 17, 12, -3) / 35.
        let w = central_weights(5);
        assert_all_approx(
            &w,
            &[-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0],
            1e-12,
        );
        // Window-7: (-2, 3, 6, 7, 6, 3, -2) / 21.
        let w = central_weights(7);
        assert_all_approx(
            &w,
            &[
                -2.0 / 21.0,
                3.0 / 21.0,
                6.0 / 21.0,
                7.0 / 21.0,
                6.0 / 21.0,
                3.0 / 21.0,
                -2.0 / 21.0,
            ],
            1e-12,
        );
    }

    #[test]
    fn savgol_reproduces_quadratics_exactly() {
        // A degree-2 fit is exact on degree-2 data, edges included.
        let values: Vec<f64> = (0..40).map(|i| {
            let x = i as f64;
            2.0 + 3.0 * x + 0.5 * x * x
        }).collect();

        let out = savgol(&values);
        assert!(out.is_applied());
        assert_all_approx(out.values(), &values, 1e-6);
    }

    #[test]
    fn savgol_window_shrinks_to_fit() {
        // len=4 resolves to window 3; still applied.
        let out = savgol(&[1.0, 2.0, 3.0, 4.0]);
        assert!(out.is_applied());
        assert_all_approx(out.values(), &[1.0, 2.0, 3.0, 4.0], 1e-9);
    }

    #[test]
    fn savgol_too_short_passes_through() {
        let out = savgol(&[1.0, 2.0]);
        assert_eq!(out.pass_reason(), Some(PassReason::WindowBelowMinimum));

        let out = savgol(&[1.0]);
        assert_eq!(out.pass_reason(), Some(PassReason::TooShort));
    }

    #[test]
    fn savgol_preserves_length() {
        for n in [3usize, 5, 10, 30, 31, 32, 100] {
            let values: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
            assert_eq!(savgol(&values).values().len(), n);
        }
    }

    #[test]
    fn resolve_window_caps_and_odds() {
        assert_eq!(resolve_window(2), 1);
        assert_eq!(resolve_window(3), 3);
        assert_eq!(resolve_window(4), 3);
        assert_eq!(resolve_window(31), 31);
        assert_eq!(resolve_window(32), 31);
        assert_eq!(resolve_window(1000), 31);
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    #[test]
    fn smooth_dispatches_by_method() {
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();

        let ema_out = smooth(&values, SmoothMethod::Ema { window: 10 });
        assert!(ema_out.is_applied());

        let sg_out = smooth(&values, SmoothMethod::Savgol);
        assert!(sg_out.is_applied());
        // Linear data is degree-1: Savitzky–Golay leaves it intact.
        assert_all_approx(sg_out.values(), &values, 1e-6);
    }

    #[test]
    fn length_one_always_unchanged() {
        for method in [SmoothMethod::Ema { window: 10 }, SmoothMethod::Savgol] {
            let out = smooth(&[7.0], method);
            assert_eq!(out.pass_reason(), Some(PassReason::TooShort));
            assert_eq!(out.values(), &[7.0]);
        }
    }

    #[test]
    fn method_config_round_trips_through_tagged_form() {
        let json = serde_json::to_string(&SmoothMethod::Ema { window: 100 }).unwrap();
        assert!(json.contains("\"EMA\""));
        let back: SmoothMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SmoothMethod::Ema { window: 100 });
    }
}
