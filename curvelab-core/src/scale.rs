//! Value rescaling for normalized-score axes.

/// Rescaling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMethod {
    /// Map onto [0, 1] by range.
    MinMax,
    /// Zero mean, unit variance (population std).
    ZScore,
}

/// Rescale a sequence. Degenerate input (empty, flat range, zero variance)
/// returns the input unchanged, mirroring the smoother's pass-through policy.
pub fn rescale(values: &[f64], method: ScaleMethod) -> Vec<f64> {
    match method {
        ScaleMethod::MinMax => {
            let (Some(min), Some(max)) = (
                values.iter().copied().reduce(f64::min),
                values.iter().copied().reduce(f64::max),
            ) else {
                return values.to_vec();
            };
            if max <= min {
                return values.to_vec();
            }
            values.iter().map(|v| (v - min) / (max - min)).collect()
        }
        ScaleMethod::ZScore => {
            if values.is_empty() {
                return values.to_vec();
            }
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let var = values
                .iter()
                .map(|v| {
                    let d = v - mean;
                    d * d
                })
                .sum::<f64>()
                / values.len() as f64;
            let std = var.sqrt();
            if std <= 0.0 {
                return values.to_vec();
            }
            values.iter().map(|v| (v - mean) / std).collect()
        }
    }
}
