// File: crates/ticker-core/src/grid.rs
// Summary: Tick layout helpers ("nice" value ticks, label skipping).

/// Round `range` to 1, 2, 5 or 10 times a power of ten.
fn nice_number(range: f64, round: bool) -> f64 {
    let exponent = range.log10().floor();
    let fraction = range / 10f64.powf(exponent);
    let nice = if round {
        if fraction < 1.5 { 1.0 } else if fraction < 3.0 { 2.0 } else if fraction < 7.0 { 5.0 } else { 10.0 }
    } else if fraction <= 1.0 { 1.0 } else if fraction <= 2.0 { 2.0 } else if fraction <= 5.0 { 5.0 } else { 10.0 };
    nice * 10f64.powf(exponent)
}

/// Tick values covering `[min, max]` with roughly `max_ticks` round steps.
/// Returns `(ticks, nice_min, nice_max)`.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> (Vec<f64>, f64, f64) {
    let (mut lo, mut hi) = if min <= max { (min, max) } else { (max, min) };
    if !(lo.is_finite() && hi.is_finite()) {
        return (vec![0.0, 1.0], 0.0, 1.0);
    }
    if (hi - lo).abs() < 1e-12 {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        lo -= pad;
        hi += pad;
    }
    let max_ticks = max_ticks.max(2);
    let range = nice_number(hi - lo, false);
    let step = nice_number(range / (max_ticks - 1) as f64, true);
    let nice_min = (lo / step).floor() * step;
    let nice_max = (hi / step).ceil() * step;
    let count = ((nice_max - nice_min) / step).round() as usize + 1;
    let ticks = (0..count).map(|i| nice_min + step * i as f64).collect();
    (ticks, nice_min, nice_max)
}

/// Indices of labels to show so that at most `max_labels` appear, evenly
/// strided from the first label.
pub fn skip_labels(count: usize, max_labels: usize) -> Vec<usize> {
    if count == 0 || max_labels == 0 { return Vec::new(); }
    let stride = count.div_ceil(max_labels).max(1);
    (0..count).step_by(stride).collect()
}
