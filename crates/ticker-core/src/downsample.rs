// File: crates/ticker-core/src/downsample.rs
// Summary: Largest-Triangle-Three-Buckets downsampling for dense price series.

/// Indices of at most `threshold` points chosen by LTTB. First and last
/// points are always kept; indices are strictly increasing.
pub fn lttb_indices(points: &[(f64, f64)], threshold: usize) -> Vec<usize> {
    let n = points.len();
    if threshold == 0 || n == 0 { return Vec::new(); }
    if threshold >= n || n <= 2 { return (0..n).collect(); }
    if threshold == 1 { return vec![0]; }
    if threshold == 2 { return vec![0, n - 1]; }

    let bucket_size = (n - 2) as f64 / (threshold - 2) as f64;
    let mut picked = Vec::with_capacity(threshold);
    picked.push(0);

    let mut a = 0usize;
    for i in 0..(threshold - 2) {
        let start = (1.0 + i as f64 * bucket_size).floor() as usize;
        let end = ((1.0 + (i + 1) as f64 * bucket_size).floor() as usize).min(n - 1);

        // Average of the next bucket (the last point when this is the final bucket).
        let next_end = ((1.0 + (i + 2) as f64 * bucket_size).floor() as usize).min(n);
        let next = &points[end..next_end.max(end + 1).min(n)];
        let (sum_x, sum_y) = next.iter().fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
        let (avg_x, avg_y) = (sum_x / next.len() as f64, sum_y / next.len() as f64);

        let (a_x, a_y) = points[a];
        let mut max_area = -1.0f64;
        let mut max_idx = start;
        for (k, &(x, y)) in points.iter().enumerate().take(end.max(start + 1)).skip(start) {
            let area = ((a_x - avg_x) * (y - a_y) - (a_x - x) * (avg_y - a_y)).abs();
            if area > max_area {
                max_area = area;
                max_idx = k;
            }
        }
        picked.push(max_idx);
        a = max_idx;
    }

    picked.push(n - 1);
    picked
}

/// LTTB returning the selected points themselves.
pub fn lttb(points: &[(f64, f64)], threshold: usize) -> Vec<(f64, f64)> {
    lttb_indices(points, threshold).into_iter().map(|i| points[i]).collect()
}
