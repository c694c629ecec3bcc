/// Map raw index distances onto a [0, 1] similarity scale where 1.0 is the
/// best match in the set.
///
/// Min-max scaled and inverted per query, then clamped against
/// floating-point drift. All-equal distances map to all 1.0 (ties are
/// treated as maximal confidence rather than dividing by zero).
///
/// This is query-local normalization: the output reflects relative rank
/// within one query's result set only. Similarity scores are NOT comparable
/// across different questions.
pub fn normalize_distances(distances: &[f64]) -> Vec<f64> {
    if distances.is_empty() {
        return Vec::new();
    }
    let mut d_min = f64::INFINITY;
    let mut d_max = f64::NEG_INFINITY;
    for &d in distances {
        d_min = d_min.min(d);
        d_max = d_max.max(d);
    }
    if d_max - d_min <= f64::EPSILON {
        return vec![1.0; distances.len()];
    }
    distances
        .iter()
        .map(|&d| {
            let sim = 1.0 - (d - d_min) / (d_max - d_min);
            sim.clamp(0.0, 1.0)
        })
        .collect()
}
