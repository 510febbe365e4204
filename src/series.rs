// Series shaping: fixed-length windows from raw RRD lists, plus elementwise aggregation.
// All helpers are total: missing input yields zeros, never an error.

/// Fits a chronological series into exactly `len` samples.
/// Keeps the most recent `len` values; shorter input is zero-padded at the front
/// so the newest value stays last.
pub fn normalize(raw: &[f64], len: usize) -> Vec<f64> {
    if raw.len() >= len {
        return raw[raw.len() - len..].to_vec();
    }
    let mut out = vec![0.0; len - raw.len()];
    out.extend_from_slice(raw);
    out
}

/// Elementwise sum of already-normalized series. Empty input gives `len` zeros.
pub fn aggregate_sum<I, S>(series: I, len: usize) -> Vec<f64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[f64]>,
{
    sum_with_count(series, len).0
}

/// Elementwise mean of already-normalized series. Empty input gives `len` zeros.
pub fn aggregate_mean<I, S>(series: I, len: usize) -> Vec<f64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[f64]>,
{
    let (mut sum, count) = sum_with_count(series, len);
    if count == 0 {
        return sum;
    }
    let count = count as f64;
    sum.iter_mut().for_each(|v| *v /= count);
    sum
}

fn sum_with_count<I, S>(series: I, len: usize) -> (Vec<f64>, usize)
where
    I: IntoIterator<Item = S>,
    S: AsRef<[f64]>,
{
    let mut sum = vec![0.0; len];
    let mut count = 0;
    for s in series {
        for (acc, v) in sum.iter_mut().zip(s.as_ref()) {
            *acc += v;
        }
        count += 1;
    }
    (sum, count)
}

/// Per-sample used-memory percentage from paired normalized series.
/// A zero total yields 0; free > total is passed through as a negative value.
pub fn memory_used_percent(total: &[f64], free: &[f64]) -> Vec<f64> {
    total
        .iter()
        .zip(free)
        .map(|(&t, &f)| if t != 0.0 { (t - f) / t * 100.0 } else { 0.0 })
        .collect()
}
