/// Arithmetic mean of the given rating values, rounded to one decimal place
/// (round-half-up). An empty set yields 0 rather than failing; recomputed on
/// every call, never cached.
pub fn average(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: u32 = values.iter().map(|v| u32::from(*v)).sum();
    let mean = f64::from(sum) / values.len() as f64;
    (mean * 10.0).round() / 10.0
}
