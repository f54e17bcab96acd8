use std::cmp::Ordering;

/// RMS energy of each complete `frame_len`-sample frame. A trailing partial
/// frame is ignored.
pub fn frame_rms(waveform: &[f32], frame_len: usize) -> Vec<f64> {
    if frame_len == 0 {
        return Vec::new();
    }
    waveform
        .chunks_exact(frame_len)
        .map(|frame| {
            let sum_sq: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / frame_len as f64).sqrt()
        })
        .collect()
}

/// Fraction of frames whose energy is at or below the `percentile` energy.
/// Returns 0.0 when there are no frames.
pub fn pause_ratio(energies: &[f64], percentile: f64) -> f64 {
    if energies.is_empty() {
        return 0.0;
    }
    let mut sorted = energies.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let threshold = percentile_sorted(&sorted, percentile);
    let pauses = energies.iter().filter(|&&e| e <= threshold).count();
    pauses as f64 / energies.len() as f64
}

/// Linear-interpolated percentile over an ascending slice.
pub(crate) fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}
