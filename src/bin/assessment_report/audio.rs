use std::path::Path;

use claxon::FlacReader;
use hound::{SampleFormat, WavReader};

pub const MIN_DURATION_S: f64 = 0.2;
pub const MIN_RMS: f64 = 1e-4;

/// Why a case was not scored.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    TooShort { duration_ms: u64 },
    Silent { duration_ms: u64, rms: f64 },
    NoWords,
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "audio_too_short",
            Self::Silent { .. } => "audio_silent",
            Self::NoWords => "invalid_text",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::TooShort { duration_ms } => {
                format!("audio must be >= {MIN_DURATION_S}s, got {duration_ms} ms")
            }
            Self::Silent { rms, .. } => format!("audio level too low (rms {rms:.2e})"),
            Self::NoWords => "reference text contains no valid words".to_string(),
        }
    }
}

/// Decodes WAV or FLAC (by extension) and downmixes to mono.
pub fn read_audio_mono(path: &Path) -> Result<(u32, Vec<f32>), String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "wav" => read_wav_mono(path),
        "flac" => read_flac_mono(path),
        _ => Err(format!(
            "Unsupported audio format '{}' (expected .wav or .flac)",
            path.display()
        )),
    }
}

fn read_wav_mono(path: &Path) -> Result<(u32, Vec<f32>), String> {
    let mut reader = WavReader::open(path)
        .map_err(|err| format!("Failed to decode WAV '{}': {err}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(format!("WAV has zero channels: {}", path.display()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|err| format!("Failed reading sample from '{}': {err}", path.display()))?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample as i32);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|err| {
                    format!("Failed reading sample from '{}': {err}", path.display())
                })?
        }
    };
    Ok((spec.sample_rate, downmix(&interleaved, channels)))
}

fn read_flac_mono(path: &Path) -> Result<(u32, Vec<f32>), String> {
    let mut reader = FlacReader::open(path)
        .map_err(|err| format!("Failed to decode FLAC '{}': {err}", path.display()))?;
    let streaminfo = reader.streaminfo();
    let channels = streaminfo.channels as usize;
    let scale = int_scale(streaminfo.bits_per_sample as i32);
    let sample_rate_hz = streaminfo.sample_rate;

    if channels == 0 {
        return Err(format!("FLAC has zero channels: {}", path.display()));
    }

    let mut interleaved = Vec::new();
    for sample in reader.samples() {
        let sample = sample
            .map_err(|err| format!("Failed reading sample from '{}': {err}", path.display()))?;
        interleaved.push(sample as f32 / scale);
    }
    Ok((sample_rate_hz, downmix(&interleaved, channels)))
}

fn int_scale(bits_per_sample: i32) -> f32 {
    if bits_per_sample > 1 {
        ((1_i64 << (bits_per_sample - 1)) - 1) as f32
    } else {
        1.0
    }
}

/// Averages interleaved frames; a trailing partial frame is dropped.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear interpolation onto `target_hz`, holding the last sample past the end.
pub fn resample_linear(samples: &[f32], source_hz: u32, target_hz: u32) -> Vec<f32> {
    if source_hz == target_hz || samples.is_empty() || source_hz == 0 {
        return samples.to_vec();
    }
    let ratio = source_hz as f64 / target_hz as f64;
    let new_len = ((samples.len() as f64 / ratio).round() as usize).max(1);
    let last = samples.len() - 1;
    (0..new_len)
        .map(|j| {
            let pos = j as f64 * samples.len() as f64 / new_len as f64;
            let lower = (pos.floor() as usize).min(last);
            let upper = (lower + 1).min(last);
            let weight = (pos - lower as f64) as f32;
            samples[lower] * (1.0 - weight) + samples[upper] * weight
        })
        .collect()
}

/// Lowercases, turns every non-ASCII-letter into a separator and splits.
pub fn reference_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn duration_ms(sample_count: usize, sample_rate_hz: u32) -> u64 {
    if sample_rate_hz == 0 {
        0
    } else {
        ((sample_count as u128) * 1000 / sample_rate_hz as u128) as u64
    }
}

pub fn check_boundaries(
    samples: &[f32],
    sample_rate_hz: u32,
    words: &[String],
) -> Result<(), Rejection> {
    let duration_ms = duration_ms(samples.len(), sample_rate_hz);
    let min_samples = (MIN_DURATION_S * sample_rate_hz as f64) as usize;
    if samples.len() < min_samples || samples.is_empty() {
        return Err(Rejection::TooShort { duration_ms });
    }
    let rms = (samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>()
        / samples.len() as f64)
        .sqrt();
    if rms < MIN_RMS {
        return Err(Rejection::Silent { duration_ms, rms });
    }
    if words.is_empty() {
        return Err(Rejection::NoWords);
    }
    Ok(())
}
