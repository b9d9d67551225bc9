//! Trailing-silence trimming for synthesized utterances.
//!
//! Kokoro tends to leave a long tail of near-zero samples after the last
//! phoneme. Trimming keeps a short natural pause after the last audible sample
//! and drops the rest.

/// Length of the placeholder returned for an entirely silent buffer.
pub const SILENT_PLACEHOLDER_MS: u32 = 50;

/// Parameters for [`trim_silence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimSettings {
    /// Silence floor in dBFS (negative).
    pub threshold_db: f32,
    /// Pause retained after the last non-silent sample.
    pub min_silence_ms: u32,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            min_silence_ms: 50,
        }
    }
}

impl TrimSettings {
    pub fn apply<'a>(&self, audio: &'a [f32], sample_rate: u32) -> &'a [f32] {
        trim_silence(audio, sample_rate, self.threshold_db, self.min_silence_ms)
    }
}

/// Drop trailing silence from `audio`, keeping `min_silence_ms` of pad after
/// the last sample whose magnitude exceeds `threshold_db`.
///
/// A buffer with no audible sample is reduced to its first
/// [`SILENT_PLACEHOLDER_MS`] milliseconds rather than emptied.
pub fn trim_silence(audio: &[f32], sample_rate: u32, threshold_db: f32, min_silence_ms: u32) -> &[f32] {
    if audio.is_empty() {
        return audio;
    }

    let threshold = 10f32.powf(threshold_db / 20.0);

    let end = match audio.iter().rposition(|s| s.abs() > threshold) {
        Some(last_loud) => last_loud + 1 + samples_for(sample_rate, min_silence_ms),
        None => samples_for(sample_rate, SILENT_PLACEHOLDER_MS),
    };

    &audio[..end.min(audio.len())]
}

// floor(sample_rate * ms / 1000)
fn samples_for(sample_rate: u32, ms: u32) -> usize {
    (u64::from(sample_rate) * u64::from(ms) / 1000) as usize
}
