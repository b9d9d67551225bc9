//! The blocking part of a `/tts` request: synthesize, trim, write.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use tts_core::{collect_audio, write_temp_wav, SpeechPipeline, TrimSettings};

use crate::error::ApiError;
use crate::validation::validate_tts_request;

pub const DEFAULT_VOICE: &str = "af_heart";
pub const DEFAULT_SPEED: f32 = 1.2;

/// Body of `POST /tts` as sent by the client.
#[derive(Debug, Default, Deserialize)]
pub struct TtsRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<f32>,
}

/// A validated synthesis request with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    pub speed: f32,
}

impl TryFrom<TtsRequest> for SynthesisRequest {
    type Error = ApiError;

    fn try_from(req: TtsRequest) -> Result<Self, Self::Error> {
        let request = SynthesisRequest {
            text: req.text.unwrap_or_default(),
            voice: req.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            speed: req.speed.unwrap_or(DEFAULT_SPEED),
        };
        validate_tts_request(&request.text, request.speed)?;
        Ok(request)
    }
}

/// Run the pipeline to completion, trim the result and write it to a new WAV
/// file in `output_dir`. Blocks for the whole synthesis.
pub fn synthesize_to_file(
    pipeline: &dyn SpeechPipeline,
    request: &SynthesisRequest,
    trim: TrimSettings,
    output_dir: &Path,
) -> Result<PathBuf, ApiError> {
    let chunks = pipeline.synthesize(&request.text, &request.voice, request.speed)?;
    let audio = collect_audio(chunks)?;

    if audio.is_empty() {
        return Err(ApiError::NoAudioGenerated);
    }

    let sample_rate = pipeline.sample_rate();
    let trimmed = trim.apply(&audio, sample_rate);
    debug!(
        raw_samples = audio.len(),
        trimmed_samples = trimmed.len(),
        "Trimmed trailing silence"
    );

    Ok(write_temp_wav(output_dir, trimmed, sample_rate)?)
}
