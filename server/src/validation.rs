use crate::error::ApiError;

/// Validate TTS request
pub fn validate_tts_request(text: &str, speed: f32) -> Result<(), ApiError> {
    if text.is_empty() {
        return Err(ApiError::MissingText);
    }

    if !speed.is_finite() || speed <= 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "Speed must be a positive number, got {}",
            speed
        )));
    }

    Ok(())
}
