//! Core speech pieces for the warm Kokoro server: the pipeline capability,
//! the Kokoro backend, trailing-silence trimming and WAV output.

pub mod kokoro;
pub mod pipeline;
pub mod trim;
pub mod voices;
pub mod wav;

pub use kokoro::{KokoroConfig, KokoroLoader, KokoroPipeline};
pub use pipeline::{collect_audio, PipelineLoader, SpeechChunk, SpeechChunks, SpeechPipeline};
pub use trim::{trim_silence, TrimSettings};
pub use wav::{write_temp_wav, write_wav};

/// Output sample rate of Kokoro and of every WAV file the server writes.
pub const SAMPLE_RATE: u32 = 24_000;
