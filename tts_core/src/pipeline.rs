//! The speech pipeline capability the server drives.
//!
//! A pipeline turns `(text, voice, speed)` into a lazy, finite sequence of
//! [`SpeechChunk`]s. Loading one is expensive, which is why the server keeps a
//! single instance warm behind a [`PipelineLoader`].

use std::sync::Arc;

/// One synthesized sub-segment of the input text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechChunk {
    /// Source text of the segment.
    pub graphemes: String,
    /// Phoneme string, when the backend exposes it.
    pub phonemes: Option<String>,
    pub audio: Vec<f32>,
}

pub type SpeechChunks<'a> = Box<dyn Iterator<Item = anyhow::Result<SpeechChunk>> + Send + 'a>;

pub trait SpeechPipeline: Send + Sync {
    /// Sample rate of every chunk this pipeline yields.
    fn sample_rate(&self) -> u32;

    /// Start synthesizing `text`. Chunks are produced as the returned
    /// iterator is advanced.
    fn synthesize<'a>(&'a self, text: &'a str, voice: &'a str, speed: f32) -> anyhow::Result<SpeechChunks<'a>>;
}

/// Builds a pipeline. Called at most once per successful load.
pub trait PipelineLoader: Send + Sync {
    fn load(&self) -> anyhow::Result<Arc<dyn SpeechPipeline>>;
}

impl<F> PipelineLoader for F
where
    F: Fn() -> anyhow::Result<Arc<dyn SpeechPipeline>> + Send + Sync,
{
    fn load(&self) -> anyhow::Result<Arc<dyn SpeechPipeline>> {
        self()
    }
}

/// Drain `chunks`, concatenating their audio. Stops at the first failed chunk.
pub fn collect_audio<I>(chunks: I) -> anyhow::Result<Vec<f32>>
where
    I: IntoIterator<Item = anyhow::Result<SpeechChunk>>,
{
    let mut samples = Vec::new();
    for chunk in chunks {
        samples.extend(chunk?.audio);
    }
    Ok(samples)
}
