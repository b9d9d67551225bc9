//! Lazily loaded, warm pipeline shared by every request.

use std::{sync::Arc, time::Instant};

use tokio::sync::OnceCell;
use tracing::info;
use tts_core::{PipelineLoader, SpeechPipeline};

/// Holds the pipeline once loaded. The transition from unloaded to loaded
/// happens at most once and is never reversed.
pub struct PipelineHandle {
    loader: Arc<dyn PipelineLoader>,
    pipeline: OnceCell<Arc<dyn SpeechPipeline>>,
}

impl std::fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PipelineHandle {
    pub fn new<L: PipelineLoader + 'static>(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            pipeline: OnceCell::new(),
        }
    }

    /// Whether the pipeline is loaded. Never triggers a load.
    pub fn is_loaded(&self) -> bool {
        self.pipeline.initialized()
    }

    /// Return the pipeline, loading it on first use.
    ///
    /// Concurrent callers wait on the same load. A failed load leaves the
    /// handle unloaded so the next call retries.
    pub async fn get_or_load(&self) -> anyhow::Result<Arc<dyn SpeechPipeline>> {
        let pipeline = self
            .pipeline
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                let started = Instant::now();

                let pipeline = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .map_err(|e| anyhow::anyhow!("Pipeline load task failed: {e}"))??;

                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    sample_rate = pipeline.sample_rate(),
                    "Speech pipeline loaded"
                );
                Ok::<_, anyhow::Error>(pipeline)
            })
            .await?;

        Ok(Arc::clone(pipeline))
    }
}
