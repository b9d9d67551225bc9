//! Kokoro speech pipeline backed by sherpa-onnx.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use sherpa_rs::tts::{CommonTtsConfig, KokoroTts, KokoroTtsConfig};
use sherpa_rs::OnnxConfig;
use tracing::{debug, info, warn};

use crate::pipeline::{PipelineLoader, SpeechChunk, SpeechChunks, SpeechPipeline};
use crate::voices::{get_voice, voice_names};
use crate::SAMPLE_RATE;

/// Where and how to load the Kokoro model.
#[derive(Debug, Clone, PartialEq)]
pub struct KokoroConfig {
    /// Directory holding `model.onnx`, `voices.bin`, `tokens.txt`,
    /// `espeak-ng-data/`, `dict/` and the lexicon files.
    pub model_dir: PathBuf,
    /// Kokoro language code: `a` American English, `b` British English,
    /// `e` Spanish, `f` French, `h` Hindi, `i` Italian, `j` Japanese,
    /// `p` Brazilian Portuguese, `z` Mandarin Chinese.
    pub lang_code: char,
    /// onnxruntime execution provider (`cpu`, `cuda`, `coreml`).
    pub provider: String,
    pub num_threads: i32,
}

impl Default for KokoroConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/kokoro-multi-lang-v1_0"),
            lang_code: 'a',
            provider: "cpu".to_string(),
            num_threads: 2,
        }
    }
}

impl KokoroConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join("model.onnx")
    }

    pub fn voices_path(&self) -> PathBuf {
        self.model_dir.join("voices.bin")
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.model_dir.join("tokens.txt")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.model_dir.join("espeak-ng-data")
    }

    pub fn dict_dir(&self) -> PathBuf {
        self.model_dir.join("dict")
    }

    /// Lexicon files for the language, empty for languages phonemized by
    /// espeak-ng.
    pub fn lexicon_paths(&self) -> Vec<PathBuf> {
        match self.lang_code {
            'a' => vec![self.model_dir.join("lexicon-us-en.txt")],
            'b' => vec![self.model_dir.join("lexicon-gb-en.txt")],
            // Mandarin with English fallback
            'z' => vec![
                self.model_dir.join("lexicon-us-en.txt"),
                self.model_dir.join("lexicon-zh.txt"),
            ],
            _ => Vec::new(),
        }
    }

    /// espeak-ng language for languages without a lexicon.
    pub fn espeak_lang(&self) -> &'static str {
        match self.lang_code {
            'e' => "es",
            'f' => "fr",
            'h' => "hi",
            'i' => "it",
            'j' => "ja",
            'p' => "pt-br",
            _ => "",
        }
    }

    /// Check that the language code is known and that every model file is
    /// present. sherpa-onnx aborts the process on missing files, so this has
    /// to run before the engine is built.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !"abefhijpz".contains(self.lang_code) {
            anyhow::bail!("Unsupported Kokoro language code: {}", self.lang_code);
        }

        if !self.model_dir.is_dir() {
            anyhow::bail!("Model directory does not exist: {}", self.model_dir.display());
        }

        let mut required = vec![
            self.model_path(),
            self.voices_path(),
            self.tokens_path(),
            self.data_dir(),
        ];
        required.extend(self.lexicon_paths());

        for path in &required {
            if !path.exists() {
                anyhow::bail!("Required model file not found: {}", path.display());
            }
        }

        if self.num_threads < 1 {
            anyhow::bail!("Thread count must be at least 1");
        }

        Ok(())
    }

    fn to_sherpa(&self) -> KokoroTtsConfig {
        let lexicon = self
            .lexicon_paths()
            .iter()
            .map(|p| path_string(p))
            .collect::<Vec<_>>()
            .join(",");

        KokoroTtsConfig {
            model: path_string(&self.model_path()),
            voices: path_string(&self.voices_path()),
            tokens: path_string(&self.tokens_path()),
            data_dir: path_string(&self.data_dir()),
            dict_dir: path_string(&self.dict_dir()),
            lexicon,
            lang: self.espeak_lang().to_string(),
            // Speed is applied per request instead.
            length_scale: 1.0,
            onnx_config: OnnxConfig {
                provider: self.provider.clone(),
                num_threads: self.num_threads,
                debug: false,
            },
            // Kokoro only supports 1
            common_config: CommonTtsConfig {
                max_num_sentences: 1,
                ..Default::default()
            },
        }
    }
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().to_string()
}

/// A loaded Kokoro model.
///
/// The sherpa engine needs exclusive access per call, so synthesis is
/// serialized through a mutex.
pub struct KokoroPipeline {
    tts: Mutex<KokoroTts>,
    lang_code: char,
}

impl KokoroPipeline {
    pub fn load(config: &KokoroConfig) -> anyhow::Result<Self> {
        config.validate()?;

        info!(
            model_dir = %config.model_dir.display(),
            lang_code = %config.lang_code,
            provider = %config.provider,
            "Initializing Kokoro pipeline"
        );
        let tts = KokoroTts::new(config.to_sherpa());

        Ok(Self {
            tts: Mutex::new(tts),
            lang_code: config.lang_code,
        })
    }

    fn synthesize_sentence(&self, sentence: &str, speaker_id: i32, speed: f32) -> anyhow::Result<Vec<f32>> {
        let mut tts = self
            .tts
            .lock()
            .map_err(|_| anyhow::anyhow!("Kokoro engine lock poisoned - this indicates a previous panic. Please restart the server."))?;

        let audio = tts
            .create(sentence, speaker_id, speed)
            .map_err(|e| anyhow::anyhow!("kokoro synth error: {e}"))?;

        debug!(samples = audio.samples.len(), "Synthesized sentence");
        Ok(audio.samples)
    }
}

impl SpeechPipeline for KokoroPipeline {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn synthesize<'a>(&'a self, text: &'a str, voice: &'a str, speed: f32) -> anyhow::Result<SpeechChunks<'a>> {
        let entry = get_voice(voice).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown voice '{}'. Available voices: {}",
                voice,
                voice_names().collect::<Vec<_>>().join(", ")
            )
        })?;
        if !entry.is_native_to(self.lang_code) {
            warn!(
                voice,
                language = entry.language,
                lang_code = %self.lang_code,
                "Voice language differs from the loaded pipeline language"
            );
        }
        let speaker_id = entry.speaker_id;

        let chunks = split_sentences(text).into_iter().map(move |sentence| {
            let audio = self.synthesize_sentence(&sentence, speaker_id, speed)?;
            Ok(SpeechChunk {
                graphemes: sentence,
                phonemes: None,
                audio,
            })
        });

        Ok(Box::new(chunks))
    }
}

/// Loads a [`KokoroPipeline`] from a fixed configuration.
#[derive(Debug, Clone)]
pub struct KokoroLoader {
    config: KokoroConfig,
}

impl KokoroLoader {
    pub fn new(config: KokoroConfig) -> Self {
        Self { config }
    }
}

impl PipelineLoader for KokoroLoader {
    fn load(&self) -> anyhow::Result<Arc<dyn SpeechPipeline>> {
        Ok(Arc::new(KokoroPipeline::load(&self.config)?))
    }
}

/// Split text into sentences, one synthesis chunk each.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);

        if c == '.' || c == '!' || c == '?' || c == '\n' {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scaffold_model_dir(lang_code: char) -> (tempfile::TempDir, KokoroConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = KokoroConfig {
            model_dir: dir.path().to_path_buf(),
            lang_code,
            ..Default::default()
        };
        for file in [config.model_path(), config.voices_path(), config.tokens_path()] {
            fs::write(file, b"").unwrap();
        }
        fs::create_dir(config.data_dir()).unwrap();
        for lexicon in config.lexicon_paths() {
            fs::write(lexicon, b"").unwrap();
        }
        (dir, config)
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Hello there. How are you?  Fine!"),
            vec!["Hello there.", "How are you?", "Fine!"]
        );
        assert_eq!(split_sentences("line one\nline two"), vec!["line one", "line two"]);
        assert_eq!(split_sentences("no terminator"), vec!["no terminator"]);
        assert!(split_sentences("  \n ").is_empty());
    }

    #[test]
    fn test_lexicon_and_espeak_by_language() {
        let american = KokoroConfig::default();
        assert_eq!(american.lexicon_paths().len(), 1);
        assert!(american.lexicon_paths()[0].ends_with("lexicon-us-en.txt"));
        assert_eq!(american.espeak_lang(), "");

        let mandarin = KokoroConfig { lang_code: 'z', ..Default::default() };
        assert_eq!(mandarin.lexicon_paths().len(), 2);

        let spanish = KokoroConfig { lang_code: 'e', ..Default::default() };
        assert!(spanish.lexicon_paths().is_empty());
        assert_eq!(spanish.espeak_lang(), "es");
    }

    #[test]
    fn test_sherpa_config_joins_lexicons() {
        let mandarin = KokoroConfig { lang_code: 'z', ..Default::default() };
        let sherpa = mandarin.to_sherpa();
        assert_eq!(sherpa.lexicon.split(',').count(), 2);
        assert_eq!(sherpa.length_scale, 1.0);
    }

    #[test]
    fn test_validate_complete_model_dir() {
        let (_dir, config) = scaffold_model_dir('a');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_dir() {
        let config = KokoroConfig {
            model_dir: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_missing_lexicon() {
        let (_dir, config) = scaffold_model_dir('a');
        let british = KokoroConfig { lang_code: 'b', ..config };
        let err = british.validate().unwrap_err();
        assert!(err.to_string().contains("lexicon-gb-en.txt"));
    }

    #[test]
    fn test_validate_unknown_language() {
        let (_dir, config) = scaffold_model_dir('a');
        let bogus = KokoroConfig { lang_code: 'q', ..config };
        assert!(bogus.validate().is_err());
    }

    #[test]
    fn test_loader_reports_missing_model() {
        let loader = KokoroLoader::new(KokoroConfig {
            model_dir: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        });
        assert!(loader.load().is_err());
    }
}
