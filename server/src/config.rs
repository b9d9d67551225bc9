// Configuration for the server, read from the environment

use std::{path::PathBuf, str::FromStr, time::Duration};

use tts_core::{KokoroConfig, TrimSettings};

pub const DEFAULT_PORT: u16 = 7892;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Load the model before accepting connections.
    pub preload: bool,
    pub output_dir: PathBuf,
    /// Age after which generated WAV files are swept. 0 keeps them forever.
    pub output_ttl_secs: u64,
    pub trim: TrimSettings,
    pub kokoro: KokoroConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            preload: true,
            output_dir: std::env::temp_dir(),
            output_ttl_secs: 0,
            trim: TrimSettings::default(),
            kokoro: KokoroConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or(get("KOKORO_PORT"), defaults.port);

        let preload = get("KOKORO_PRELOAD")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.preload);

        let output_dir = get("KOKORO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let output_ttl_secs = parse_or(get("KOKORO_OUTPUT_TTL_SECS"), defaults.output_ttl_secs);

        let trim = TrimSettings {
            threshold_db: parse_or(get("KOKORO_TRIM_THRESHOLD_DB"), defaults.trim.threshold_db),
            min_silence_ms: parse_or(get("KOKORO_TRIM_PAD_MS"), defaults.trim.min_silence_ms),
        };

        let kokoro = KokoroConfig {
            model_dir: get("KOKORO_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.kokoro.model_dir),
            lang_code: get("KOKORO_LANG_CODE")
                .and_then(|v| v.chars().next())
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or(defaults.kokoro.lang_code),
            provider: get("KOKORO_PROVIDER").unwrap_or(defaults.kokoro.provider),
            num_threads: parse_or(get("KOKORO_THREADS"), defaults.kokoro.num_threads),
        };

        Self {
            port,
            preload,
            output_dir,
            output_ttl_secs,
            trim,
            kokoro,
        }
    }

    pub fn output_ttl(&self) -> Option<Duration> {
        (self.output_ttl_secs > 0).then(|| Duration::from_secs(self.output_ttl_secs))
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
