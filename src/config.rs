//! Configuration for the voice subsystem
//!
//! Layered env > TOML > default. The TOML file is a partial overlay; every
//! field is optional. The ElevenLabs key is env-only (`ELEVENLABS_API_KEY`)
//! and is held as a [`SecretString`] so it never appears in debug output.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::speech::VoiceSettings;
use crate::{Error, Result};

/// Default ElevenLabs voice (multilingual, conversational)
const DEFAULT_VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";

/// Default ElevenLabs model
const DEFAULT_MODEL: &str = "eleven_turbo_v2_5";

/// Voice subsystem configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Recognition and synthesis language code (e.g. "en", "es")
    pub language: String,

    /// Cloud voice configuration
    pub voice: VoiceConfig,

    /// ElevenLabs API key (`ELEVENLABS_API_KEY` env var only)
    pub elevenlabs_api_key: Option<SecretString>,

    /// Whether to try cloud synthesis before the local engine
    pub prefer_cloud: bool,

    /// Transcript debounce quiet period
    pub debounce: Duration,

    /// Conversation topic expiry window
    pub context_ttl: Duration,

    /// Synthesized-audio cache capacity
    pub cache_entries: usize,

    /// Local synthesis engine configuration
    pub local: LocalConfig,
}

/// Cloud voice selection and tuning
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// ElevenLabs voice identifier
    pub voice_id: String,

    /// ElevenLabs model identifier
    pub model: String,

    /// Stability/similarity/style tuning
    pub settings: VoiceSettings,
}

/// Local synthesis engine configuration
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Engine program name (e.g. "espeak")
    pub program: String,

    /// Speaking rate in words per minute
    pub rate: u32,

    /// Pitch, 0-99
    pub pitch: u32,

    /// Amplitude, 0-200
    pub volume: u32,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            program: "espeak".to_string(),
            rate: 175,
            pitch: 50,
            volume: 100,
        }
    }
}

/// TOML configuration file schema (partial overlay)
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    language: Option<String>,

    #[serde(default)]
    prefer_cloud: Option<bool>,

    #[serde(default)]
    debounce_ms: Option<u64>,

    #[serde(default)]
    context_ttl_ms: Option<u64>,

    #[serde(default)]
    cache_entries: Option<usize>,

    #[serde(default)]
    voice: VoiceFileConfig,

    #[serde(default)]
    local: LocalFileConfig,
}

#[derive(Debug, Default, Deserialize)]
struct VoiceFileConfig {
    voice_id: Option<String>,
    model: Option<String>,
    stability: Option<f32>,
    similarity_boost: Option<f32>,
    style: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct LocalFileConfig {
    program: Option<String>,
    rate: Option<u32>,
    pitch: Option<u32>,
    volume: Option<u32>,
}

impl Config {
    /// Load configuration, optionally overlaying a TOML file
    ///
    /// With no explicit path, `LADLE_CONFIG` names the file; with neither,
    /// only env vars and defaults apply.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly named file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = match path {
            Some(path) => Self::read_file(path)?,
            None => match std::env::var("LADLE_CONFIG") {
                Ok(path) => Self::read_file(Path::new(&path))?,
                Err(_) => ConfigFile::default(),
            },
        };

        let language = std::env::var("LADLE_LANGUAGE")
            .ok()
            .or(fc.language)
            .unwrap_or_else(|| "en".to_string());

        let voice = VoiceConfig {
            voice_id: std::env::var("LADLE_VOICE_ID")
                .ok()
                .or(fc.voice.voice_id)
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            model: std::env::var("LADLE_TTS_MODEL")
                .ok()
                .or(fc.voice.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            settings: VoiceSettings {
                stability: fc.voice.stability.unwrap_or(0.5),
                similarity_boost: fc.voice.similarity_boost.unwrap_or(0.75),
                style: fc.voice.style,
            },
        };

        let elevenlabs_api_key = std::env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        let prefer_cloud = std::env::var("LADLE_PREFER_CLOUD")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .or(fc.prefer_cloud)
            .unwrap_or(true);

        let debounce = Duration::from_millis(
            std::env::var("LADLE_DEBOUNCE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.debounce_ms)
                .unwrap_or(1000),
        );

        let context_ttl = Duration::from_millis(
            std::env::var("LADLE_CONTEXT_TTL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.context_ttl_ms)
                .unwrap_or(5000),
        );

        let cache_entries = fc.cache_entries.unwrap_or(32);

        let local = {
            let default = LocalConfig::default();
            LocalConfig {
                program: std::env::var("LADLE_LOCAL_TTS")
                    .ok()
                    .or(fc.local.program)
                    .unwrap_or(default.program),
                rate: fc.local.rate.unwrap_or(default.rate),
                pitch: fc.local.pitch.unwrap_or(default.pitch),
                volume: fc.local.volume.unwrap_or(default.volume),
            }
        };

        Ok(Self {
            language,
            voice,
            elevenlabs_api_key,
            prefer_cloud,
            debounce,
            context_ttl,
            cache_entries,
            local,
        })
    }

    fn read_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let fc = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        Ok(fc)
    }
}
