//! ElevenLabs cloud text-to-speech client

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::speech::output::{CloudSynthesizer, SynthesisRequest};
use crate::{Error, Result};

const API_BASE: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// Tuning knobs for the synthesized voice
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: None,
        }
    }
}

/// Synthesizes speech through the ElevenLabs API
///
/// Constructed without a key the client reports
/// [`Error::NotConfigured`] on every call; the output controller caches that
/// as a sticky flag and stops attempting the cloud path.
pub struct ElevenLabs {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    settings: VoiceSettings,
}

impl ElevenLabs {
    /// Create a new ElevenLabs client
    #[must_use]
    pub fn new(api_key: Option<SecretString>, model: impl Into<String>, settings: VoiceSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            settings,
        }
    }
}

#[async_trait]
impl CloudSynthesizer for ElevenLabs {
    /// Synthesize text to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] when no API key is set, and
    /// [`Error::Synthesis`] on API failures.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
            voice_settings: VoiceSettings,
            #[serde(skip_serializing_if = "Option::is_none")]
            language_code: Option<&'a str>,
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::NotConfigured("ElevenLabs API key not set".to_string()))?;

        let url = format!("{API_BASE}/{}", request.voice_id);
        let body = TtsRequest {
            text: &request.text,
            model_id: &self.model,
            voice_settings: self.settings,
            language_code: request.language.as_deref(),
        };

        tracing::debug!(
            voice = %request.voice_id,
            chars = request.text.len(),
            "requesting cloud synthesis"
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "ElevenLabs error {status}: {body}"
            )));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(Error::Synthesis("ElevenLabs returned no audio".to_string()));
        }

        tracing::debug!(bytes = audio.len(), "cloud synthesis complete");
        Ok(audio.to_vec())
    }
}
