//! Speech input and output
//!
//! Input: a continuous recognizer behind [`SpeechInputController`], with
//! finalized transcripts debounced so each utterance is handled exactly once.
//! Output: [`SpeechOutputController`] drives cloud synthesis with a local
//! fallback and plays through an [`AudioSink`].

pub mod debounce;
pub mod elevenlabs;
pub mod input;
pub mod local;
pub mod output;
pub mod playback;

pub use debounce::{DEFAULT_QUIET_PERIOD, DebounceHandle, debounced};
pub use elevenlabs::{ElevenLabs, VoiceSettings};
pub use input::{LANGUAGE_SETTLE_DELAY, Recognizer, RecognizerEvent, SpeechInputController};
pub use local::{EspeakLocal, LocalOutcome, LocalSynthesizer};
pub use output::{
    AudioSink, CloudSynthesizer, OutputOptions, SpeechOutputController, SynthesisRequest,
};
pub use playback::CpalSink;

/// Map a short language code to a recognition/synthesis locale
///
/// Codes already carrying a region pass through unchanged; unknown codes
/// default to US English.
#[must_use]
pub fn locale_for(language: &str) -> String {
    if language.contains('-') {
        return language.to_string();
    }

    let locale = match language.to_lowercase().as_str() {
        "es" => "es-ES",
        "fr" => "fr-FR",
        "de" => "de-DE",
        "it" => "it-IT",
        "pt" => "pt-BR",
        "ja" => "ja-JP",
        "ko" => "ko-KR",
        "zh" => "zh-CN",
        "hi" => "hi-IN",
        "ar" => "ar-SA",
        "ru" => "ru-RU",
        _ => "en-US",
    };

    locale.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_for_known_languages() {
        assert_eq!(locale_for("en"), "en-US");
        assert_eq!(locale_for("es"), "es-ES");
        assert_eq!(locale_for("zh"), "zh-CN");
    }

    #[test]
    fn test_locale_for_passes_through_full_locales() {
        assert_eq!(locale_for("en-GB"), "en-GB");
        assert_eq!(locale_for("pt-PT"), "pt-PT");
    }

    #[test]
    fn test_locale_for_unknown_defaults_to_english() {
        assert_eq!(locale_for("tlh"), "en-US");
    }
}
