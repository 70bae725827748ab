//! Ladle Voice - Voice interaction layer for a recipe discovery assistant
//!
//! This library provides the voice subsystem for Ladle:
//! - Intent parsing (transcript → structured command)
//! - Conversation context tracking with topic expiry
//! - Speech input (recognizer control, transcript debouncing)
//! - Speech output (cloud TTS with caching and local fallback)
//! - Ingredient lexicon with pairing suggestions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Speech Input                        │
//! │   Recognizer  │  Debounce  │  Language switching    │
//! └────────────────────┬────────────────────────────────┘
//!                      │ transcript
//! ┌────────────────────▼────────────────────────────────┐
//! │            Intent Parser + Context                   │
//! │   Rule cascade  │  Lexicon  │  Topic tracking       │
//! └────────────────────┬────────────────────────────────┘
//!                      │ Command
//! ┌────────────────────▼────────────────────────────────┐
//! │          Dispatcher (application seam)               │
//! └────────────────────┬────────────────────────────────┘
//!                      │ reply text
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Speech Output                        │
//! │   Cloud TTS  │  Audio cache  │  Local fallback      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod lexicon;
pub mod speech;

pub use config::Config;
pub use context::{ConversationState, ConversationTracker, SessionPreferences};
pub use dispatch::{CommandDispatcher, EchoDispatcher};
pub use error::{Error, Result};
pub use intent::{Action, Command, ConversationContext, Preferences, parse};
pub use lexicon::{Category, Lexicon, LexiconEntry};
pub use speech::{
    AudioSink, CloudSynthesizer, CpalSink, ElevenLabs, EspeakLocal, LocalSynthesizer,
    OutputOptions, Recognizer, RecognizerEvent, SpeechInputController, SpeechOutputController,
    VoiceSettings,
};
