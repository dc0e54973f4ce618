//! Cartela Announcer Core Library
//!
//! Batch-generates Amharic winner announcements for bingo cartelas by calling
//! a text-to-speech provider and writing one MP3 file per cartela number.

pub mod config;
pub mod error;
pub mod generator;
pub mod tts;

pub use config::{default_config, AnnouncementConfig, Config, RunConfig};
pub use error::GenerationError;
pub use generator::{BatchGenerator, EventCallback, GeneratorEvent, RunSummary};
pub use tts::{CloudTts, SpeechSynthesizer, TranslateTts};
