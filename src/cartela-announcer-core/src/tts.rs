//! TTS provider clients.
//!
//! Two providers are supported: the unauthenticated Google Translate TTS
//! endpoint (the same one the `gtts` tooling speaks to) and the Google Cloud
//! Text-to-Speech REST API, which needs an API key. Both return MP3 bytes.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GenerationError;

/// Default base URL for the Translate TTS endpoint.
pub const TRANSLATE_TTS_BASE_URL: &str = "https://translate.google.com";

/// Default base URL for the Cloud Text-to-Speech API.
pub const CLOUD_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A text-to-speech provider producing encoded audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the encoded audio payload.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, GenerationError>;
}

fn build_http_client() -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| GenerationError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Keep provider error bodies short enough for a single console line.
fn truncate_detail(detail: String) -> String {
    const MAX: usize = 200;
    if detail.chars().count() > MAX {
        detail.chars().take(MAX).collect()
    } else {
        detail
    }
}

/// Client for the unauthenticated Google Translate TTS endpoint.
pub struct TranslateTts {
    client: reqwest::Client,
    base_url: String,
    language: String,
    slow: bool,
}

impl TranslateTts {
    /// Create a client for the given language code.
    pub fn new(language: impl Into<String>, slow: bool) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_http_client()?,
            base_url: TRANSLATE_TTS_BASE_URL.to_string(),
            language: language.into(),
            slow,
        })
    }

    /// Override the endpoint base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, GenerationError> {
        let textlen = text.chars().count().to_string();
        // The endpoint rejects requests without the tw-ob client identifier.
        let speed = if self.slow { "0.24" } else { "1" };

        let response = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.language.as_str()),
                ("q", text),
                ("textlen", textlen.as_str()),
                ("ttsspeed", speed),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                detail: truncate_detail(detail),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyAudio);
        }

        Ok(bytes.to_vec())
    }
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Client for the Google Cloud Text-to-Speech REST API.
pub struct CloudTts {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language_code: String,
    voice_name: Option<String>,
}

impl CloudTts {
    /// Create a client for a BCP-47 language code (e.g. `am-ET`) and an
    /// optional named voice (e.g. `am-ET-Standard-B`).
    pub fn new(
        language_code: impl Into<String>,
        voice_name: Option<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(GenerationError::ConfigError(
                "Cloud TTS requires an API key".to_string(),
            ));
        }

        Ok(Self {
            client: build_http_client()?,
            base_url: CLOUD_TTS_BASE_URL.to_string(),
            api_key,
            language_code: language_code.into(),
            voice_name,
        })
    }

    /// Override the endpoint base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for CloudTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, GenerationError> {
        let request = SynthesizeRequest {
            input: TextInput { text },
            voice: VoiceSelection {
                language_code: &self.language_code,
                name: self.voice_name.as_deref(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: 0.9,
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/text:synthesize", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                detail: truncate_detail(detail),
            });
        }

        let body: SynthesizeResponse = response.json().await?;
        let audio = base64::engine::general_purpose::STANDARD.decode(&body.audio_content)?;
        if audio.is_empty() {
            return Err(GenerationError::EmptyAudio);
        }

        Ok(audio)
    }
}
