//! Batch announcement generation.
//!
//! Walks the cartela number range, renders the announcement sentence for each
//! number, asks the TTS provider for audio and writes it to `<n>.mp3`. Item
//! failures are reported and skipped; the loop always covers the full range.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::error::GenerationError;
use crate::tts::SpeechSynthesizer;

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: u32,
    pub failed: u32,
}

impl RunSummary {
    /// Number of items attempted.
    pub fn total(&self) -> u32 {
        self.succeeded + self.failed
    }
}

/// Callback for generator events.
pub type EventCallback = Box<dyn Fn(GeneratorEvent) + Send + Sync>;

/// Events emitted while generating.
#[derive(Debug, Clone)]
pub enum GeneratorEvent {
    /// The run is starting.
    RunStart { start: u32, end: u32 },
    /// A progress checkpoint (every `progress_interval` generated items).
    Progress { generated: u32, total: u32 },
    /// Generation failed for one number; the run continues.
    ItemFailed { number: u32, detail: String },
    /// The run has finished.
    RunEnd { summary: RunSummary },
}

/// Generates one audio file per cartela number in the configured range.
pub struct BatchGenerator {
    config: Config,
    synthesizer: Box<dyn SpeechSynthesizer>,
    summary: RunSummary,
    callback: Option<EventCallback>,
}

impl BatchGenerator {
    /// Create a generator with the given configuration and TTS provider.
    pub fn new(
        config: Config,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> Result<Self, GenerationError> {
        config.validate()?;

        Ok(Self {
            config,
            synthesizer,
            summary: RunSummary::default(),
            callback: None,
        })
    }

    /// Set a callback for generator events.
    pub fn with_callback(mut self, callback: EventCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Run the full generation loop.
    ///
    /// Returns the final counters. The only fatal error is failure to create
    /// the output directory; everything after that is per-item and swallowed.
    pub async fn run(&mut self) -> Result<RunSummary, GenerationError> {
        tokio::fs::create_dir_all(&self.config.run.output_dir).await?;

        let start = self.config.run.start;
        let end = self.config.run.end;
        let total = end - start + 1;

        self.emit_event(GeneratorEvent::RunStart { start, end });

        for number in start..=end {
            match self.generate_one(number).await {
                Ok(()) => {
                    self.summary.succeeded += 1;

                    let generated = number - start + 1;
                    let interval = self.config.run.progress_interval;
                    if interval > 0 && generated % interval == 0 {
                        self.emit_event(GeneratorEvent::Progress { generated, total });
                    }

                    self.pause(self.config.run.item_delay_ms).await;
                }
                Err(e) => {
                    self.summary.failed += 1;
                    self.emit_event(GeneratorEvent::ItemFailed {
                        number,
                        detail: e.to_string(),
                    });

                    // Back off a little longer after an error; the usual cause
                    // is provider-side rate limiting.
                    self.pause(self.config.run.error_delay_ms).await;
                }
            }
        }

        self.emit_event(GeneratorEvent::RunEnd {
            summary: self.summary,
        });
        Ok(self.summary)
    }

    /// Render, synthesize and persist a single announcement.
    async fn generate_one(&self, number: u32) -> Result<(), GenerationError> {
        let text = self.config.render(number);
        let audio = self.synthesizer.synthesize(&text).await?;
        tokio::fs::write(self.output_path(number), audio).await?;
        Ok(())
    }

    /// Path of the MP3 file for a cartela number.
    pub fn output_path(&self, number: u32) -> PathBuf {
        Path::new(&self.config.run.output_dir).join(format!("{}.mp3", number))
    }

    async fn pause(&self, millis: u64) {
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: GeneratorEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    /// Counters so far.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnnouncementConfig, RunConfig};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Stub provider: echoes the rendered text as the audio payload, and can
    /// be told to fail whenever the text contains a given substring.
    struct StubSynthesizer {
        fail_when_contains: Option<String>,
        payload_prefix: String,
    }

    impl StubSynthesizer {
        fn ok() -> Self {
            Self {
                fail_when_contains: None,
                payload_prefix: "audio:".to_string(),
            }
        }

        fn failing_on(needle: &str) -> Self {
            Self {
                fail_when_contains: Some(needle.to_string()),
                payload_prefix: "audio:".to_string(),
            }
        }

        fn with_prefix(prefix: &str) -> Self {
            Self {
                fail_when_contains: None,
                payload_prefix: prefix.to_string(),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for StubSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, GenerationError> {
            if let Some(ref needle) = self.fail_when_contains {
                if text.contains(needle) {
                    return Err(GenerationError::Provider {
                        status: 429,
                        detail: "simulated failure".to_string(),
                    });
                }
            }
            Ok(format!("{}{}", self.payload_prefix, text).into_bytes())
        }
    }

    fn test_config(start: u32, end: u32, output_dir: &Path) -> Config {
        Config {
            run: RunConfig {
                start,
                end,
                output_dir: output_dir.to_string_lossy().into_owned(),
                progress_interval: 2,
                item_delay_ms: 0,
                error_delay_ms: 0,
            },
            announcement: AnnouncementConfig {
                template: "cartela {}".to_string(),
                language: "en".to_string(),
                slow: false,
            },
        }
    }

    fn temp_output_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("cartela-announcer-{}-{}", std::process::id(), tag));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn collecting_callback() -> (EventCallback, Arc<Mutex<Vec<GeneratorEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: EventCallback = Box::new(move |event| {
            sink.lock().unwrap().push(event);
        });
        (callback, events)
    }

    #[tokio::test]
    async fn test_full_run_writes_one_file_per_number() {
        let dir = temp_output_dir("full-run");
        let config = test_config(1, 5, &dir);
        let mut generator =
            BatchGenerator::new(config, Box::new(StubSynthesizer::ok())).unwrap();

        let summary = generator.run().await.unwrap();

        assert_eq!(summary, RunSummary { succeeded: 5, failed: 0 });
        for n in 1..=5u32 {
            let content = std::fs::read(dir.join(format!("{}.mp3", n))).unwrap();
            assert!(!content.is_empty());
            assert_eq!(content, format!("audio:cartela {}", n).into_bytes());
        }
    }

    #[tokio::test]
    async fn test_failed_item_is_skipped_and_run_continues() {
        let dir = temp_output_dir("skip-failed");
        let config = test_config(1, 5, &dir);
        let (callback, events) = collecting_callback();
        let mut generator =
            BatchGenerator::new(config, Box::new(StubSynthesizer::failing_on("cartela 3")))
                .unwrap()
                .with_callback(callback);

        let summary = generator.run().await.unwrap();

        assert_eq!(summary, RunSummary { succeeded: 4, failed: 1 });
        assert!(!dir.join("3.mp3").exists());
        for n in [1u32, 2, 4, 5] {
            assert!(dir.join(format!("{}.mp3", n)).exists());
        }

        let events = events.lock().unwrap();
        let failed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GeneratorEvent::ItemFailed { number, detail } => Some((*number, detail.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 3);
        assert!(failed[0].1.contains("429"));
    }

    #[tokio::test]
    async fn test_rerun_overwrites_existing_files() {
        let dir = temp_output_dir("rerun");

        let config = test_config(1, 3, &dir);
        let mut first =
            BatchGenerator::new(config.clone(), Box::new(StubSynthesizer::ok())).unwrap();
        first.run().await.unwrap();

        let mut second =
            BatchGenerator::new(config, Box::new(StubSynthesizer::with_prefix("v2:"))).unwrap();
        let summary = second.run().await.unwrap();

        assert_eq!(summary, RunSummary { succeeded: 3, failed: 0 });
        let content = std::fs::read(dir.join("2.mp3")).unwrap();
        assert_eq!(content, b"v2:cartela 2");
    }

    #[tokio::test]
    async fn test_progress_events_at_interval() {
        let dir = temp_output_dir("progress");
        let config = test_config(1, 6, &dir);
        let (callback, events) = collecting_callback();
        let mut generator = BatchGenerator::new(config, Box::new(StubSynthesizer::ok()))
            .unwrap()
            .with_callback(callback);

        generator.run().await.unwrap();

        let events = events.lock().unwrap();
        let checkpoints: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GeneratorEvent::Progress { generated, .. } => Some(*generated),
                _ => None,
            })
            .collect();
        assert_eq!(checkpoints, vec![2, 4, 6]);

        assert!(matches!(events.first(), Some(GeneratorEvent::RunStart { start: 1, end: 6 })));
        match events.last() {
            Some(GeneratorEvent::RunEnd { summary }) => {
                assert_eq!(summary.total(), 6);
            }
            other => panic!("expected RunEnd, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unusable_output_directory_aborts_run() {
        // Nest the output directory under a plain file so create_dir_all
        // cannot succeed.
        let blocker = temp_output_dir("blocked");
        std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        std::fs::write(&blocker, b"not a directory").unwrap();

        let dir = blocker.join("cartelas");
        let config = test_config(1, 3, &dir);
        let mut generator =
            BatchGenerator::new(config, Box::new(StubSynthesizer::ok())).unwrap();

        let err = generator.run().await.unwrap_err();

        assert!(matches!(err, GenerationError::Io(_)));
        assert_eq!(generator.summary(), RunSummary::default());
    }

    #[tokio::test]
    async fn test_output_directory_created_recursively() {
        let dir = temp_output_dir("nested").join("a").join("b");
        let config = test_config(1, 1, &dir);
        let mut generator =
            BatchGenerator::new(config, Box::new(StubSynthesizer::ok())).unwrap();

        generator.run().await.unwrap();

        assert!(dir.join("1.mp3").exists());
    }
}
