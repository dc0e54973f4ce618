//! Cartela Announcer CLI
//!
//! Batch-generates the Amharic "winning cartela" announcement clips used by
//! the bingo client: one MP3 per cartela number, fetched from a
//! text-to-speech provider.

use cartela_announcer_core::{
    default_config, BatchGenerator, CloudTts, Config, GeneratorEvent, SpeechSynthesizer,
    TranslateTts,
};
use clap::Parser;
use colored::Colorize;
use std::env;

#[derive(Parser)]
#[command(
    name = "cartela-announcer",
    version,
    about = "Generate winner announcement audio for bingo cartelas",
    long_about = "Batch-generates one MP3 announcement per cartela number by rendering a \
                  sentence template and sending it to a text-to-speech provider."
)]
struct Cli {
    /// Path to a TOML config file (compiled-in defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// First cartela number (inclusive)
    #[arg(long, value_name = "N")]
    start: Option<u32>,

    /// Last cartela number (inclusive)
    #[arg(long, value_name = "N")]
    end: Option<u32>,

    /// Output directory for the MP3 files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Language code passed to the provider
    #[arg(short, long, value_name = "CODE")]
    language: Option<String>,

    /// Announcement template; must contain {} exactly once
    #[arg(short, long, value_name = "TEMPLATE")]
    template: Option<String>,

    /// Ask the provider for slow speech
    #[arg(long)]
    slow: bool,

    /// TTS provider: "translate" (no key needed) or "cloud" (needs GOOGLE_TTS_API_KEY)
    #[arg(short, long, default_value = "translate", value_name = "PROVIDER")]
    provider: String,

    /// Named voice for the cloud provider (e.g. am-ET-Standard-B)
    #[arg(long, value_name = "VOICE")]
    voice: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Start from the config file or the compiled-in defaults, then apply
    // command-line overrides.
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => default_config(),
    };

    if let Some(start) = cli.start {
        config.run.start = start;
    }
    if let Some(end) = cli.end {
        config.run.end = end;
    }
    if let Some(ref output_dir) = cli.output_dir {
        config.run.output_dir = output_dir.clone();
    }
    if let Some(ref language) = cli.language {
        config.announcement.language = language.clone();
    }
    if let Some(ref template) = cli.template {
        config.announcement.template = template.clone();
    }
    if cli.slow {
        config.announcement.slow = true;
    }

    let synthesizer: Box<dyn SpeechSynthesizer> = match cli.provider.as_str() {
        "translate" => Box::new(TranslateTts::new(
            &config.announcement.language,
            config.announcement.slow,
        )?),
        "cloud" => {
            let api_key = env::var("GOOGLE_TTS_API_KEY").unwrap_or_default();
            if api_key.is_empty() {
                eprintln!(
                    "{} The cloud provider requires the GOOGLE_TTS_API_KEY environment variable.",
                    "Error:".red().bold()
                );
                std::process::exit(1);
            }
            Box::new(CloudTts::new(
                &config.announcement.language,
                cli.voice.clone(),
                api_key,
            )?)
        }
        other => {
            eprintln!(
                "{} Unknown provider '{}'. Available providers: translate, cloud",
                "Error:".red().bold(),
                other
            );
            std::process::exit(1);
        }
    };

    // Print header
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} - cartela winner announcements", "Cartela Announcer".bold())
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!(
        "{} {}..={}",
        "Cartelas:".bold(),
        config.run.start,
        config.run.end
    );
    println!("{} {}", "Template:".bold(), config.announcement.template.bright_white());
    println!(
        "{} {} ({})",
        "Language:".bold(),
        config.announcement.language.bright_cyan(),
        cli.provider.dimmed()
    );
    println!("{} {}", "Output:".bold(), config.run.output_dir.bright_white());
    println!();
    println!("{}", "─".repeat(70).dimmed());

    let callback = create_console_callback();
    let mut generator = BatchGenerator::new(config, synthesizer)?.with_callback(callback);

    // Per-item failures are already reported through the callback; the run
    // itself only fails if the output directory cannot be created.
    let summary = generator.run().await?;

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    if summary.failed == 0 {
        println!(
            "{}",
            format!("  Generation complete: {} files written.", summary.succeeded)
                .bright_green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "  Generation finished: {} succeeded, {} failed.",
                summary.succeeded, summary.failed
            )
            .yellow()
            .bold()
        );
    }
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// Create a callback that prints generator events to the console.
fn create_console_callback() -> Box<dyn Fn(GeneratorEvent) + Send + Sync> {
    Box::new(move |event| match event {
        GeneratorEvent::RunStart { start, end } => {
            println!(
                "{} Generating announcements for cartelas {}..={}",
                "▶".bright_cyan(),
                start,
                end
            );
        }
        GeneratorEvent::Progress { generated, total } => {
            println!("  Generated {}/{}", generated, total);
        }
        GeneratorEvent::ItemFailed { number, detail } => {
            eprintln!(
                "  {} cartela {}: {}",
                "✗".red().bold(),
                number.to_string().bold(),
                detail
            );
        }
        GeneratorEvent::RunEnd { .. } => {
            // Summary is printed in main
        }
    })
}
