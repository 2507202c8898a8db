//! voxsub CLI: run pipeline operations from a terminal, or check a config file.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voxsub_core::{
    validate, Pipeline, PipelineInput, PipelineResult, ProcessRunner, ServiceConfig,
    SynthesisClient, SynthesisRequest,
};

#[derive(Parser, Debug)]
#[command(name = "voxsub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Text to speech, canonical audio and subtitle timing")]
struct Cli {
    /// Config file (TOML); defaults apply when omitted
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize text and store the audio in the upload root
    Synth(TextArgs),
    /// Normalize stored audio and run the aligner on it
    Subtitle {
        /// Audio reference relative to the upload root, e.g. tts_123.mp3
        audio_url: String,
    },
    /// Synthesize, store, normalize and align in one go
    Run(TextArgs),
    /// Parse and validate the config, then print the effective values
    CheckConfig,
}

#[derive(Args, Debug)]
struct TextArgs {
    #[arg(long, short = 't')]
    text: String,
    /// Voice identifier or preset alias (P_1..P_10)
    #[arg(long)]
    voice: Option<String>,
    #[arg(long)]
    speed: Option<f32>,
}

impl TextArgs {
    /// Same rules as the HTTP body, so both surfaces accept the same input.
    fn into_request(self, config: &ServiceConfig) -> Result<SynthesisRequest> {
        let body = json!({
            "text": self.text,
            "voiceModel": self.voice,
            "speedRatio": self.speed,
        });
        Ok(validate::synthesis_request(&body, &config.tts)?)
    }
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ServiceConfig> {
    let mut config = match path {
        Some(p) => ServiceConfig::load_path(p)?,
        None => ServiceConfig::default(),
    };
    config.apply_env(|k| std::env::var(k).ok())?;
    config.validate()?;
    tracing::debug!(transcoder = %config.transcoder.program, aligner = %config.aligner.program, "config loaded");
    Ok(config)
}

fn build_pipeline(config: ServiceConfig) -> Result<Pipeline> {
    let synthesizer = SynthesisClient::new(config.tts.clone())?;
    Ok(Pipeline::new(config, Arc::new(synthesizer), Arc::new(ProcessRunner)))
}

fn subtitle_json(r: &PipelineResult) -> serde_json::Value {
    json!({
        "filename": r.normalized_file_name(),
        "savedPath": r.normalized_path.display().to_string(),
        "segments": r.alignment.segments().len(),
        "subJson": r.alignment.content,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let out = match cli.command {
        Command::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        Command::Synth(args) => {
            let request = args.into_request(&config)?;
            let r = build_pipeline(config)?.text_to_audio(&request).await?;
            json!({
                "duration": r.duration,
                "audioUrl": r.audio.public_path,
                "path": r.audio.path.display().to_string(),
            })
        }
        Command::Subtitle { audio_url } => {
            let r = build_pipeline(config)?.gen_audio_sub(&audio_url).await?;
            subtitle_json(&r)
        }
        Command::Run(args) => {
            let request = args.into_request(&config)?;
            let r = build_pipeline(config)?
                .run(PipelineInput::Text(request))
                .await?;
            let mut v = subtitle_json(&r);
            v["duration"] = json!(r.duration);
            v["audioUrl"] = json!(r.audio.as_ref().map(|a| a.public_path.clone()));
            v
        }
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
