//! Reel generator binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_media::{check_ffmpeg, check_ffprobe};
use reel_worker::{Collaborators, ReelConfig, ReelGenerator};

#[derive(Parser, Debug)]
#[command(name = "reel-worker")]
#[command(about = "Turn a news article into a narrated vertical video", long_about = None)]
struct Args {
    /// Article URL
    url: String,

    /// Working directory for intermediate files
    #[arg(short = 'w', long, env = "REEL_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Output video path
    #[arg(short, long, env = "REEL_OUTPUT")]
    output: Option<PathBuf>,

    /// Render without burned-in captions
    #[arg(long)]
    no_subtitles: bool,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reel=info,info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = ReelConfig::from_env().context("Failed to load configuration")?;
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if args.no_subtitles {
        config.caption_style.enabled = false;
    }
    info!("Reel config: {:?}", RedactedConfig(&config));

    check_ffmpeg().context("ffmpeg is required")?;
    check_ffprobe().context("ffprobe is required")?;

    let services = Collaborators::from_config(&config).context("Failed to build HTTP clients")?;
    let generator = ReelGenerator::new(config, services);

    let outcome = generator
        .run(&args.url)
        .await
        .with_context(|| format!("Reel generation failed for {}", args.url))?;

    if !outcome.skipped.is_empty() {
        warn!(
            skipped = outcome.skipped.len(),
            "Some scenes are missing from the video"
        );
    }
    info!(
        run_id = %outcome.run_id,
        scenes = outcome.scene_count,
        rendered = outcome.rendered.len(),
        captions = outcome.caption_count,
        "Reel written to {}",
        outcome.output.display()
    );
    Ok(())
}

/// Debug view of the config without credentials.
struct RedactedConfig<'a>(&'a ReelConfig);

impl std::fmt::Debug for RedactedConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = self.0;
        f.debug_struct("ReelConfig")
            .field("llm_model", &c.llm_model)
            .field("image_model", &c.image_model)
            .field("image_size", &c.image_size)
            .field("tts_model", &c.tts_model)
            .field("work_dir", &c.work_dir)
            .field("output", &c.output)
            .field("max_render_parallel", &c.max_render_parallel)
            .field("ffmpeg_timeout", &c.ffmpeg_timeout)
            .field("subtitles", &c.caption_style.enabled)
            .field("alignment", &c.caption_style.alignment)
            .finish_non_exhaustive()
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    info!("Starting reel-worker");

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
