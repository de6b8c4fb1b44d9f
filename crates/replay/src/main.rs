//! FaceGuard Replay - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use replay::{load_config, Preset, Replayer};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recording to replay (JSON lines); reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON) layered over the preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Threshold preset
    #[arg(short, long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Initialize logging on stderr so stdout carries only reports
fn init_logging(json: bool, debug: bool) -> Result<()> {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json, args.debug)?;

    info!("=== FaceGuard replay v{} ===", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref(), args.preset).context("loading configuration")?;
    let mut replayer = Replayer::new(config)?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let summary = replayer.run(reader, tokio::io::stdout()).await?;
    info!(
        "Replayed {} frames, {} commands ({} skipped), {} with warnings, peak score {}",
        summary.frames, summary.commands, summary.skipped, summary.frames_with_warning, summary.peak_score
    );
    for (kind, count) in &summary.warnings_raised {
        info!("Warning {} raised {} times", kind, count);
    }

    Ok(())
}
