//! spinet: play named sprites from an audio source

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use spinet_graph::AudioContext;
use spinet_instrument::{
    loader, Codec, Instrument, InstrumentConfig, PlayOptions, SpriteMap, DEFAULT_SPRITE_KEY,
};

#[derive(Parser)]
#[command(name = "spinet")]
#[command(about = "Play named sprites from an audio source", long_about = None)]
struct Cli {
    /// Audio sources: file paths or http(s) URLs, one per codec, in
    /// preference order
    #[arg(required = true)]
    sources: Vec<String>,

    /// Sprite key to play (defaults to the whole file)
    #[arg(short, long)]
    sprite: Option<String>,

    /// JSON sprite map: {"key": {"start": 0.0, "end": 1.5, "loop": false}}
    #[arg(long, value_name = "FILE")]
    sprites: Option<PathBuf>,

    /// Preferred source format (mp3, m4a, ogg, wav, flac)
    #[arg(short, long)]
    format: Option<Codec>,

    /// Playback rate multiplier
    #[arg(short, long)]
    rate: Option<f64>,

    /// Gain (1.0 = unity)
    #[arg(short, long, default_value_t = 1.0)]
    gain: f32,

    /// Instrument display name
    #[arg(long)]
    name: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let sprite_map = match &cli.sprites {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading sprite map {}", path.display()))?;
            let map: SpriteMap = serde_json::from_str(&text)
                .with_context(|| format!("parsing sprite map {}", path.display()))?;
            Some(map)
        }
        None => None,
    };

    let ctx = AudioContext::new().context("opening audio output")?;
    let mut instrument = Instrument::new(InstrumentConfig {
        id: cli.name.clone(),
        name: cli.name.clone(),
        urls: cli.sources.clone(),
        sprite: sprite_map,
        format: cli.format,
        gain: cli.gain,
        ctx: Some(ctx),
    });

    loader::load(&mut instrument)?;

    let key = cli.sprite.as_deref().unwrap_or(DEFAULT_SPRITE_KEY);
    let options = PlayOptions {
        playback_rate: cli.rate,
    };
    if let Err(e) = instrument.play(Some(key), &options) {
        log::error!("unplayable request: {e}");
        std::process::exit(1);
    }

    let sprite = instrument.sprite.as_ref().and_then(|map| map.get(key)).copied();
    match sprite {
        Some(sprite) if sprite.looped => {
            println!("Looping `{key}` - press Ctrl+C to stop.");
            loop {
                thread::sleep(Duration::from_secs(1));
            }
        }
        Some(sprite) => {
            // The stop is already scheduled on the audio clock; sleep a
            // touch past it so the stream gets to render the whole sprite.
            thread::sleep(Duration::from_secs_f64(sprite.duration() + 0.25));
        }
        None => {}
    }

    Ok(())
}
