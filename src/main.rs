use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use leakscope::audio::{AudioSink, CpalSink, NullSink};
use leakscope::charts;
use leakscope::config::DownmixMode;
use leakscope::menu;
use leakscope::AppConfig;

/// Interactive acoustic leak inspection: band-pass filtering, playback,
/// and diagnostic charts for recorded pipe audio.
#[derive(Parser, Debug)]
#[command(name = "leakscope", version)]
struct Args {
    /// TOML configuration file (defaults to the built-in source list)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Discard playback instead of opening an output device
    #[arg(long)]
    no_audio: bool,

    /// Override the configured channel downmix mode
    #[arg(short = 'd', long, value_enum)]
    downmix: Option<DownmixMode>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AppConfig::from_toml_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AppConfig::default(),
    };
    if let Some(downmix) = args.downmix {
        config.downmix = downmix;
    }
    config.validate().context("validating config")?;

    println!("=== leakscope ===");
    println!("Filter taps: {}", config.filter.num_taps);
    println!("Downmix: {:?}", config.downmix);
    println!("Sources: {}", config.sources.len());
    if args.no_audio {
        println!("Playback: disabled");
    }

    let mut sink: Box<dyn AudioSink> = if args.no_audio {
        Box::new(NullSink)
    } else {
        Box::new(CpalSink)
    };
    let mut renderer = charts::default_renderer();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    menu::run_menu(
        &config,
        &mut input,
        &mut output,
        sink.as_mut(),
        renderer.as_mut(),
    )?;

    Ok(())
}
