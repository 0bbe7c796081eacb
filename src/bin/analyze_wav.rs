use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use leakscope::config::DownmixMode;
use leakscope::processing::ProcessedSource;
use leakscope::spectral::{self, WelchPsd};
use leakscope::wav;

#[derive(Parser, Debug)]
#[command(name = "analyze_wav")]
#[command(about = "Report leak-band statistics for WAV recordings", long_about = None)]
struct Args {
    /// WAV files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Band-pass lower cutoff in Hz
    #[arg(long, default_value = "600")]
    band_low: f32,

    /// Band-pass upper cutoff in Hz
    #[arg(long, default_value = "2200")]
    band_high: f32,

    /// Number of FIR taps
    #[arg(long, default_value = "201")]
    taps: usize,

    /// Welch PSD segment length in samples
    #[arg(long, default_value = "1024")]
    psd_segment: usize,

    /// Multi-channel handling: first-channel, average
    #[arg(short = 'd', long, value_enum, default_value = "first-channel")]
    downmix: DownmixMode,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy)]
struct AnalyzeOptions {
    band_low_hz: f32,
    band_high_hz: f32,
    num_taps: usize,
    psd_segment_len: usize,
    downmix: DownmixMode,
}

#[derive(Debug, Clone, Serialize)]
struct FileReport {
    filename: String,
    sample_count: usize,
    duration_secs: Option<f32>,
    sample_rate: Option<u32>,
    channels: Option<u16>,
    std_dev: Option<f32>,
    dominant_hz_original: Option<f32>,
    dominant_hz_filtered: Option<f32>,
    band_power_original: Option<f32>,
    band_power_filtered: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: String,
    band_low_hz: f32,
    band_high_hz: f32,
    num_taps: usize,
    files: &'a [FileReport],
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

    let opts = AnalyzeOptions {
        band_low_hz: args.band_low,
        band_high_hz: args.band_high,
        num_taps: args.taps,
        psd_segment_len: args.psd_segment,
        downmix: args.downmix,
    };

    let results: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| analyze_file(path, &opts))
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results, &opts),
        OutputFormat::Csv => print_csv(&results),
        OutputFormat::Json => print_json(&results, &opts)?,
    }

    Ok(())
}

fn analyze_file(path: &PathBuf, opts: &AnalyzeOptions) -> FileReport {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match analyze_file_impl(path, &filename, opts) {
        Ok(report) => report,
        Err(e) => FileReport {
            filename,
            sample_count: 0,
            duration_secs: None,
            sample_rate: None,
            channels: None,
            std_dev: None,
            dominant_hz_original: None,
            dominant_hz_filtered: None,
            band_power_original: None,
            band_power_filtered: None,
            error: Some(e.to_string()),
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    filename: &str,
    opts: &AnalyzeOptions,
) -> anyhow::Result<FileReport> {
    // The loader erases the channel layout, so read the header separately.
    let header = hound::WavReader::open(path)?.spec();
    let clip = wav::load_wav(path, opts.downmix)?;

    let mut stats: Stats<f32> = Stats::new();
    for &s in &clip.samples {
        stats.update(s);
    }

    let sample_count = clip.samples.len();
    let sample_rate = clip.sample_rate;
    let duration_secs = clip.duration_secs();

    let psd_original = spectral::welch_psd(&clip.samples, sample_rate, opts.psd_segment_len)?;
    let processed = ProcessedSource::from_clip(
        filename,
        clip,
        opts.band_low_hz,
        opts.band_high_hz,
        opts.num_taps,
    )?;
    let psd_filtered = spectral::welch_psd(&processed.filtered, sample_rate, opts.psd_segment_len)?;

    Ok(FileReport {
        filename: filename.to_string(),
        sample_count,
        duration_secs: Some(duration_secs),
        sample_rate: Some(sample_rate),
        channels: Some(header.channels),
        std_dev: Some(stats.std_dev),
        dominant_hz_original: Some(psd_original.dominant_frequency()),
        dominant_hz_filtered: Some(psd_filtered.dominant_frequency()),
        band_power_original: band_power_ratio(&psd_original, opts.band_low_hz, opts.band_high_hz),
        band_power_filtered: band_power_ratio(&psd_filtered, opts.band_low_hz, opts.band_high_hz),
        error: None,
    })
}

/// Fraction of total PSD power falling inside `[low_hz, high_hz]`, or
/// `None` when the estimate carries no power at all.
fn band_power_ratio(psd: &WelchPsd, low_hz: f32, high_hz: f32) -> Option<f32> {
    let total: f64 = psd.power.iter().map(|&p| f64::from(p)).sum();
    if total <= 0.0 {
        return None;
    }
    let in_band: f64 = psd
        .frequencies
        .iter()
        .zip(psd.power.iter())
        .filter(|&(&f, _)| f >= low_hz && f <= high_hz)
        .map(|(_, &p)| f64::from(p))
        .sum();
    Some((in_band / total) as f32)
}

fn print_text(results: &[FileReport], opts: &AnalyzeOptions) {
    eprintln!(
        "Band: {:.0}-{:.0} Hz, {} taps, downmix {:?}",
        opts.band_low_hz, opts.band_high_hz, opts.num_taps, opts.downmix
    );
    eprintln!();

    println!(
        "{:<40} {:>9} {:>6} {:>3} {:>8} {:>10} {:>10} {:>9} {:>9}",
        "File", "Duration", "Rate", "Ch", "StdDev", "DomOrig", "DomFilt", "BandOrig", "BandFilt"
    );
    println!("{}", "-".repeat(112));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }

        let duration = result
            .duration_secs
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        let rate = result
            .sample_rate
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let channels = result
            .channels
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let std_dev = result
            .std_dev
            .map(|v| format!("{:.4}", v))
            .unwrap_or_else(|| "-".to_string());
        let dom_orig = result
            .dominant_hz_original
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        let dom_filt = result
            .dominant_hz_filtered
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        let band_orig = result
            .band_power_original
            .map(|v| format!("{:.3}", v))
            .unwrap_or_else(|| "-".to_string());
        let band_filt = result
            .band_power_filtered
            .map(|v| format!("{:.3}", v))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<40} {:>9} {:>6} {:>3} {:>8} {:>10} {:>10} {:>9} {:>9}",
            result.filename, duration, rate, channels, std_dev, dom_orig, dom_filt, band_orig,
            band_filt
        );
    }
}

fn print_csv(results: &[FileReport]) {
    println!(
        "filename,duration_secs,sample_rate,channels,sample_count,std_dev,dominant_hz_original,dominant_hz_filtered,band_power_original,band_power_filtered,error"
    );
    for result in results {
        let duration = result
            .duration_secs
            .map(|v| format!("{:.3}", v))
            .unwrap_or_default();
        let rate = result
            .sample_rate
            .map(|v| v.to_string())
            .unwrap_or_default();
        let channels = result
            .channels
            .map(|v| v.to_string())
            .unwrap_or_default();
        let std_dev = result
            .std_dev
            .map(|v| format!("{:.6}", v))
            .unwrap_or_default();
        let dom_orig = result
            .dominant_hz_original
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default();
        let dom_filt = result
            .dominant_hz_filtered
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default();
        let band_orig = result
            .band_power_original
            .map(|v| format!("{:.4}", v))
            .unwrap_or_default();
        let band_filt = result
            .band_power_filtered
            .map(|v| format!("{:.4}", v))
            .unwrap_or_default();
        let error = result.error.as_deref().unwrap_or("");

        println!(
            "{},{},{},{},{},{},{},{},{},{},{}",
            result.filename,
            duration,
            rate,
            channels,
            result.sample_count,
            std_dev,
            dom_orig,
            dom_filt,
            band_orig,
            band_filt,
            error
        );
    }
}

fn print_json(results: &[FileReport], opts: &AnalyzeOptions) -> anyhow::Result<()> {
    let report = Report {
        generated_at: chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
        band_low_hz: opts.band_low_hz,
        band_high_hz: opts.band_high_hz,
        num_taps: opts.num_taps,
        files: results,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}
