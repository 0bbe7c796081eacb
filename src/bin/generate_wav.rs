use anyhow::{Context, Result};
use clap::Parser;
use leakscope::save_wav;
use leakscope::simulation::{Tone, add_white_noise, mixed_tones, signal_power};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate synthetic mixed-tone WAV files for filter testing")]
struct Args {
    /// Output WAV path
    #[arg(short, long, default_value = "synthetic.wav")]
    output: PathBuf,

    /// Tones as "freq_hz:amplitude", comma-separated (e.g., "1000:0.5,5000:0.5")
    #[arg(short, long, default_value = "1000:0.5,5000:0.5")]
    tones: String,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// White noise standard deviation (0 disables)
    #[arg(short, long, default_value_t = 0.0)]
    noise: f32,

    /// Noise seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,
}

fn parse_tones(s: &str) -> Result<Vec<Tone>> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            let (freq, amp) = part.split_once(':').ok_or_else(|| {
                anyhow::anyhow!("Invalid tone '{}'. Use 'freq_hz:amplitude'", part)
            })?;
            Ok(Tone {
                freq_hz: freq.trim().parse().context("Invalid tone frequency")?,
                amplitude: amp.trim().parse().context("Invalid tone amplitude")?,
            })
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tones = parse_tones(&args.tones)?;
    let num_samples = (args.duration * args.sample_rate as f32) as usize;

    let mut signal = mixed_tones(&tones, args.sample_rate, num_samples);
    if args.noise > 0.0 {
        add_white_noise(&mut signal, args.noise, args.seed);
    }

    save_wav(&args.output, &signal, args.sample_rate).context("Failed to write WAV file")?;

    eprintln!(
        "Wrote {} samples ({:.2} s at {} Hz) to {}",
        signal.len(),
        args.duration,
        args.sample_rate,
        args.output.display()
    );
    eprintln!("Signal power: {:.4}", signal_power(&signal));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tones_single() {
        let tones = parse_tones("1000:0.5").unwrap();
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0].freq_hz, 1000.0);
        assert_eq!(tones[0].amplitude, 0.5);
    }

    #[test]
    fn test_parse_tones_list_with_spaces() {
        let tones = parse_tones("440:1.0, 5000:0.25").unwrap();
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[1].freq_hz, 5000.0);
        assert_eq!(tones[1].amplitude, 0.25);
    }

    #[test]
    fn test_parse_tones_rejects_missing_amplitude() {
        assert!(parse_tones("1000").is_err());
    }
}
