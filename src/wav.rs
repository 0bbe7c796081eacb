use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};

use crate::config::DownmixMode;
use crate::error::{LeakError, Result};
use crate::signal_processing::level::sanitize;

/// Mono audio clip as loaded from disk
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    /// Clip length in seconds
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Load a WAV file as a mono `f32` clip.
///
/// Integer samples are normalized by `2^(bits-1)`; float samples pass
/// through. Multi-channel recordings are reduced per `downmix`, and any
/// non-finite samples are replaced with silence.
pub fn load_wav<P: AsRef<Path>>(path: P, downmix: DownmixMode) -> Result<AudioClip> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(LeakError::InvalidInput(format!(
            "{}: WAV header declares zero channels",
            path.display()
        )));
    }
    if spec.sample_rate == 0 {
        return Err(LeakError::InvalidInput(format!(
            "{}: WAV header declares a zero sample rate",
            path.display()
        )));
    }

    let interleaved = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<Vec<_>>>()?,
        SampleFormat::Int => {
            let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<hound::Result<Vec<_>>>()?
        }
    };

    if spec.channels > 1 {
        match downmix {
            DownmixMode::FirstChannel => warn!(
                "{}: {} channels, keeping channel 0 and discarding the rest",
                path.display(),
                spec.channels
            ),
            DownmixMode::Average => debug!(
                "{}: averaging {} channels to mono",
                path.display(),
                spec.channels
            ),
        }
    }
    let mut samples = downmix_channels(interleaved, spec.channels, downmix);

    let replaced = sanitize(&mut samples);
    if replaced > 0 {
        warn!(
            "{}: replaced {} non-finite samples with silence",
            path.display(),
            replaced
        );
    }

    Ok(AudioClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

fn downmix_channels(interleaved: Vec<f32>, channels: u16, mode: DownmixMode) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    let channels = usize::from(channels);
    match mode {
        DownmixMode::FirstChannel => interleaved.iter().step_by(channels).copied().collect(),
        DownmixMode::Average => interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect(),
    }
}

/// Write a mono buffer as a 32-bit float WAV
pub fn save_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_first_channel() {
        let interleaved = vec![0.1, 0.9, 0.2, 0.8, 0.3, 0.7];
        let mono = downmix_channels(interleaved, 2, DownmixMode::FirstChannel);
        assert_eq!(mono, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_downmix_average() {
        let interleaved = vec![0.0, 1.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix_channels(interleaved, 2, DownmixMode::Average);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.25, -0.5, 0.75];
        let mono = downmix_channels(samples.clone(), 1, DownmixMode::Average);
        assert_eq!(mono, samples);
    }

    #[test]
    fn test_downmix_four_channels() {
        let interleaved = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let first = downmix_channels(interleaved.clone(), 4, DownmixMode::FirstChannel);
        assert_eq!(first, vec![1.0, 5.0]);
        let avg = downmix_channels(interleaved, 4, DownmixMode::Average);
        assert_eq!(avg, vec![2.5, 6.5]);
    }
}
