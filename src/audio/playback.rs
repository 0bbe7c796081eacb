use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::bounded;
use log::{debug, info};

use crate::error::{LeakError, Result};

/// Extra wait beyond the buffer's nominal duration before giving up
const COMPLETION_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// Pause after the last sample is queued so the device can drain it
const DRAIN_MARGIN: Duration = Duration::from_millis(150);

/// Destination for audio playback.
///
/// The menu loop reaches the sound device only through this trait, so it
/// can run without one in tests and headless environments.
pub trait AudioSink {
    /// Play a mono buffer to completion, blocking until it has been consumed
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()>;
}

/// Sink that discards audio, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
        debug!(
            "Null sink: discarding {} samples at {} Hz",
            samples.len(),
            sample_rate
        );
        Ok(())
    }
}

/// Sink that plays through the system's default output device.
///
/// The device is acquired per call and released when the stream drops, so
/// holding a `CpalSink` does not hold the device.
#[derive(Debug, Default)]
pub struct CpalSink;

impl AudioSink for CpalSink {
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| LeakError::AudioDevice("No output device found".to_string()))?;

        match device.description() {
            Ok(desc) => info!("Output device: {:?}", desc),
            Err(_) => info!("Output device: Unknown"),
        }

        let default_config = device
            .default_output_config()
            .map_err(|e| LeakError::AudioDevice(format!("{}", e)))?;

        // Keep the device's channel count and sample format, but ask for the
        // clip's sample rate so no resampling is needed.
        let stream_config = cpal::StreamConfig {
            channels: default_config.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        match default_config.sample_format() {
            cpal::SampleFormat::F32 => play_stream::<f32>(&device, &stream_config, samples),
            cpal::SampleFormat::I16 => play_stream::<i16>(&device, &stream_config, samples),
            cpal::SampleFormat::U16 => play_stream::<u16>(&device, &stream_config, samples),
            other => Err(LeakError::AudioStream(format!(
                "Unsupported output sample format {:?}",
                other
            ))),
        }
    }
}

fn play_stream<T>(device: &cpal::Device, config: &cpal::StreamConfig, samples: &[f32]) -> Result<()>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = usize::from(config.channels);
    let buffer = samples.to_vec();
    let (done_tx, done_rx) = bounded::<()>(1);

    let mut position = 0usize;
    let stream = device
        .build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in output.chunks_mut(channels) {
                    let value = if position < buffer.len() {
                        let v = buffer[position];
                        position += 1;
                        if position == buffer.len() {
                            let _ = done_tx.try_send(());
                        }
                        v
                    } else {
                        0.0
                    };
                    // Mono clip duplicated across every output channel.
                    for sample in frame.iter_mut() {
                        *sample = T::from_sample(value);
                    }
                }
            },
            |err| eprintln!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| LeakError::AudioStream(format!("{}", e)))?;

    stream
        .play()
        .map_err(|e| LeakError::AudioStream(format!("{}", e)))?;

    let nominal = Duration::from_secs_f64(samples.len() as f64 / f64::from(config.sample_rate));
    done_rx
        .recv_timeout(nominal + COMPLETION_TIMEOUT_MARGIN)
        .map_err(|_| LeakError::AudioStream("Playback did not complete in time".to_string()))?;

    // The callback has queued everything; let the device finish it.
    std::thread::sleep(DRAIN_MARGIN);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_accepts_anything() {
        let mut sink = NullSink;
        assert!(sink.play(&[0.0; 512], 44100).is_ok());
        assert!(sink.play(&[], 8000).is_ok());
    }
}
