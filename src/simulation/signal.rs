use std::f32::consts::PI;

/// One sinusoidal component of a synthetic test signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq_hz: f32,
    pub amplitude: f32,
}

/// Generate a single sinusoid starting at phase zero.
pub fn sine(freq_hz: f32, amplitude: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * freq_hz * t).sin()
        })
        .collect()
}

/// Generate a superposition of sinusoids, all starting at phase zero.
/// An empty tone list yields silence.
pub fn mixed_tones(tones: &[Tone], sample_rate: u32, num_samples: usize) -> Vec<f32> {
    let mut samples = vec![0.0_f32; num_samples];
    for tone in tones {
        for (i, sample) in samples.iter_mut().enumerate() {
            let t = i as f32 / sample_rate as f32;
            *sample += tone.amplitude * (2.0 * PI * tone.freq_hz * t).sin();
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_length_and_level() {
        let signal = sine(1000.0, 1.0, 44100, 44100);
        assert_eq!(signal.len(), 44100);

        let rms = (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt();
        assert!(
            (rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3,
            "unit sine RMS should be ~0.707, got {}",
            rms
        );
    }

    #[test]
    fn test_mixed_tones_superpose() {
        let tones = [
            Tone {
                freq_hz: 1000.0,
                amplitude: 0.5,
            },
            Tone {
                freq_hz: 5000.0,
                amplitude: 0.5,
            },
        ];
        let mixed = mixed_tones(&tones, 44100, 4096);
        let a = sine(1000.0, 0.5, 44100, 4096);
        let b = sine(5000.0, 0.5, 44100, 4096);

        for (i, &m) in mixed.iter().enumerate() {
            assert!(
                (m - (a[i] + b[i])).abs() < 1e-6,
                "mixed tone should be the sample-wise sum at index {}",
                i
            );
        }
    }

    #[test]
    fn test_no_tones_is_silence() {
        let silence = mixed_tones(&[], 44100, 1024);
        assert_eq!(silence.len(), 1024);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
