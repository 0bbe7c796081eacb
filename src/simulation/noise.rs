use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean power of a buffer, `Σx²/n`.
pub fn signal_power(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f32>() / signal.len() as f32
}

/// Adds zero-mean Gaussian noise in place. A seed makes the noise
/// reproducible; `std_dev <= 0` leaves the signal untouched.
pub fn add_white_noise(signal: &mut [f32], std_dev: f32, seed: Option<u64>) {
    if std_dev <= 0.0 {
        return;
    }

    let mut rng = create_rng(seed);
    let normal = Normal::new(0.0, std_dev as f64).unwrap();
    for sample in signal.iter_mut() {
        *sample += normal.sample(&mut rng) as f32;
    }
}

/// A buffer of pure Gaussian noise.
pub fn white_noise(num_samples: usize, std_dev: f32, seed: Option<u64>) -> Vec<f32> {
    let mut samples = vec![0.0_f32; num_samples];
    add_white_noise(&mut samples, std_dev, seed);
    samples
}
