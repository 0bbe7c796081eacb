//! Window functions for filter design and spectral estimation

use std::f64::consts::PI;

/// Periodic Hann window: w[n] = 0.5 - 0.5*cos(2πn/N)
///
/// The periodic form is the right one for averaged spectral estimates
/// (Welch, STFT), where the window is conceptually repeated.
pub fn hann(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let n = len as f64;
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n).cos())
        .collect()
}

/// Symmetric 4-term Blackman-Harris window.
///
/// w[n] = a0 - a1*cos(2πn/(N-1)) + a2*cos(4πn/(N-1)) - a3*cos(6πn/(N-1))
///
/// Symmetric windows preserve linear phase when used for FIR design,
/// which is why this one backs the band-pass coefficient generator.
pub fn blackman_harris(len: usize) -> Vec<f64> {
    const A0: f64 = 0.35875;
    const A1: f64 = 0.48829;
    const A2: f64 = 0.14128;
    const A3: f64 = 0.01168;

    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / denom;
            A0 - A1 * angle.cos() + A2 * (2.0 * angle).cos() - A3 * (3.0 * angle).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hann_periodic_form() {
        let w = hann(1024);
        assert_eq!(w.len(), 1024);
        assert!(w[0].abs() < 1e-12, "Periodic Hann starts at zero");
        assert_relative_eq!(w[512], 1.0, epsilon = 1e-12);
        // Periodic windows satisfy w[k] == w[N-k] for 1 <= k < N.
        for k in 1..1024 {
            assert_relative_eq!(w[k], w[1024 - k], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_hann_degenerate_lengths() {
        assert!(hann(0).is_empty());
        assert_eq!(hann(1), vec![1.0]);
    }

    #[test]
    fn test_blackman_harris_symmetry_and_peak() {
        let w = blackman_harris(201);
        assert_eq!(w.len(), 201);
        for i in 0..w.len() / 2 {
            assert_relative_eq!(w[i], w[w.len() - 1 - i], epsilon = 1e-12);
        }
        // Center of an odd-length window hits the coefficient sum, 1.0 exactly.
        assert_relative_eq!(w[100], 1.0, epsilon = 1e-12);
        // Endpoints sit at a0 - a1 + a2 - a3 = 6e-5.
        assert_relative_eq!(w[0], 6e-5, epsilon = 1e-9);
    }

    #[test]
    fn test_blackman_harris_degenerate_lengths() {
        assert!(blackman_harris(0).is_empty());
        assert_eq!(blackman_harris(1), vec![1.0]);
    }
}
