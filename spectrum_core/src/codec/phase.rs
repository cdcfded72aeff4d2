//! Phase angle ↔ 8-bit raster over the fixed domain `[-π, +π]`.

use std::f64::consts::PI;

use ndarray::Array2;

use super::quantize_unit;
use crate::error::SpectrumResult;
use crate::raster::Raster;
use crate::transform::ComplexSpectrum;

/// `round(255 · (arg(c) + π) / 2π)` per coefficient.
pub fn encode_phase(spectrum: &ComplexSpectrum) -> SpectrumResult<Raster> {
    let samples = spectrum
        .coefficients()
        .mapv(|c| quantize_unit((c.arg() + PI) / (2.0 * PI)));
    Raster::from_array(samples)
}

/// `sample / 255 · 2π − π` per sample.
pub fn decode_phase(raster: &Raster) -> Array2<f64> {
    raster
        .pixels()
        .mapv(|s| f64::from(s) / 255.0 * 2.0 * PI - PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Complex64;
    use ndarray::arr2;

    #[test]
    fn test_domain_endpoints() {
        let spectrum = ComplexSpectrum::from_centered(arr2(&[[
            Complex64::new(-1.0, -1e-300),
            Complex64::new(1.0, 0.0),
            Complex64::new(-1.0, 0.0),
        ]]))
        .unwrap();
        let raster = encode_phase(&spectrum).unwrap();
        assert_eq!(raster.get(0, 0), 0);
        assert_eq!(raster.get(0, 1), 128);
        assert_eq!(raster.get(0, 2), 255);

        let decoded = decode_phase(&raster);
        assert!((decoded[[0, 0]] + PI).abs() < 1e-12);
        assert!((decoded[[0, 2]] - PI).abs() < 1e-12);
    }

    #[test]
    fn test_decode_within_half_step() {
        let angles: Vec<f64> = (0..50).map(|i| -PI + i as f64 * 0.1257).collect();
        let coefficients =
            Array2::from_shape_fn((5, 10), |(r, c)| Complex64::from_polar(2.0, angles[r * 10 + c]));
        let spectrum = ComplexSpectrum::from_centered(coefficients).unwrap();
        let decoded = decode_phase(&encode_phase(&spectrum).unwrap());

        let half_step = PI / 255.0 + 1e-12;
        for (c, p) in spectrum.coefficients().iter().zip(decoded.iter()) {
            assert!((c.arg() - p).abs() <= half_step);
        }
    }
}
