//! Log-compressed magnitude ↔ 8-bit raster.
//!
//! Encoding maps `log1p(|c|)` linearly from `[mag_min, mag_max]` onto
//! `[0, 255]`. Decoding reverses the affine map and applies `expm1`, so the
//! recovered log-magnitude is within half a quantization step
//! (`0.5 · span / 255`) of the original.

use ndarray::Array2;

use super::metadata::CodecMetadata;
use super::quantize_unit;
use crate::error::{SpectrumError, SpectrumResult};
use crate::raster::Raster;
use crate::transform::ComplexSpectrum;

/// Sample value used for every coefficient when the log-magnitude range is empty.
pub const DEGENERATE_SAMPLE: u8 = 0;

/// Encodes the magnitudes of `spectrum` and records the bounds used.
pub fn encode_magnitude(spectrum: &ComplexSpectrum) -> SpectrumResult<(Raster, CodecMetadata)> {
    let magnitudes = spectrum.coefficients().mapv(|c| c.norm());
    let log_magnitudes = magnitudes.mapv(f64::ln_1p);

    let (mag_min, mag_max) = log_magnitudes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !mag_min.is_finite() || !mag_max.is_finite() {
        return Err(SpectrumError::invalid_input(
            "magnitude encode",
            "spectrum contains non-finite coefficients",
        ));
    }

    let metadata = CodecMetadata::new(mag_min, mag_max);
    let raster = encode_magnitude_with_bounds(&magnitudes, &metadata)?;
    Ok((raster, metadata))
}

/// Quantizes linear magnitudes against fixed bounds.
///
/// Values outside `[mag_min, mag_max]` after compression are clamped. With
/// degenerate bounds every sample is [`DEGENERATE_SAMPLE`].
pub fn encode_magnitude_with_bounds(
    magnitudes: &Array2<f64>,
    metadata: &CodecMetadata,
) -> SpectrumResult<Raster> {
    let samples = if metadata.is_degenerate() {
        Array2::from_elem(magnitudes.dim(), DEGENERATE_SAMPLE)
    } else {
        let span = metadata.span();
        magnitudes.mapv(|m| quantize_unit((m.ln_1p() - metadata.mag_min) / span))
    };
    Raster::from_array(samples)
}

/// Recovers linear magnitudes from an 8-bit image and its bounds.
pub fn decode_magnitude(raster: &Raster, metadata: &CodecMetadata) -> SpectrumResult<Array2<f64>> {
    const CONTEXT: &str = "magnitude image";
    metadata.validate(CONTEXT)?;

    if metadata.is_degenerate() && raster.pixels().iter().any(|&s| s != DEGENERATE_SAMPLE) {
        return Err(SpectrumError::missing_metadata(
            CONTEXT,
            format!(
                "bounds record an empty range (mag_min = mag_max = {}) but the image is not uniform",
                metadata.mag_min
            ),
        ));
    }

    let span = metadata.span();
    Ok(raster
        .pixels()
        .mapv(|s| (f64::from(s) / 255.0 * span + metadata.mag_min).exp_m1()))
}
