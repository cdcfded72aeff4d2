//! Complex spectrum ↔ pair of 8-bit images plus magnitude bounds.
//!
//! The magnitude channel is log-compressed and stretched between the bounds
//! recorded in [`CodecMetadata`]; the phase channel maps the fixed interval
//! `[-π, +π]` and needs no metadata. Decoding is exact up to 8-bit
//! quantization provided the bounds travel with the magnitude image.
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use spectrum_core::{codec, transform};
//!
//! let grid = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
//! let spectrum = transform::forward(&grid).unwrap();
//! let pair = codec::encode(&spectrum).unwrap();
//! assert!(pair.metadata.mag_min <= pair.metadata.mag_max);
//!
//! let decoded = codec::decode(&pair).unwrap();
//! assert_eq!(decoded.dim(), (4, 4));
//! ```

pub mod magnitude;
pub mod metadata;
pub mod phase;

use ndarray::{Array2, Zip};

use crate::error::{SpectrumError, SpectrumResult};
use crate::raster::Raster;
use crate::transform::{Complex64, ComplexSpectrum};

pub use magnitude::{decode_magnitude, encode_magnitude, encode_magnitude_with_bounds};
pub use metadata::{CodecMetadata, MAG_MAX_KEY, MAG_MIN_KEY};
pub use phase::{decode_phase, encode_phase};

/// Magnitude and phase images of one spectrum, plus the bounds that make the
/// magnitude image invertible.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSpectrumPair {
    pub magnitude: Raster,
    pub phase: Raster,
    pub metadata: CodecMetadata,
}

impl EncodedSpectrumPair {
    /// `(height, width)` shared by both images.
    pub fn dim(&self) -> (usize, usize) {
        self.magnitude.dim()
    }
}

/// Encodes both channels of `spectrum`.
pub fn encode(spectrum: &ComplexSpectrum) -> SpectrumResult<EncodedSpectrumPair> {
    let (magnitude, metadata) = encode_magnitude(spectrum)?;
    let phase = encode_phase(spectrum)?;
    Ok(EncodedSpectrumPair {
        magnitude,
        phase,
        metadata,
    })
}

/// Decodes both channels and reassembles the complex spectrum.
pub fn decode(pair: &EncodedSpectrumPair) -> SpectrumResult<ComplexSpectrum> {
    if pair.magnitude.dim() != pair.phase.dim() {
        return Err(SpectrumError::dimension_mismatch(
            pair.magnitude.dim(),
            pair.phase.dim(),
            "phase image",
        ));
    }
    let magnitudes = decode_magnitude(&pair.magnitude, &pair.metadata)?;
    let phases = decode_phase(&pair.phase);
    reassemble(&magnitudes, &phases)
}

/// Polar to rectangular: `magnitude · exp(i · phase)` per coefficient.
pub fn reassemble(magnitudes: &Array2<f64>, phases: &Array2<f64>) -> SpectrumResult<ComplexSpectrum> {
    if magnitudes.dim() != phases.dim() {
        return Err(SpectrumError::dimension_mismatch(
            magnitudes.dim(),
            phases.dim(),
            "spectrum reassembly",
        ));
    }
    let coefficients = Zip::from(magnitudes)
        .and(phases)
        .map_collect(|&m, &p| Complex64::from_polar(m, p));
    ComplexSpectrum::from_centered(coefficients)
}

/// Maps `[0, 1]` onto `0..=255` with rounding, clamping anything outside.
pub(crate) fn quantize_unit(unit: f64) -> u8 {
    (255.0 * unit).round().clamp(0.0, 255.0) as u8
}
