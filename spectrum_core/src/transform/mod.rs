//! Forward and inverse 2D discrete Fourier transform.
//!
//! [`forward`] produces a centered [`ComplexSpectrum`]: the DFT followed by a
//! quadrant swap that puts the zero-frequency coefficient at
//! `(⌊H/2⌋, ⌊W/2⌋)`. [`inverse`] undoes the swap with the exact inverse
//! permutation, runs the inverse DFT scaled by `1/(H·W)` and keeps the real
//! part. Both are pure and deterministic.

pub mod fft;
pub mod shift;

use ndarray::Array2;
use rustfft::FftDirection;

use crate::error::{SpectrumError, SpectrumResult};
use crate::raster::Raster;

pub use rustfft::num_complex::Complex64;
pub use shift::{fft_shift, ifft_shift};

/// Centered grid of complex DFT coefficients, one per spatial frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexSpectrum {
    coefficients: Array2<Complex64>,
}

impl ComplexSpectrum {
    /// Wraps coefficients that are already in centered order.
    pub fn from_centered(coefficients: Array2<Complex64>) -> SpectrumResult<Self> {
        let (rows, cols) = coefficients.dim();
        if rows == 0 || cols == 0 {
            return Err(SpectrumError::invalid_input(
                "spectrum construction",
                format!("spectrum must be non-empty, got {}x{}", rows, cols),
            ));
        }
        Ok(Self { coefficients })
    }

    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        self.coefficients.dim()
    }

    pub fn coefficients(&self) -> &Array2<Complex64> {
        &self.coefficients
    }

    pub fn into_array(self) -> Array2<Complex64> {
        self.coefficients
    }

    /// The zero-frequency coefficient, located at the grid center.
    pub fn dc(&self) -> Complex64 {
        let (rows, cols) = self.dim();
        self.coefficients[[rows / 2, cols / 2]]
    }
}

/// Forward 2D DFT of a real-valued grid, centered.
pub fn forward(grid: &Array2<f64>) -> SpectrumResult<ComplexSpectrum> {
    let (rows, cols) = grid.dim();
    if rows == 0 || cols == 0 {
        return Err(SpectrumError::invalid_input(
            "forward transform",
            format!("grid must be non-empty, got {}x{}", rows, cols),
        ));
    }

    let mut coefficients = grid.mapv(|v| Complex64::new(v, 0.0));
    fft::fft2_in_place(&mut coefficients, FftDirection::Forward);
    ComplexSpectrum::from_centered(fft_shift(&coefficients))
}

/// Forward transform of an 8-bit image.
pub fn forward_raster(raster: &Raster) -> SpectrumResult<ComplexSpectrum> {
    forward(&raster.to_f64())
}

/// Inverse 2D DFT of a centered spectrum, keeping the complex result.
pub fn inverse_complex(spectrum: &ComplexSpectrum) -> Array2<Complex64> {
    let (rows, cols) = spectrum.dim();
    let mut grid = ifft_shift(spectrum.coefficients());
    fft::fft2_in_place(&mut grid, FftDirection::Inverse);

    let scale = 1.0 / (rows * cols) as f64;
    grid.mapv_inplace(|v| v * scale);
    grid
}

/// Inverse 2D DFT of a centered spectrum, real part only.
///
/// The imaginary residual is discarded unchecked; for a spectrum derived
/// from a real image it is numerical noise.
pub fn inverse(spectrum: &ComplexSpectrum) -> Array2<f64> {
    inverse_complex(spectrum).mapv(|v| v.re)
}
