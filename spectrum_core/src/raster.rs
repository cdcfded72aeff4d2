//! Single-channel 8-bit image grids and the boundary to the image codec.
//!
//! A [`Raster`] is the only image type the rest of the crate sees. Decoding
//! and encoding of file formats is delegated to the `image` crate; anything
//! it returns is flattened to 8-bit luma before entering the pipeline.

use std::io::Cursor;

use image::{GrayImage, ImageFormat};
use ndarray::Array2;

use crate::error::{SpectrumError, SpectrumResult};

/// A rectangular, non-empty grid of 8-bit intensity samples.
///
/// Rows index the vertical axis, columns the horizontal axis, so
/// `pixels[[y, x]]` addresses the sample at image coordinate `(x, y)`.
///
/// # Examples
///
/// ```
/// use spectrum_core::Raster;
///
/// let raster = Raster::from_vec(2, 3, vec![0, 1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(raster.dim(), (2, 3));
/// assert_eq!(raster.get(1, 2), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pixels: Array2<u8>,
}

impl Raster {
    /// Wraps an existing array, rejecting empty grids.
    pub fn from_array(pixels: Array2<u8>) -> SpectrumResult<Self> {
        let (rows, cols) = pixels.dim();
        if rows == 0 || cols == 0 {
            return Err(SpectrumError::invalid_input(
                "raster construction",
                format!("image must be non-empty, got {}x{}", rows, cols),
            ));
        }
        Ok(Self { pixels })
    }

    /// Builds a raster from row-major samples.
    pub fn from_vec(height: usize, width: usize, data: Vec<u8>) -> SpectrumResult<Self> {
        if data.len() != height * width {
            return Err(SpectrumError::invalid_input(
                "raster construction",
                format!(
                    "{} samples cannot fill a {}x{} grid",
                    data.len(),
                    height,
                    width
                ),
            ));
        }
        let pixels = Array2::from_shape_vec((height, width), data).map_err(|err| {
            SpectrumError::invalid_input("raster construction", err.to_string())
        })?;
        Self::from_array(pixels)
    }

    /// Builds a raster from nested rows, rejecting ragged input.
    pub fn from_rows(rows: &[Vec<u8>]) -> SpectrumResult<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(SpectrumError::invalid_input(
                "raster construction",
                format!(
                    "row {} has {} samples, expected {} (grid must be rectangular)",
                    index,
                    row.len(),
                    width
                ),
            ));
        }
        let data = rows.iter().flatten().copied().collect();
        Self::from_vec(rows.len(), width, data)
    }

    /// A grid where every sample has the same value.
    pub fn filled(height: usize, width: usize, value: u8) -> SpectrumResult<Self> {
        Self::from_array(Array2::from_elem((height, width), value))
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.pixels[[row, col]]
    }

    pub fn pixels(&self) -> &Array2<u8> {
        &self.pixels
    }

    pub fn into_array(self) -> Array2<u8> {
        self.pixels
    }

    /// Samples as real values, the input domain of the forward transform.
    pub fn to_f64(&self) -> Array2<f64> {
        self.pixels.mapv(f64::from)
    }

    /// Decodes an encoded image and converts it to 8-bit grayscale.
    ///
    /// `source` names the key or path the bytes came from and only appears
    /// in error messages.
    pub fn decode(bytes: &[u8], source: &str) -> SpectrumResult<Self> {
        if bytes.is_empty() {
            return Err(SpectrumError::invalid_input(
                format!("decode '{}'", source),
                "image is empty",
            ));
        }
        let decoded = image::load_from_memory(bytes).map_err(|err| {
            SpectrumError::invalid_input(format!("decode '{}'", source), err.to_string())
        })?;
        let luma = decoded.to_luma8();
        let (width, height) = (luma.width() as usize, luma.height() as usize);
        Self::from_vec(height, width, luma.into_raw()).map_err(|err| match err {
            SpectrumError::InvalidInput { reason, .. } => {
                SpectrumError::invalid_input(format!("decode '{}'", source), reason)
            }
            other => other,
        })
    }

    /// Encodes the grid as a single-channel 8-bit PNG.
    pub fn encode_png(&self) -> SpectrumResult<Vec<u8>> {
        let (height, width) = self.dim();
        let data: Vec<u8> = self.pixels.iter().copied().collect();
        let gray = GrayImage::from_raw(width as u32, height as u32, data).ok_or_else(|| {
            SpectrumError::invalid_input("png encode", "sample buffer does not match dimensions")
        })?;

        let mut buffer = Cursor::new(Vec::new());
        gray.write_to(&mut buffer, ImageFormat::Png)
            .map_err(|err| SpectrumError::invalid_input("png encode", err.to_string()))?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_grid() {
        let err = Raster::from_vec(0, 4, vec![]).unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let rows = vec![vec![1, 2, 3], vec![4, 5]];
        let err = Raster::from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("rectangular"));
    }

    #[test]
    fn test_rejects_short_buffer() {
        assert!(Raster::from_vec(2, 2, vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_png_survives_codec() {
        let raster = Raster::from_vec(3, 5, (0..15).map(|v| v * 17).collect()).unwrap();
        let bytes = raster.encode_png().unwrap();
        let decoded = Raster::decode(&bytes, "memory").unwrap();
        assert_eq!(decoded, raster);
    }

    #[test]
    fn test_decode_converts_color_to_luma() {
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 200, 200]));
        let mut buffer = Cursor::new(Vec::new());
        rgb.write_to(&mut buffer, ImageFormat::Png).unwrap();

        let raster = Raster::decode(buffer.get_ref(), "rgb.png").unwrap();
        assert_eq!(raster.dim(), (2, 2));
        assert!(raster.pixels().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Raster::decode(b"definitely not a png", "junk.bin").unwrap_err();
        assert!(err.to_string().contains("junk.bin"));
    }

    #[test]
    fn test_decode_rejects_empty_bytes() {
        let err = Raster::decode(&[], "empty.png").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
