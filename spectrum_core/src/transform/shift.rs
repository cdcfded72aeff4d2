//! Quadrant swaps that move the zero-frequency bin to the grid center and back.
//!
//! For an axis of length `n` the forward shift rotates by `⌊n/2⌋` and the
//! inverse shift rotates by `⌈n/2⌉`. The two only coincide for even `n`, so
//! applying [`fft_shift`] twice does not undo it on odd extents.

use ndarray::Array2;

/// Relocates index `(0, 0)` to `(⌊H/2⌋, ⌊W/2⌋)` with wraparound.
pub fn fft_shift<T: Clone>(grid: &Array2<T>) -> Array2<T> {
    let (rows, cols) = grid.dim();
    roll(grid, rows / 2, cols / 2)
}

/// Exact inverse permutation of [`fft_shift`].
pub fn ifft_shift<T: Clone>(grid: &Array2<T>) -> Array2<T> {
    let (rows, cols) = grid.dim();
    roll(grid, rows - rows / 2, cols - cols / 2)
}

/// `out[(r + dr) % H, (c + dc) % W] = grid[r, c]`, with `dr <= H` and `dc <= W`.
fn roll<T: Clone>(grid: &Array2<T>, dr: usize, dc: usize) -> Array2<T> {
    let (rows, cols) = grid.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        grid[[(r + rows - dr) % rows, (c + cols - dc) % cols]].clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn test_shift_odd_row_vector() {
        let grid = arr2(&[[0, 1, 2, 3, 4]]);
        let shifted = fft_shift(&grid);
        assert_eq!(shifted, arr2(&[[3, 4, 0, 1, 2]]));
        assert_eq!(ifft_shift(&shifted), grid);
    }

    #[test]
    fn test_shift_even_is_involution() {
        let grid = Array2::from_shape_fn((4, 6), |(r, c)| r * 6 + c);
        assert_eq!(fft_shift(&fft_shift(&grid)), grid);
        assert_eq!(ifft_shift(&fft_shift(&grid)), grid);
    }

    #[test]
    fn test_double_forward_shift_is_not_inverse_for_odd() {
        let grid = Array2::from_shape_fn((3, 5), |(r, c)| r * 5 + c);
        assert_ne!(fft_shift(&fft_shift(&grid)), grid);
        assert_eq!(ifft_shift(&fft_shift(&grid)), grid);
    }

    #[test]
    fn test_origin_moves_to_center() {
        for (rows, cols) in [(1, 1), (2, 3), (5, 4), (7, 7)] {
            let mut grid = Array2::zeros((rows, cols));
            grid[[0, 0]] = 1u8;
            let shifted = fft_shift(&grid);
            assert_eq!(shifted[[rows / 2, cols / 2]], 1, "{}x{}", rows, cols);
            assert_eq!(shifted.iter().filter(|&&v| v == 1).count(), 1);
        }
    }
}
