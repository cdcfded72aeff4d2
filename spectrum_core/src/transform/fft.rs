//! Separable 2D FFT over `ndarray` grids.
//!
//! Rows are transformed first, then columns. Each lane is gathered into a
//! contiguous buffer, transformed in place and scattered back, so the grid
//! never needs a transposed copy.

use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Unnormalized 2D DFT in place. The inverse direction is NOT scaled.
pub(crate) fn fft2_in_place(grid: &mut Array2<Complex64>, direction: FftDirection) {
    let (rows, cols) = grid.dim();
    if rows == 0 || cols == 0 {
        return;
    }

    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft(cols, direction);
    let col_fft = planner.plan_fft(rows, direction);

    transform_lanes(grid, Axis(1), row_fft.as_ref());
    transform_lanes(grid, Axis(0), col_fft.as_ref());
}

/// Runs `fft` over every lane of `grid` that runs along `axis`.
fn transform_lanes(grid: &mut Array2<Complex64>, axis: Axis, fft: &dyn Fft<f64>) {
    let zero = Complex64::new(0.0, 0.0);
    let mut buffer = vec![zero; grid.len_of(axis)];
    let mut scratch = vec![zero; fft.get_inplace_scratch_len()];

    for mut lane in grid.lanes_mut(axis) {
        for (dst, src) in buffer.iter_mut().zip(lane.iter()) {
            *dst = *src;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (dst, src) in lane.iter_mut().zip(buffer.iter()) {
            *dst = *src;
        }
    }
}
