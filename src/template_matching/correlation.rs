//! Frequency-domain cross-correlation of a template against every offset of a frame
//!
//! Products are summed in f64 and rounded back to integers. For 8-bit inputs the
//! accumulated floating point error stays far below 0.5 even for 4K frames, so
//! the rounded values equal the exact integer sums.

use image::GrayImage;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Smallest length >= `n` whose only prime factors are 2, 3 and 5
fn fft_len(n: usize) -> usize {
    let mut candidate = n.max(1);
    loop {
        let mut rest = candidate;
        for p in [2, 3, 5] {
            while rest % p == 0 {
                rest /= p;
            }
        }
        if rest == 1 {
            return candidate;
        }
        candidate += 1;
    }
}

fn transpose(src: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut dst = vec![Complex::new(0.0, 0.0); src.len()];
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
    dst
}

/// 2D transform over a `rows` x `cols` grid, built from 1D row and column passes
struct Fft2d {
    rows: usize,
    cols: usize,
    row_forward: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            rows,
            cols,
            row_forward: planner.plan_fft_forward(cols),
            col_forward: planner.plan_fft_forward(rows),
            row_inverse: planner.plan_fft_inverse(cols),
            col_inverse: planner.plan_fft_inverse(rows),
        }
    }

    /// Spectrum of `image` zero-padded to the grid, stored column-major
    fn forward(&self, image: &GrayImage) -> Vec<Complex<f64>> {
        let width = image.width() as usize;
        let mut grid = vec![Complex::new(0.0, 0.0); self.rows * self.cols];
        for (y, row) in image.as_raw().chunks_exact(width.max(1)).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                grid[y * self.cols + x].re = v as f64;
            }
        }
        self.row_forward.process(&mut grid);
        let mut columns = transpose(&grid, self.rows, self.cols);
        self.col_forward.process(&mut columns);
        columns
    }

    /// Inverse of [`Fft2d::forward`], returned row-major and normalized
    fn inverse(&self, mut columns: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        self.col_inverse.process(&mut columns);
        let mut grid = transpose(&columns, self.cols, self.rows);
        self.row_inverse.process(&mut grid);
        let scale = 1.0 / (self.rows * self.cols) as f64;
        for v in grid.iter_mut() {
            *v *= scale;
        }
        grid
    }
}

/// Sum of `frame * template` products for every offset where the template fits
///
/// Returns a row-major grid of `(W - w + 1) x (H - h + 1)` values. The caller
/// guarantees the template is non-empty and fits in the frame.
pub(crate) fn valid_cross_correlation(frame: &GrayImage, template: &GrayImage) -> Vec<i64> {
    let (fw, fh) = (frame.width() as usize, frame.height() as usize);
    let (tw, th) = (template.width() as usize, template.height() as usize);
    let (out_w, out_h) = (fw - tw + 1, fh - th + 1);

    // Circular correlation over a grid at least the frame's size never wraps
    // for offsets where the template fits entirely
    let fft = Fft2d::new(fft_len(fh), fft_len(fw));
    let mut spectrum = fft.forward(frame);
    let template_spectrum = fft.forward(template);
    for (f, t) in spectrum.iter_mut().zip(&template_spectrum) {
        *f *= t.conj();
    }
    let grid = fft.inverse(spectrum);

    let mut out = Vec::with_capacity(out_w * out_h);
    for y in 0..out_h {
        let row = &grid[y * fft.cols..y * fft.cols + out_w];
        out.extend(row.iter().map(|v| v.re.round() as i64));
    }
    out
}
