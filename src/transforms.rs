//! Unitary Fourier transform layer.
//!
//! 2-D transforms built from pre-computed 1-D rustfft plans (row pass then
//! column pass). The unitary convention scales both directions by
//! `1/sqrt(rows * cols)`, so the forward and inverse transforms are exact
//! adjoints and Parseval holds without extra factors.
//!
//! Real-valued images use the Hermitian half-plane packed representation of
//! shape `(rows, cols/2 + 1)`; [`urfft2`] and [`uirfft2`] are that pair.
//! [`ir2tf`] converts a spatial impulse response into a transfer function
//! with the zero-phase convention of the restoration filters: the kernel
//! center is rolled to the origin and the forward transform is left
//! unnormalized, so a normalized kernel has unit DC gain.

use ndarray::{s, Array2, ArrayView2};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::float_trait::RestoreFloat;
use crate::operator::SpectralPacking;

/// Pre-computed FFT plans for one image shape.
///
/// Reusing plans avoids expensive re-initialization when the same shape is
/// transformed repeatedly, as the Gibbs sampler does every iteration.
pub struct UftPlans<F: RestoreFloat> {
    shape: (usize, usize),
    fft_row: Arc<dyn Fft<F>>,
    fft_col: Arc<dyn Fft<F>>,
    ifft_row: Arc<dyn Fft<F>>,
    ifft_col: Arc<dyn Fft<F>>,
}

impl<F: RestoreFloat> UftPlans<F> {
    /// Create plans for images of the given `(rows, cols)` shape.
    pub fn new(shape: (usize, usize)) -> Self {
        let (rows, cols) = shape;
        let mut planner = FftPlanner::new();
        Self {
            shape,
            fft_row: planner.plan_fft_forward(cols),
            fft_col: planner.plan_fft_forward(rows),
            ifft_row: planner.plan_fft_inverse(cols),
            ifft_col: planner.plan_fft_inverse(rows),
        }
    }

    /// The spatial shape these plans were built for.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }
}

/// In-place 2-D pass: rows through `row_plan`, then columns through
/// `col_plan`. No normalization is applied.
fn transform2d<F: RestoreFloat>(
    data: &mut Array2<Complex<F>>,
    row_plan: &Arc<dyn Fft<F>>,
    col_plan: &Arc<dyn Fft<F>>,
) {
    let (rows, cols) = data.dim();

    let mut row_vec = vec![Complex::new(F::zero(), F::zero()); cols];
    for r in 0..rows {
        for c in 0..cols {
            row_vec[c] = data[[r, c]];
        }
        row_plan.process(&mut row_vec);
        for c in 0..cols {
            data[[r, c]] = row_vec[c];
        }
    }

    let mut col_vec = vec![Complex::new(F::zero(), F::zero()); rows];
    for c in 0..cols {
        for r in 0..rows {
            col_vec[r] = data[[r, c]];
        }
        col_plan.process(&mut col_vec);
        for r in 0..rows {
            data[[r, c]] = col_vec[r];
        }
    }
}

#[inline]
fn unitary_scale<F: RestoreFloat>(rows: usize, cols: usize) -> F {
    F::one() / F::usize_as(rows * cols).sqrt()
}

/// Unitary forward transform of a complex field (full plane).
pub fn ufft2<F: RestoreFloat>(
    field: ArrayView2<Complex<F>>,
    plans: &UftPlans<F>,
) -> Array2<Complex<F>> {
    debug_assert_eq!(field.dim(), plans.shape);
    let (rows, cols) = field.dim();
    let mut out = field.to_owned();
    transform2d(&mut out, &plans.fft_row, &plans.fft_col);
    let scale = unitary_scale::<F>(rows, cols);
    out.mapv_inplace(|v| v * scale);
    out
}

/// Unitary inverse transform of a complex spectrum (full plane).
pub fn uifft2<F: RestoreFloat>(
    spectrum: ArrayView2<Complex<F>>,
    plans: &UftPlans<F>,
) -> Array2<Complex<F>> {
    debug_assert_eq!(spectrum.dim(), plans.shape);
    let (rows, cols) = spectrum.dim();
    let mut out = spectrum.to_owned();
    transform2d(&mut out, &plans.ifft_row, &plans.ifft_col);
    let scale = unitary_scale::<F>(rows, cols);
    out.mapv_inplace(|v| v * scale);
    out
}

/// Unitary forward transform of a real image, half-plane packed.
///
/// Returns the `(rows, cols/2 + 1)` left half of the spectrum; the missing
/// columns are its conjugate mirror.
pub fn urfft2<F: RestoreFloat>(image: ArrayView2<F>, plans: &UftPlans<F>) -> Array2<Complex<F>> {
    debug_assert_eq!(image.dim(), plans.shape);
    let (rows, cols) = image.dim();
    let mut work = image.mapv(|v| Complex::new(v, F::zero()));
    transform2d(&mut work, &plans.fft_row, &plans.fft_col);
    let scale = unitary_scale::<F>(rows, cols);
    let half = cols / 2 + 1;
    Array2::from_shape_fn((rows, half), |(r, c)| work[[r, c]] * scale)
}

/// Unitary inverse of [`urfft2`]: reconstruct the full plane from Hermitian
/// symmetry and return the real image of `shape`.
pub fn uirfft2<F: RestoreFloat>(
    spectrum: ArrayView2<Complex<F>>,
    shape: (usize, usize),
    plans: &UftPlans<F>,
) -> Array2<F> {
    let (rows, cols) = shape;
    let half = cols / 2 + 1;
    debug_assert_eq!(spectrum.dim(), (rows, half));
    debug_assert_eq!(shape, plans.shape);

    let mut full = Array2::from_shape_fn((rows, cols), |(r, c)| {
        if c < half {
            spectrum[[r, c]]
        } else {
            spectrum[[(rows - r) % rows, cols - c]].conj()
        }
    });
    transform2d(&mut full, &plans.ifft_row, &plans.ifft_col);
    let scale = unitary_scale::<F>(rows, cols);
    full.mapv(|v| v.re * scale)
}

/// Convert a spatial impulse response into a transfer function.
///
/// The impulse response is zero-padded to `shape` with its center rolled to
/// the origin, so the transfer function carries no linear phase; this works
/// for odd and even kernel sizes. The forward transform is unnormalized,
/// matching the convention the restoration filters expect (a normalized
/// kernel has DC gain 1).
pub fn ir2tf<F: RestoreFloat>(
    ir: ArrayView2<F>,
    shape: (usize, usize),
    packing: SpectralPacking,
    plans: &UftPlans<F>,
) -> Result<Array2<Complex<F>>, String> {
    let (rows, cols) = shape;
    let (ir_rows, ir_cols) = ir.dim();
    if ir_rows > rows || ir_cols > cols {
        return Err(format!(
            "Impulse response shape ({}, {}) exceeds the image shape ({}, {})",
            ir_rows, ir_cols, rows, cols
        ));
    }

    let mut padded = Array2::from_elem((rows, cols), Complex::new(F::zero(), F::zero()));
    let shift_r = ir_rows / 2;
    let shift_c = ir_cols / 2;
    for r in 0..ir_rows {
        for c in 0..ir_cols {
            let rr = (r + rows - shift_r) % rows;
            let cc = (c + cols - shift_c) % cols;
            padded[[rr, cc]] = Complex::new(ir[[r, c]], F::zero());
        }
    }
    transform2d(&mut padded, &plans.fft_row, &plans.fft_col);

    Ok(match packing {
        SpectralPacking::FullPlane => padded,
        SpectralPacking::HalfPlane => padded.slice(s![.., ..cols / 2 + 1]).to_owned(),
    })
}

/// Default regularization operator: the discrete Laplacian.
///
/// Returns the transfer function for `shape` together with the 3x3
/// second-difference impulse response it was built from. The stencil sums
/// to zero, so the operator has no DC gain and penalizes high frequencies
/// only.
pub fn laplacian<F: RestoreFloat>(
    shape: (usize, usize),
    packing: SpectralPacking,
    plans: &UftPlans<F>,
) -> Result<(Array2<Complex<F>>, Array2<F>), String> {
    let mut impr = Array2::<F>::zeros((3, 3));
    let minus_one = F::from_f64_c(-1.0);
    impr[[0, 1]] = minus_one;
    impr[[1, 0]] = minus_one;
    impr[[1, 2]] = minus_one;
    impr[[2, 1]] = minus_one;
    impr[[1, 1]] = F::from_f64_c(4.0);

    let tf = ir2tf(impr.view(), shape, packing, plans)?;
    Ok((tf, impr))
}

/// Sum of squared magnitudes of a spectral array.
///
/// For a full-plane spectrum this is the plain sum. For a half-plane packed
/// spectrum each interior column stands for a conjugate pair and counts
/// twice, while the DC column and, for even widths, the Nyquist column are
/// their own mirrors and count once. With the unitary convention the result
/// equals the spatial sum of squares.
pub fn image_quad_norm<F: RestoreFloat>(
    spectrum: ArrayView2<Complex<F>>,
    spatial_shape: (usize, usize),
) -> F {
    let (rows, cols) = spatial_shape;
    if spectrum.dim() == (rows, cols) {
        return spectrum.iter().map(|v| v.norm_sqr()).sum();
    }

    let half = cols / 2 + 1;
    debug_assert_eq!(spectrum.dim(), (rows, half));
    let two = F::from_f64_c(2.0);
    let mut total = F::zero();
    for r in 0..rows {
        for c in 0..half {
            let energy = spectrum[[r, c]].norm_sqr();
            if c == 0 || (cols % 2 == 0 && c == half - 1) {
                total += energy;
            } else {
                total += two * energy;
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::prelude::*;

    fn random_image(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, cols), |_| rng.gen::<f64>() - 0.5)
    }

    fn random_field(rows: usize, cols: usize, seed: u64) -> Array2<Complex<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, cols), |_| {
            Complex::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
        })
    }

    fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f64, f64::max)
    }

    #[test]
    fn test_urfft2_roundtrip() {
        // Covers even/even, even/odd, odd/even and odd/odd shapes.
        let sizes = [(8, 8), (16, 12), (8, 7), (7, 8), (5, 9)];
        for (rows, cols) in sizes {
            let image = random_image(rows, cols, (rows * 1000 + cols) as u64);
            let plans = UftPlans::new((rows, cols));

            let spectrum = urfft2(image.view(), &plans);
            assert_eq!(spectrum.dim(), (rows, cols / 2 + 1));
            let back = uirfft2(spectrum.view(), (rows, cols), &plans);

            assert!(
                max_abs_diff(&image, &back) < 1e-12,
                "urfft2 roundtrip failed for {}x{}: max diff = {}",
                rows,
                cols,
                max_abs_diff(&image, &back)
            );
        }
    }

    #[test]
    fn test_ufft2_roundtrip() {
        let field = random_field(12, 10, 4242);
        let plans = UftPlans::new((12, 10));

        let spectrum = ufft2(field.view(), &plans);
        let back = uifft2(spectrum.view(), &plans);

        let max_diff = field
            .iter()
            .zip(back.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0f64, f64::max);
        assert!(max_diff < 1e-12, "ufft2 roundtrip failed: {}", max_diff);
    }

    #[test]
    fn test_urfft2_matches_full_plane() {
        let image = random_image(10, 8, 99);
        let plans = UftPlans::new((10, 8));

        let half = urfft2(image.view(), &plans);
        let field = image.mapv(|v| Complex::new(v, 0.0));
        let full = ufft2(field.view(), &plans);

        for r in 0..10 {
            for c in 0..5 {
                assert!(
                    (half[[r, c]] - full[[r, c]]).norm() < 1e-12,
                    "half/full mismatch at [{}, {}]",
                    r,
                    c
                );
            }
        }
    }

    #[test]
    fn test_quad_norm_parseval() {
        // With the unitary convention the half-plane quadratic norm must
        // equal the spatial energy, including odd widths where there is no
        // Nyquist column.
        for (rows, cols) in [(8, 8), (8, 7), (9, 12), (5, 5)] {
            let image = random_image(rows, cols, (rows + 31 * cols) as u64);
            let plans = UftPlans::new((rows, cols));

            let spatial_energy: f64 = image.iter().map(|v| v * v).sum();
            let spectral_energy = image_quad_norm(urfft2(image.view(), &plans).view(), (rows, cols));

            assert!(
                (spatial_energy - spectral_energy).abs() / spatial_energy < 1e-10,
                "Parseval violated for {}x{}: spatial={}, spectral={}",
                rows,
                cols,
                spatial_energy,
                spectral_energy
            );
        }
    }

    #[test]
    fn test_quad_norm_full_plane() {
        let image = random_image(8, 8, 7);
        let plans = UftPlans::new((8, 8));

        let field = image.mapv(|v| Complex::new(v, 0.0));
        let full = ufft2(field.view(), &plans);
        let spatial_energy: f64 = image.iter().map(|v| v * v).sum();

        let spectral_energy = image_quad_norm(full.view(), (8, 8));
        assert!((spatial_energy - spectral_energy).abs() < 1e-10);
    }

    #[test]
    fn test_ir2tf_unit_impulse_is_flat() {
        // A centered unit peak is the identity blur: flat unit gain.
        let mut ir = Array2::<f64>::zeros((3, 3));
        ir[[1, 1]] = 1.0;
        let plans = UftPlans::new((8, 8));

        let tf = ir2tf(ir.view(), (8, 8), SpectralPacking::FullPlane, &plans).unwrap();
        for v in tf.iter() {
            assert!((v.re - 1.0).abs() < 1e-12 && v.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_ir2tf_normalized_box_dc_gain() {
        let ir = Array2::<f64>::from_elem((5, 5), 1.0 / 25.0);
        let plans = UftPlans::new((16, 16));

        let tf = ir2tf(ir.view(), (16, 16), SpectralPacking::HalfPlane, &plans).unwrap();
        assert_eq!(tf.dim(), (16, 9));
        assert!((tf[[0, 0]].re - 1.0).abs() < 1e-12);
        assert!(tf[[0, 0]].im.abs() < 1e-12);
    }

    #[test]
    fn test_ir2tf_rejects_oversized_kernel() {
        let ir = Array2::<f64>::zeros((9, 9));
        let plans = UftPlans::new((8, 8));
        let result = ir2tf(ir.view(), (8, 8), SpectralPacking::FullPlane, &plans);
        assert!(result.is_err());
    }

    #[test]
    fn test_laplacian_transfer_function() {
        let (rows, cols) = (16, 16);
        let plans = UftPlans::new((rows, cols));
        let (tf, impr) = laplacian(
            (rows, cols),
            SpectralPacking::FullPlane,
            &plans,
        )
        .unwrap();

        // Stencil sums to zero: no DC gain.
        let stencil_sum: f64 = impr.iter().sum();
        assert!(stencil_sum.abs() < 1e-12);
        assert!(tf[[0, 0]].norm() < 1e-12);

        // Closed form: 4 - 2cos(2 pi r / M) - 2cos(2 pi c / N), real valued.
        for (r, c) in [(1, 0), (3, 5), (8, 8)] {
            let expected = 4.0
                - 2.0 * (2.0 * std::f64::consts::PI * r as f64 / rows as f64).cos()
                - 2.0 * (2.0 * std::f64::consts::PI * c as f64 / cols as f64).cos();
            assert!(
                (tf[[r, c]].re - expected).abs() < 1e-10 && tf[[r, c]].im.abs() < 1e-10,
                "Laplacian TF mismatch at [{}, {}]: {:?} vs {}",
                r,
                c,
                tf[[r, c]],
                expected
            );
        }
    }
}
