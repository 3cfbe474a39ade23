//! Richardson-Lucy deconvolution.
//!
//! Multiplicative spatial-domain iteration; the iteration count is the only
//! regularization knob.

use ndarray::{Array2, ArrayView2};

use crate::convolution::{convolve2d_same, flip2};
use crate::float_trait::RestoreFloat;

/// Richardson-Lucy restoration of `image` by `psf` over `iterations`
/// rounds.
///
/// The working estimate starts from a uniform 0.5 array. Each round divides
/// the observation by the re-blurred estimate and multiplies the estimate
/// by that ratio convolved with the mirrored PSF. A zero re-blur propagates
/// non-finite values; no clamping is applied and the output is not clipped
/// to the input's value range.
pub fn richardson_lucy<F: RestoreFloat>(
    image: ArrayView2<F>,
    psf: ArrayView2<F>,
    iterations: usize,
) -> Array2<F> {
    let mut estimate = Array2::from_elem(image.dim(), F::from_f64_c(0.5));
    let psf_mirror = flip2(psf);

    for _ in 0..iterations {
        let reblurred = convolve2d_same(estimate.view(), psf);
        let mut relative_blur = image.to_owned();
        relative_blur.zip_mut_with(&reblurred, |num, den| *num = *num / *den);
        let correction = convolve2d_same(relative_blur.view(), psf_mirror.view());
        estimate.zip_mut_with(&correction, |e, c| *e = *e * *c);
    }
    estimate
}
