//! Wiener-Hunt deconvolution.
//!
//! Deterministic regularized inverse filtering with Fourier
//! diagonalisation. For the data model `y = Hx + n`, with `H` the PSF
//! transfer function and `n` additive noise, the filter is
//!
//! ```text
//! W = conj(H) / (|H|^2 + balance * |D|^2)
//! ```
//!
//! where `D` is the regularization transfer function (the discrete Laplacian
//! by default) and `balance` tunes data fidelity against high-frequency
//! penalization. The Fourier diagonalisation implies circulant blur.
//!
//! Reference: F. Orieux, J.-F. Giovannelli, T. Rodet, "Bayesian estimation
//! of regularization and point spread function parameters for Wiener-Hunt
//! deconvolution", J. Opt. Soc. Am. A 27, 1593-1607 (2010).

use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex;

use crate::float_trait::RestoreFloat;
use crate::operator::{ImageOperator, SpectralPacking};
use crate::transforms::{laplacian, ufft2, uifft2, uirfft2, urfft2, UftPlans};

/// Wiener-Hunt deconvolution of `image` by `psf`.
///
/// `balance` is the regularization strength; it must be finite. `reg`
/// defaults to the discrete Laplacian sized to the image. When `is_real` is
/// true all spectral arrays use the half-plane packed representation of a
/// real signal's transform; a pre-computed transfer function must have been
/// built with the matching packing.
///
/// A zero denominator bin (possible only for `balance = 0`) propagates
/// non-finite values into the output rather than being masked; well-posed
/// inputs are the caller's responsibility.
pub fn wiener<F: RestoreFloat>(
    image: ArrayView2<F>,
    psf: &ImageOperator<F>,
    balance: F,
    reg: Option<&ImageOperator<F>>,
    is_real: bool,
) -> Result<Array2<F>, String> {
    if !balance.is_finite() {
        return Err(format!("balance must be finite, got {:?}", balance));
    }

    let shape = image.dim();
    let packing = if is_real {
        SpectralPacking::HalfPlane
    } else {
        SpectralPacking::FullPlane
    };
    let plans = UftPlans::new(shape);

    let reg_tf = match reg {
        Some(op) => op.to_transfer_function(shape, packing, &plans)?,
        None => laplacian(shape, packing, &plans)?.0,
    };
    let psf_tf = psf.to_transfer_function(shape, packing, &plans)?;

    let filter = wiener_filter(&psf_tf, &reg_tf, balance);

    if is_real {
        let mut spectrum = urfft2(image, &plans);
        spectrum.zip_mut_with(&filter, |s, w| *s = *s * *w);
        Ok(uirfft2(spectrum.view(), shape, &plans))
    } else {
        let field = image.mapv(|v| Complex::new(v, F::zero()));
        let mut spectrum = ufft2(field.view(), &plans);
        spectrum.zip_mut_with(&filter, |s, w| *s = *s * *w);
        Ok(uifft2(spectrum.view(), &plans).mapv(|v| v.re))
    }
}

/// Elementwise filter `conj(H) / (|H|^2 + balance * |D|^2)`.
fn wiener_filter<F: RestoreFloat>(
    psf_tf: &Array2<Complex<F>>,
    reg_tf: &Array2<Complex<F>>,
    balance: F,
) -> Array2<Complex<F>> {
    Array2::from_shape_fn(psf_tf.dim(), |idx| {
        let h = psf_tf[idx];
        let d = reg_tf[idx];
        h.conj() / (h.norm_sqr() + balance * d.norm_sqr())
    })
}
