//! Blur-operator representations.
//!
//! A PSF or regularization operator enters the API either as a spatial
//! impulse response or as a pre-computed frequency-domain transfer function.
//! The representation is an explicit tagged variant, and a transfer function
//! records the packing it was built with, so half-plane and full-plane
//! spectra cannot be mixed within one invocation.

use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex;

use crate::float_trait::RestoreFloat;
use crate::transforms::{ir2tf, UftPlans};

/// Spectral representation used by a restoration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralPacking {
    /// Conjugate-symmetric packing of a real signal's spectrum:
    /// shape `(rows, cols/2 + 1)`.
    HalfPlane,
    /// Full complex plane: shape `(rows, cols)`.
    FullPlane,
}

impl SpectralPacking {
    /// Expected spectrum shape for an image of `image_shape`.
    pub fn spectral_shape(self, image_shape: (usize, usize)) -> (usize, usize) {
        let (rows, cols) = image_shape;
        match self {
            SpectralPacking::HalfPlane => (rows, cols / 2 + 1),
            SpectralPacking::FullPlane => (rows, cols),
        }
    }
}

/// A frequency-domain operator together with its packing.
#[derive(Debug, Clone)]
pub struct TransferFunction<F: RestoreFloat> {
    data: Array2<Complex<F>>,
    packing: SpectralPacking,
}

impl<F: RestoreFloat> TransferFunction<F> {
    pub fn new(data: Array2<Complex<F>>, packing: SpectralPacking) -> Self {
        Self { data, packing }
    }

    pub fn data(&self) -> ArrayView2<'_, Complex<F>> {
        self.data.view()
    }

    pub fn packing(&self) -> SpectralPacking {
        self.packing
    }
}

/// PSF or regularization operator, in either domain.
#[derive(Debug, Clone)]
pub enum ImageOperator<F: RestoreFloat> {
    /// Spatial impulse response; converted to a transfer function on use.
    Impulse(Array2<F>),
    /// Pre-computed transfer function.
    Transfer(TransferFunction<F>),
}

impl<F: RestoreFloat> ImageOperator<F> {
    /// Resolve the operator to a transfer function for an image of
    /// `image_shape`.
    ///
    /// An impulse response is converted with [`ir2tf`]; a supplied transfer
    /// function is checked against the packing and spectral shape the
    /// invocation expects.
    pub fn to_transfer_function(
        &self,
        image_shape: (usize, usize),
        packing: SpectralPacking,
        plans: &UftPlans<F>,
    ) -> Result<Array2<Complex<F>>, String> {
        match self {
            ImageOperator::Impulse(ir) => ir2tf(ir.view(), image_shape, packing, plans),
            ImageOperator::Transfer(tf) => {
                if tf.packing != packing {
                    return Err(format!(
                        "Transfer function uses {:?} packing, but this invocation requires {:?}",
                        tf.packing, packing
                    ));
                }
                let expected = packing.spectral_shape(image_shape);
                if tf.data.dim() != expected {
                    return Err(format!(
                        "Transfer function shape {:?} does not match the expected spectral shape {:?} for an image of shape {:?}",
                        tf.data.dim(),
                        expected,
                        image_shape
                    ));
                }
                Ok(tf.data.clone())
            }
        }
    }
}
