//! Image deblurring core library.
//!
//! Pure Rust implementation of frequency-domain deconvolution for 2-D
//! images: the deterministic Wiener-Hunt filter, an unsupervised
//! Wiener-Hunt variant that estimates its own regularization strength with
//! a Gibbs sampler, and the Richardson-Lucy multiplicative iteration. This
//! crate contains all algorithm logic without bindings, I/O or
//! visualization.

pub mod convolution;
pub mod float_trait;
pub mod gibbs;
pub mod operator;
pub mod richardson_lucy;
pub mod transforms;
pub mod wiener;

// Re-export commonly used items at the crate root
pub use float_trait::RestoreFloat;
pub use gibbs::{unsupervised_wiener, GibbsChains, SamplerConfig};
pub use operator::{ImageOperator, SpectralPacking, TransferFunction};
pub use richardson_lucy::richardson_lucy;
pub use transforms::{ufft2, uifft2, uirfft2, urfft2, UftPlans};
pub use wiener::wiener;
