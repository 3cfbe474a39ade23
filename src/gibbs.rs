//! Unsupervised Wiener-Hunt deconvolution.
//!
//! Single-chain Gibbs sampler that alternates between a conditional
//! Gaussian draw of the restored image in the frequency domain and
//! conditional Gamma draws of the noise and prior precisions, following the
//! hierarchical linear-Gaussian model with Laplacian smoothness prior of
//! Orieux, Giovannelli and Rodet, "Bayesian estimation of regularization
//! and point spread function parameters for Wiener-Hunt deconvolution",
//! J. Opt. Soc. Am. A 27, 1593-1607 (2010).
//!
//! The returned image is the empirical posterior mean over the retained
//! (post-burn-in) samples; the two precision chains are returned in full as
//! diagnostics.

use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};
use rustfft::num_complex::Complex;

use crate::float_trait::RestoreFloat;
use crate::operator::{ImageOperator, SpectralPacking};
use crate::transforms::{image_quad_norm, laplacian, uirfft2, urfft2, UftPlans};

// =============================================================================
// Constants
// =============================================================================

/// Default stopping threshold on the relative change between successive
/// empirical means of the image samples.
const DEFAULT_THRESHOLD: f64 = 1e-4;

/// Default number of initial iterations excluded from the posterior mean.
const DEFAULT_BURNIN: usize = 15;

/// Default minimum number of iterations before the stopping rule applies.
const DEFAULT_MIN_ITER: usize = 30;

/// Default maximum number of iterations.
const DEFAULT_MAX_ITER: usize = 200;

// =============================================================================
// Types
// =============================================================================

/// Gibbs sampler options.
///
/// All parameters have defaults matching the reference implementation. Use
/// `Default::default()` for standard settings.
#[derive(Debug, Clone)]
pub struct SamplerConfig<F: RestoreFloat> {
    /// Stopping criterion: relative change between two successive empirical
    /// means of the image samples. Default: 1e-4
    pub threshold: F,
    /// Number of initial samples ignored by the posterior mean. Default: 15
    pub burnin: usize,
    /// Minimum number of iterations. Default: 30
    pub min_iter: usize,
    /// Maximum number of iterations if `threshold` is not met. Default: 200
    pub max_iter: usize,
}

impl<F: RestoreFloat> Default for SamplerConfig<F> {
    fn default() -> Self {
        Self {
            threshold: F::from_f64_c(DEFAULT_THRESHOLD),
            burnin: DEFAULT_BURNIN,
            min_iter: DEFAULT_MIN_ITER,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl<F: RestoreFloat> SamplerConfig<F> {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters.
    ///
    /// Requires `burnin < min_iter < max_iter`, which guarantees at least
    /// one retained sample before the final normalization and keeps the
    /// stopping-rule arithmetic well defined.
    pub fn validate(&self) -> Result<(), String> {
        if self.threshold <= F::zero() || !self.threshold.is_finite() {
            return Err(format!(
                "threshold must be positive and finite, got {:?}",
                self.threshold
            ));
        }
        if self.burnin >= self.min_iter {
            return Err(format!(
                "burnin ({}) must be strictly less than min_iter ({})",
                self.burnin, self.min_iter
            ));
        }
        if self.min_iter >= self.max_iter {
            return Err(format!(
                "min_iter ({}) must be strictly less than max_iter ({})",
                self.min_iter, self.max_iter
            ));
        }
        Ok(())
    }
}

/// Append-only chain of precision samples, seeded so `last` is always
/// defined.
#[derive(Debug)]
struct PrecisionChain<F: RestoreFloat> {
    samples: Vec<F>,
}

impl<F: RestoreFloat> PrecisionChain<F> {
    fn seeded() -> Self {
        Self {
            samples: vec![F::one()],
        }
    }

    fn last(&self) -> F {
        self.samples[self.samples.len() - 1]
    }

    fn push(&mut self, value: F) {
        self.samples.push(value);
    }

    fn into_samples(self) -> Vec<F> {
        self.samples
    }
}

/// Full diagnostic chains of a sampler run.
///
/// Each chain holds the initial seed value 1 followed by one sample per
/// completed iteration.
#[derive(Debug, Clone)]
pub struct GibbsChains<F: RestoreFloat> {
    /// Noise precision samples.
    pub noise: Vec<F>,
    /// Prior (object) precision samples.
    pub prior: Vec<F>,
}

// =============================================================================
// Sampler
// =============================================================================

/// Unsupervised Wiener-Hunt deconvolution of `image` by `psf`.
///
/// The hyperparameters of the Wiener filter are estimated jointly with the
/// restored image by Gibbs sampling; `reg` defaults to the discrete
/// Laplacian. Spectral arrays use the half-plane packed representation
/// throughout.
///
/// `rng` is the explicit random source, so seeded runs are reproducible.
/// `observer`, when present, is invoked synchronously once per iteration
/// with the raw spectral-domain image sample; it is for external
/// diagnostics only and has no influence on the algorithm.
///
/// Returns the posterior-mean image together with the full precision
/// chains.
pub fn unsupervised_wiener<F, R>(
    image: ArrayView2<F>,
    psf: &ImageOperator<F>,
    reg: Option<&ImageOperator<F>>,
    config: &SamplerConfig<F>,
    rng: &mut R,
    mut observer: Option<&mut dyn FnMut(ArrayView2<Complex<F>>)>,
) -> Result<(Array2<F>, GibbsChains<F>), String>
where
    F: RestoreFloat,
    R: Rng + ?Sized,
{
    config.validate()?;

    let shape = image.dim();
    let packing = SpectralPacking::HalfPlane;
    let plans = UftPlans::new(shape);

    let reg_tf = match reg {
        Some(op) => op.to_transfer_function(shape, packing, &plans)?,
        None => laplacian(shape, packing, &plans)?.0,
    };
    let psf_tf = psf.to_transfer_function(shape, packing, &plans)?;

    // |H|^2 and |D|^2 are reused every iteration.
    let atf2 = psf_tf.mapv(|v| v.norm_sqr());
    let areg2 = reg_tf.mapv(|v| v.norm_sqr());

    let image_size = (shape.0 * shape.1) as f64;
    let spectrum = urfft2(image, &plans);
    let spec_shape = spectrum.dim();

    let mut gn_chain = PrecisionChain::seeded();
    let mut gx_chain = PrecisionChain::seeded();

    // Running (unnormalized) posterior mean and its previous state.
    let mut x_postmean = Array2::<Complex<F>>::zeros(spec_shape);
    let mut prev_x_postmean = Array2::<Complex<F>>::zeros(spec_shape);

    // Relative change between successive empirical means. NaN until enough
    // post-burn-in samples exist, which never satisfies the threshold.
    let mut delta = F::nan();
    let mut last_iteration = 0;

    let mut x_sample = Array2::<Complex<F>>::zeros(spec_shape);
    let mut work = Array2::<Complex<F>>::zeros(spec_shape);

    for iteration in 0..config.max_iter {
        last_iteration = iteration;
        let gn_last = gn_chain.last();
        let gx_last = gx_chain.last();

        // Conditional Gaussian draw of the image: mean filter
        // gn * conj(H) / precision plus a complex excursion with standard
        // deviation sqrt(0.5 / precision) on each part.
        for ((r, c), slot) in x_sample.indexed_iter_mut() {
            let precision = gn_last * atf2[[r, c]] + gx_last * areg2[[r, c]];
            let std_dev = (F::from_f64_c(0.5) / precision).sqrt();
            let re: f64 = StandardNormal.sample(rng);
            let im: f64 = StandardNormal.sample(rng);
            let excursion =
                Complex::new(std_dev * F::from_f64_c(re), std_dev * F::from_f64_c(im));
            let mean_filter = psf_tf[[r, c]].conj() * (gn_last / precision);
            *slot = mean_filter * spectrum[[r, c]] + excursion;
        }

        if let Some(ref mut callback) = observer {
            callback(x_sample.view());
        }

        // Noise precision conditional on the image sample.
        for ((r, c), slot) in work.indexed_iter_mut() {
            *slot = spectrum[[r, c]] - x_sample[[r, c]] * psf_tf[[r, c]];
        }
        let residual_norm = image_quad_norm(work.view(), shape)
            .to_f64()
            .unwrap_or(f64::NAN);
        let gn_gamma = Gamma::new(image_size / 2.0, 2.0 / residual_norm)
            .map_err(|e| format!("invalid Gamma parameters for the noise precision: {}", e))?;
        gn_chain.push(F::from_f64_c(gn_gamma.sample(rng)));

        // Prior precision conditional on the image sample.
        for ((r, c), slot) in work.indexed_iter_mut() {
            *slot = x_sample[[r, c]] * reg_tf[[r, c]];
        }
        let prior_norm = image_quad_norm(work.view(), shape)
            .to_f64()
            .unwrap_or(f64::NAN);
        let gx_gamma = Gamma::new((image_size - 1.0) / 2.0, 2.0 / prior_norm)
            .map_err(|e| format!("invalid Gamma parameters for the prior precision: {}", e))?;
        gx_chain.push(F::from_f64_c(gx_gamma.sample(rng)));

        // Posterior mean bookkeeping: accumulate once past burn-in, then
        // track the relative change between successive empirical means.
        if iteration > config.burnin {
            for (acc, sample) in x_postmean.iter_mut().zip(x_sample.iter()) {
                *acc = *acc + *sample;
            }
        }
        if iteration > config.burnin + 1 {
            let n_current = F::usize_as(iteration - config.burnin);
            let n_previous = n_current - F::one();
            let mut diff_sum = F::zero();
            let mut total_sum = F::zero();
            for (current, previous) in x_postmean.iter().zip(prev_x_postmean.iter()) {
                diff_sum += (*current / n_current - *previous / n_previous).norm();
                total_sum += current.norm();
            }
            delta = diff_sum / total_sum / n_current;
        }
        prev_x_postmean.assign(&x_postmean);

        if iteration > config.min_iter && delta < config.threshold {
            break;
        }
    }

    // Empirical average of the retained samples, back to the image domain.
    let count = F::usize_as(last_iteration - config.burnin);
    let posterior_mean = x_postmean.mapv(|v| v / count);
    let restored = uirfft2(posterior_mean.view(), shape, &plans);

    Ok((
        restored,
        GibbsChains {
            noise: gn_chain.into_samples(),
            prior: gx_chain.into_samples(),
        },
    ))
}
