//! Spatial-domain 2-D convolution for the iterative restoration path.

use ndarray::{s, Array2, ArrayView2};

use crate::float_trait::RestoreFloat;

/// True 2-D linear convolution with "same"-size output.
///
/// The output has the image's shape and is the centered crop of the full
/// convolution, with zero padding outside the image. The kernel is applied
/// flipped, as convolution requires; compose with [`flip2`] to obtain
/// correlation instead.
pub fn convolve2d_same<F: RestoreFloat>(image: ArrayView2<F>, kernel: ArrayView2<F>) -> Array2<F> {
    let (rows, cols) = image.dim();
    let (k_rows, k_cols) = kernel.dim();
    if k_rows == 0 || k_cols == 0 {
        return Array2::zeros((rows, cols));
    }

    // Centered crop of the full convolution starts at ((k-1)/2, (k-1)/2).
    let offset_r = (k_rows - 1) / 2;
    let offset_c = (k_cols - 1) / 2;
    let mut output = Array2::zeros((rows, cols));

    for i in 0..rows {
        for j in 0..cols {
            let mut sum = F::zero();
            for ki in 0..k_rows {
                for kj in 0..k_cols {
                    let src_r = i as isize + offset_r as isize - ki as isize;
                    let src_c = j as isize + offset_c as isize - kj as isize;
                    if src_r >= 0
                        && src_r < rows as isize
                        && src_c >= 0
                        && src_c < cols as isize
                    {
                        sum += image[[src_r as usize, src_c as usize]] * kernel[[ki, kj]];
                    }
                }
            }
            output[[i, j]] = sum;
        }
    }
    output
}

/// Reverse a kernel along both axes (its spatial adjoint).
pub fn flip2<F: RestoreFloat>(kernel: ArrayView2<F>) -> Array2<F> {
    kernel.slice(s![..;-1, ..;-1]).to_owned()
}
