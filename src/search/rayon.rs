//! Rayon-parallel shell sampling (feature-gated).
//!
//! Splits each batch over reference points: cloud construction, grid
//! sampling and the per-point reduction all run in parallel. Results match
//! the sequential path exactly because every point is reduced independently.

use crate::plan::GammaPlan;
use crate::search::batch::{dose_scale, min_relative_difference, translate_shell, BatchBuffers};
use crate::shell::Shell;
use rayon::prelude::*;

/// Parallel counterpart of `batch::min_dose_difference`.
pub(crate) fn min_dose_difference_par(
    plan: &GammaPlan<'_>,
    shell: &Shell,
    to_check: &[usize],
    batch_size: usize,
    buffers: &mut BatchBuffers,
    out: &mut Vec<f64>,
) {
    out.clear();
    out.resize(to_check.len(), f64::INFINITY);

    let ndim = plan.ndim();
    let shell_len = shell.len();
    let coords = plan.flat_reference_coords();
    let doses = plan.flat_reference_dose();
    let interp = *plan.evaluation();

    for (batch, out_batch) in to_check.chunks(batch_size).zip(out.chunks_mut(batch_size)) {
        buffers.cloud.resize(batch.len() * shell_len * ndim, 0.0);
        buffers.sampled.resize(batch.len() * shell_len, 0.0);

        buffers
            .cloud
            .par_chunks_mut(shell_len * ndim)
            .zip(batch.par_iter())
            .for_each(|(cloud, &point)| {
                translate_shell(&coords[point * ndim..(point + 1) * ndim], shell, cloud);
            });

        buffers
            .sampled
            .par_chunks_mut(shell_len)
            .zip(buffers.cloud.par_chunks(shell_len * ndim))
            .for_each(|(sampled, cloud)| interp.sample_into(cloud, sampled));

        out_batch
            .par_iter_mut()
            .zip(buffers.sampled.par_chunks(shell_len))
            .zip(batch.par_iter())
            .for_each(|((value, sampled), &point)| {
                let reference_dose = doses[point];
                let scale = dose_scale(plan, reference_dose);
                *value = min_relative_difference(sampled, reference_dose, scale);
            });
    }
}
