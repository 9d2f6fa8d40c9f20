//! Memory-bounded shell sampling for the active reference points.
//!
//! Each batch packs a point cloud of `|batch| * |shell|` query positions,
//! samples the evaluation grid at all of them, then reduces each point's
//! shell to its smallest absolute relative dose difference.

use crate::config::NormalisationMode;
use crate::plan::GammaPlan;
use crate::shell::Shell;

/// Bytes held per query coordinate (the cloud plus the sampled values).
const BYTES_PER_COORD: u64 = (std::mem::size_of::<f64>() * 2) as u64;

/// Reusable buffers for one batch.
#[derive(Default)]
pub(crate) struct BatchBuffers {
    pub(crate) cloud: Vec<f64>,
    pub(crate) sampled: Vec<f64>,
}

/// Number of batches needed to keep one batch within `ram_available` bytes.
pub(crate) fn batch_count(
    shell_len: usize,
    points: usize,
    ndim: usize,
    ram_available: u64,
) -> usize {
    let estimated = (shell_len as u64)
        .saturating_mul(points as u64)
        .saturating_mul(ndim as u64)
        .saturating_mul(BYTES_PER_COORD);
    let count = estimated.div_ceil(ram_available.max(1)).max(1);
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    count.min(points.max(1))
}

/// Batch length that splits `points` into `count` nearly equal batches.
pub(crate) fn batch_len(points: usize, count: usize) -> usize {
    points.div_ceil(count.max(1)).max(1)
}

/// Denominator for the relative dose difference at a reference point.
#[inline]
pub(crate) fn dose_scale(plan: &GammaPlan<'_>, reference_dose: f64) -> f64 {
    match plan.mode() {
        NormalisationMode::Global => plan.global_normalisation(),
        NormalisationMode::Local => reference_dose,
    }
}

/// Smallest `|eval - ref| / scale` over one point's sampled shell.
#[inline]
pub(crate) fn min_relative_difference(sampled: &[f64], reference_dose: f64, scale: f64) -> f64 {
    sampled
        .iter()
        .map(|&eval| ((eval - reference_dose) / scale).abs())
        .fold(f64::INFINITY, f64::min)
}

/// Writes the shell-translated positions of one reference point.
#[inline]
pub(crate) fn translate_shell(origin: &[f64], shell: &Shell, out: &mut [f64]) {
    let ndim = origin.len();
    for (dst, offset) in out.chunks_exact_mut(ndim).zip(shell.iter()) {
        for ((d, &o), &s) in dst.iter_mut().zip(origin).zip(offset) {
            *d = o + s;
        }
    }
}

/// Computes the minimum relative dose difference for every point in `to_check`.
///
/// `out` is resized to `to_check.len()`; entry `k` belongs to `to_check[k]`.
pub(crate) fn min_dose_difference(
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
    let interp = plan.evaluation();

    for (batch, out_batch) in to_check.chunks(batch_size).zip(out.chunks_mut(batch_size)) {
        buffers.cloud.resize(batch.len() * shell_len * ndim, 0.0);
        buffers.sampled.resize(batch.len() * shell_len, 0.0);

        for (&point, cloud) in batch
            .iter()
            .zip(buffers.cloud.chunks_exact_mut(shell_len * ndim))
        {
            translate_shell(&coords[point * ndim..(point + 1) * ndim], shell, cloud);
        }

        interp.sample_into(&buffers.cloud, &mut buffers.sampled);

        for ((&point, sampled), value) in batch
            .iter()
            .zip(buffers.sampled.chunks_exact(shell_len))
            .zip(out_batch.iter_mut())
        {
            let reference_dose = doses[point];
            let scale = dose_scale(plan, reference_dose);
            *value = min_relative_difference(sampled, reference_dose, scale);
        }
    }
}
