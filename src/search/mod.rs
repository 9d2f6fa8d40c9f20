//! Shell search over increasing distances.
//!
//! Starting at radius zero, every still-active reference point is compared
//! against the evaluation dose on a shell of the current radius. The best
//! gamma seen so far is kept per point and threshold pair. A pair stops
//! searching once its gamma is no larger than `distance / dta`, since every
//! larger radius contributes at least that much through the distance term.

pub(crate) mod batch;
#[cfg(feature = "rayon")]
pub(crate) mod rayon;

use crate::plan::GammaPlan;
use crate::search::batch::{batch_count, batch_len, min_dose_difference, BatchBuffers};
use crate::shell::Shell;
use crate::trace::{trace_event, trace_span, trace_step};
use crate::util::GammaResult;

/// Runs the distance loop.
///
/// Returns the best gamma per point and threshold pair, packed as
/// `(N, P, Q)` with dose thresholds `P` and distance thresholds `Q`. Points
/// that were never evaluated or never matched hold `+inf`.
pub(crate) fn run_search(plan: &GammaPlan<'_>) -> GammaResult<Vec<f64>> {
    let ndim = plan.ndim();
    let dose_fractions: Vec<f64> = plan
        .dose_percent_thresholds()
        .iter()
        .map(|p| p / 100.0)
        .collect();
    let distances = plan.distance_mm_thresholds();
    let num_cells = dose_fractions.len() * distances.len();
    let interp_fraction = plan.interp_fraction();

    let mut current_gamma = vec![f64::INFINITY; plan.num_points() * num_cells];
    let mut to_check: Vec<usize> = plan
        .points_to_calc()
        .iter()
        .enumerate()
        .filter_map(|(idx, &calc)| calc.then_some(idx))
        .collect();

    let _span = trace_span!(
        "gamma_search",
        points = to_check.len(),
        ndim = ndim,
        cells = num_cells
    )
    .entered();

    let mut forced_distances = distances.to_vec();
    forced_distances.sort_by(f64::total_cmp);
    forced_distances.dedup();
    let mut next_forced = 0usize;

    let mut distance = 0.0f64;
    let mut step = plan.distance_thresholds().min() / interp_fraction;
    let mut active_columns = vec![false; distances.len()];
    let mut min_diff = Vec::with_capacity(to_check.len());
    let mut buffers = BatchBuffers::default();
    let mut iterations = 0usize;

    while !to_check.is_empty() && distance <= plan.maximum_test_distance() {
        let shell = Shell::new(distance, ndim, step)?;
        let batches = batch_count(shell.len(), to_check.len(), ndim, plan.ram_available());
        trace_step!(
            "gamma_iteration",
            distance = distance,
            remaining = to_check.len(),
            shell_points = shell.len(),
            batches = batches,
        );

        let batch_size = batch_len(to_check.len(), batches);
        shell_min_dose_difference(
            plan,
            &shell,
            &to_check,
            batch_size,
            &mut buffers,
            &mut min_diff,
        );

        active_columns.fill(false);
        let mut still_searching = Vec::with_capacity(to_check.len());
        for (&point, &diff) in to_check.iter().zip(&min_diff) {
            let cells = &mut current_gamma[point * num_cells..(point + 1) * num_cells];
            if update_point(
                cells,
                diff,
                distance,
                &dose_fractions,
                distances,
                plan.skip_once_passed(),
                &mut active_columns,
            ) {
                still_searching.push(point);
            }
        }
        to_check = still_searching;
        iterations += 1;
        if to_check.is_empty() {
            break;
        }

        let relevant_min = distances
            .iter()
            .zip(&active_columns)
            .filter(|(_, active)| **active)
            .map(|(&dta, _)| dta)
            .fold(f64::INFINITY, f64::min);
        let floor = distance / interp_fraction / plan.max_gamma();
        step = (relevant_min / interp_fraction).max(floor);

        distance += step;
        if let Some(&forced) = forced_distances.get(next_forced) {
            if distance >= forced {
                distance = forced;
                next_forced += 1;
            }
        }
    }

    trace_event!(
        "gamma_complete",
        iterations = iterations,
        final_distance = distance,
        unresolved = to_check.len(),
    );

    Ok(current_gamma)
}

fn shell_min_dose_difference(
    plan: &GammaPlan<'_>,
    shell: &Shell,
    to_check: &[usize],
    batch_size: usize,
    buffers: &mut BatchBuffers,
    out: &mut Vec<f64>,
) {
    #[cfg(feature = "rayon")]
    if plan.parallel() {
        crate::search::rayon::min_dose_difference_par(
            plan,
            shell,
            to_check,
            batch_size,
            buffers,
            out,
        );
        return;
    }
    min_dose_difference(plan, shell, to_check, batch_size, buffers, out);
}

/// Folds one radius into a point's threshold cells.
///
/// Returns whether any cell is still searching; marks the distance columns
/// of the active cells in `active_columns`.
fn update_point(
    cells: &mut [f64],
    min_relative_diff: f64,
    distance: f64,
    dose_fractions: &[f64],
    distances: &[f64],
    skip_once_passed: bool,
    active_columns: &mut [bool],
) -> bool {
    let num_distances = distances.len();
    let mut searching = false;
    for (dose_idx, &fraction) in dose_fractions.iter().enumerate() {
        let dose_term = min_relative_diff / fraction;
        for (dist_idx, &dta) in distances.iter().enumerate() {
            let distance_term = distance / dta;
            let candidate = (dose_term * dose_term + distance_term * distance_term).sqrt();
            let cell = &mut cells[dose_idx * num_distances + dist_idx];
            if candidate < *cell {
                *cell = candidate;
            }

            let passed = skip_once_passed && *cell <= 1.0;
            if *cell > distance_term && !passed {
                searching = true;
                active_columns[dist_idx] = true;
            }
        }
    }
    searching
}
