//! Canonicalised inputs for a gamma evaluation.
//!
//! Building a `GammaPlan` validates both grids and the configuration once,
//! then freezes everything the distance loop needs: packed reference
//! coordinates, the flat reference dose, the mask of points to evaluate,
//! the evaluation interpolator and all derived scalars.

use crate::config::{GammaConfig, NormalisationMode, Thresholds};
use crate::grid::interp::GridInterpolator;
use crate::grid::DoseGrid;
use crate::result::{assemble, GammaOutput};
use crate::search::run_search;
use crate::trace::trace_event;
use crate::util::{GammaError, GammaResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Frozen inputs for the shell search.
#[derive(Clone, Debug)]
pub struct GammaPlan<'a> {
    evaluation: GridInterpolator<'a>,
    reference_shape: Vec<usize>,
    flat_reference_coords: Vec<f64>,
    flat_reference_dose: Vec<f64>,
    points_to_calc: Vec<bool>,
    dose_percent: Thresholds,
    distance_mm: Thresholds,
    interp_fraction: f64,
    max_gamma: f64,
    mode: NormalisationMode,
    global_normalisation: f64,
    lower_dose_cutoff: f64,
    maximum_test_distance: f64,
    skip_once_passed: bool,
    ram_available: u64,
    parallel: bool,
}

impl<'a> GammaPlan<'a> {
    /// Validates inputs and precomputes the search state.
    pub fn new(
        reference: &DoseGrid,
        evaluation: &'a DoseGrid,
        dose_percent_threshold: impl Into<Thresholds>,
        distance_mm_threshold: impl Into<Thresholds>,
        cfg: &GammaConfig,
    ) -> GammaResult<Self> {
        cfg.validate()?;
        if reference.ndim() != evaluation.ndim() {
            return Err(GammaError::DimensionMismatch {
                reference: reference.ndim(),
                evaluation: evaluation.ndim(),
            });
        }

        let dose_percent = dose_percent_threshold.into();
        dose_percent.validate("dose percent")?;
        let distance_mm = distance_mm_threshold.into();
        distance_mm.validate("distance")?;

        let global_normalisation = match cfg.global_normalisation {
            Some(norm) => norm,
            None => match reference.max_value() {
                max if max > 0.0 => max,
                _ => {
                    return Err(GammaError::InvalidConfig {
                        reason: "reference dose is all zero, so the derived global normalisation \
                                 is 0; pass global_normalisation",
                    });
                }
            },
        };
        let lower_dose_cutoff = cfg.lower_percent_dose_cutoff / 100.0 * global_normalisation;

        let ndim = reference.ndim();
        let n = reference.len();
        let mut flat_reference_coords = vec![0.0f64; n * ndim];
        for (idx, coords) in flat_reference_coords.chunks_exact_mut(ndim).enumerate() {
            reference.point(idx, coords);
        }
        let flat_reference_dose = reference.values().to_vec();

        let interp = GridInterpolator::new(evaluation);
        let mut points_to_calc: Vec<bool> = flat_reference_dose
            .iter()
            .map(|&dose| dose >= lower_dose_cutoff)
            .collect();

        if cfg.mask_evaluation {
            for (calc, coords) in points_to_calc
                .iter_mut()
                .zip(flat_reference_coords.chunks_exact(ndim))
            {
                if *calc {
                    let eval_dose = interp.sample(coords);
                    *calc = eval_dose.is_finite() && eval_dose >= lower_dose_cutoff;
                }
            }
        }

        if let Some(requested) = cfg.random_subset {
            restrict_to_random_subset(&mut points_to_calc, requested, cfg.random_seed)?;
        }

        let reach = farthest_reach(reference, evaluation);
        let maximum_test_distance = if cfg.max_gamma.is_finite() {
            (distance_mm.max() * cfg.max_gamma).min(reach)
        } else {
            reach
        };

        trace_event!(
            "gamma_plan",
            local = cfg.mode == NormalisationMode::Local,
            global_normalisation = global_normalisation,
            lower_dose_cutoff = lower_dose_cutoff,
            points = points_to_calc.iter().filter(|&&c| c).count(),
            maximum_test_distance = maximum_test_distance,
        );

        Ok(Self {
            evaluation: interp,
            reference_shape: reference.shape().to_vec(),
            flat_reference_coords,
            flat_reference_dose,
            points_to_calc,
            dose_percent,
            distance_mm,
            interp_fraction: cfg.interp_fraction,
            max_gamma: cfg.max_gamma,
            mode: cfg.mode,
            global_normalisation,
            lower_dose_cutoff,
            maximum_test_distance,
            skip_once_passed: cfg.skip_once_passed,
            ram_available: cfg.ram_available,
            parallel: cfg.parallel,
        })
    }

    /// Runs the shell search and assembles reference-shaped gamma maps.
    pub fn run(&self) -> GammaResult<GammaOutput> {
        let current_gamma = run_search(self)?;
        Ok(assemble(self, &current_gamma))
    }

    /// Returns the spatial dimensionality.
    pub fn ndim(&self) -> usize {
        self.reference_shape.len()
    }

    /// Returns the reference grid shape.
    pub fn reference_shape(&self) -> &[usize] {
        &self.reference_shape
    }

    /// Returns the number of reference points.
    pub fn num_points(&self) -> usize {
        self.flat_reference_dose.len()
    }

    /// Returns reference coordinates packed as `(N, D)` in ravel order.
    pub fn flat_reference_coords(&self) -> &[f64] {
        &self.flat_reference_coords
    }

    /// Returns the reference dose in ravel order.
    pub fn flat_reference_dose(&self) -> &[f64] {
        &self.flat_reference_dose
    }

    /// Returns the mask of reference points that will be evaluated.
    pub fn points_to_calc(&self) -> &[bool] {
        &self.points_to_calc
    }

    /// Returns the dose percent thresholds.
    pub fn dose_percent_thresholds(&self) -> &[f64] {
        self.dose_percent.values()
    }

    /// Returns the distance thresholds.
    pub fn distance_mm_thresholds(&self) -> &[f64] {
        self.distance_mm.values()
    }

    /// Returns the absolute dose thresholds (percent of the global normalisation).
    pub fn global_dose_thresholds(&self) -> Vec<f64> {
        self.dose_percent
            .values()
            .iter()
            .map(|p| p / 100.0 * self.global_normalisation)
            .collect()
    }

    /// Returns the dose the percent inputs refer to.
    pub fn global_normalisation(&self) -> f64 {
        self.global_normalisation
    }

    /// Returns the absolute lower dose cutoff.
    pub fn lower_dose_cutoff(&self) -> f64 {
        self.lower_dose_cutoff
    }

    /// Returns the search radius beyond which the loop stops.
    ///
    /// This is `max(distance thresholds) * max_gamma`, capped at the largest
    /// distance from the reference grid to the evaluation grid.
    pub fn maximum_test_distance(&self) -> f64 {
        self.maximum_test_distance
    }

    /// Returns the gamma clamp value.
    pub fn max_gamma(&self) -> f64 {
        self.max_gamma
    }

    /// Returns the shell step divisor.
    pub fn interp_fraction(&self) -> f64 {
        self.interp_fraction
    }

    /// Returns the normalisation mode.
    pub fn mode(&self) -> NormalisationMode {
        self.mode
    }

    pub(crate) fn evaluation(&self) -> &GridInterpolator<'a> {
        &self.evaluation
    }

    pub(crate) fn distance_thresholds(&self) -> &Thresholds {
        &self.distance_mm
    }

    /// Returns whether passing threshold pairs stop refining.
    pub fn skip_once_passed(&self) -> bool {
        self.skip_once_passed
    }

    /// Returns the per-batch memory budget in bytes.
    pub fn ram_available(&self) -> u64 {
        self.ram_available
    }

    /// Returns whether batches are evaluated in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

/// Computes gamma of `evaluation` against `reference` in one call.
///
/// Every pairing of the dose percent and distance thresholds is evaluated in
/// a single search. A single pair yields `GammaOutput::Single`.
pub fn gamma(
    reference: &DoseGrid,
    evaluation: &DoseGrid,
    dose_percent_threshold: impl Into<Thresholds>,
    distance_mm_threshold: impl Into<Thresholds>,
    cfg: &GammaConfig,
) -> GammaResult<GammaOutput> {
    GammaPlan::new(
        reference,
        evaluation,
        dose_percent_threshold,
        distance_mm_threshold,
        cfg,
    )?
    .run()
}

/// Keeps `requested` randomly chosen points of the mask, clearing the rest.
fn restrict_to_random_subset(mask: &mut [bool], requested: usize, seed: u64) -> GammaResult<()> {
    let mut eligible: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(idx, &calc)| calc.then_some(idx))
        .collect();
    if requested > eligible.len() {
        return Err(GammaError::RandomSubsetTooLarge {
            requested,
            available: eligible.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    eligible.shuffle(&mut rng);
    mask.fill(false);
    for &idx in &eligible[..requested] {
        mask[idx] = true;
    }
    Ok(())
}

/// Largest distance from any reference point to any evaluation point.
///
/// Beyond this radius every shell sample falls outside the evaluation grid.
fn farthest_reach(reference: &DoseGrid, evaluation: &DoseGrid) -> f64 {
    reference
        .bounds()
        .iter()
        .zip(evaluation.bounds())
        .map(|(&(rmin, rmax), (emin, emax))| {
            let d = (rmax - emin).abs().max((emax - rmin).abs());
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
