//! Reference-shaped gamma maps.
//!
//! The search produces one flat gamma value per reference point and
//! threshold pair. Assembly slices that state per pair, turns `+inf` (not
//! evaluated, or no match within the search radius) into `NaN`, and clamps
//! finite values to `max_gamma`.

use crate::plan::GammaPlan;

/// Gamma values laid out like the reference dose grid (row-major).
#[derive(Clone, Debug, PartialEq)]
pub struct GammaMap {
    shape: Vec<usize>,
    values: Vec<f64>,
}

impl GammaMap {
    /// Returns the grid shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the flat row-major gamma values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consumes the map and returns the flat values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Returns the gamma value at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &n) in index.iter().zip(&self.shape) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        self.values.get(flat).copied()
    }

    /// Number of evaluated (non-NaN) points.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Percentage of evaluated points with gamma `<= 1`.
    ///
    /// Returns `None` when no point was evaluated.
    pub fn pass_rate(&self) -> Option<f64> {
        let valid = self.valid_count();
        if valid == 0 {
            return None;
        }
        let passed = self.values.iter().filter(|&&v| v <= 1.0).count();
        Some(100.0 * passed as f64 / valid as f64)
    }
}

/// Gamma map for one `(dose_percent, distance_mm)` threshold pair.
#[derive(Clone, Debug, PartialEq)]
pub struct GammaEntry {
    /// Dose difference threshold in percent.
    pub dose_percent: f64,
    /// Distance-to-agreement threshold in axis units.
    pub distance_mm: f64,
    /// Gamma values for this pair.
    pub map: GammaMap,
}

impl GammaEntry {
    /// Returns true if this entry was computed for exactly `(dose_percent, distance_mm)`.
    pub fn matches(&self, dose_percent: f64, distance_mm: f64) -> bool {
        self.dose_percent == dose_percent && self.distance_mm == distance_mm
    }
}

/// Gamma maps for every threshold pair, dose-major then distance.
#[derive(Clone, Debug, PartialEq)]
pub struct GammaSet {
    entries: Vec<GammaEntry>,
}

impl GammaSet {
    /// Returns the map for a threshold pair as supplied by the caller.
    pub fn get(&self, dose_percent: f64, distance_mm: f64) -> Option<&GammaMap> {
        self.entries
            .iter()
            .find(|e| e.matches(dose_percent, distance_mm))
            .map(|e| &e.map)
    }

    /// Returns all entries.
    pub fn entries(&self) -> &[GammaEntry] {
        &self.entries
    }

    /// Returns the number of threshold pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no pairs are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries.
    pub fn iter(&self) -> impl Iterator<Item = &GammaEntry> + '_ {
        self.entries.iter()
    }
}

/// Output of a gamma evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum GammaOutput {
    /// A single threshold pair was requested.
    Single(GammaEntry),
    /// Several threshold pairs were requested.
    Multiple(GammaSet),
}

impl GammaOutput {
    /// Returns the map for a threshold pair, for either variant.
    ///
    /// The pair must equal one the caller passed, including for `Single`.
    pub fn get(&self, dose_percent: f64, distance_mm: f64) -> Option<&GammaMap> {
        match self {
            GammaOutput::Single(entry) if entry.matches(dose_percent, distance_mm) => {
                Some(&entry.map)
            }
            GammaOutput::Single(_) => None,
            GammaOutput::Multiple(set) => set.get(dose_percent, distance_mm),
        }
    }

    /// Returns the single map, if only one pair was requested.
    pub fn into_single(self) -> Option<GammaMap> {
        match self {
            GammaOutput::Single(entry) => Some(entry.map),
            GammaOutput::Multiple(_) => None,
        }
    }

    /// Returns the set of maps, if several pairs were requested.
    pub fn into_multiple(self) -> Option<GammaSet> {
        match self {
            GammaOutput::Single(_) => None,
            GammaOutput::Multiple(set) => Some(set),
        }
    }

    /// Number of threshold pairs.
    pub fn len(&self) -> usize {
        match self {
            GammaOutput::Single(_) => 1,
            GammaOutput::Multiple(set) => set.len(),
        }
    }

    /// Always false; an output holds at least one map.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the output maps from the packed `(N, P, Q)` search state.
pub(crate) fn assemble(plan: &GammaPlan<'_>, current_gamma: &[f64]) -> GammaOutput {
    let doses = plan.dose_percent_thresholds();
    let distances = plan.distance_mm_thresholds();
    let num_cells = doses.len() * distances.len();
    let max_gamma = plan.max_gamma();

    let mut entries = Vec::with_capacity(num_cells);
    for (dose_idx, &dose_percent) in doses.iter().enumerate() {
        for (dist_idx, &distance_mm) in distances.iter().enumerate() {
            let cell = dose_idx * distances.len() + dist_idx;
            let values = current_gamma
                .iter()
                .skip(cell)
                .step_by(num_cells)
                .map(|&g| finalize(g, max_gamma))
                .collect();
            entries.push(GammaEntry {
                dose_percent,
                distance_mm,
                map: GammaMap {
                    shape: plan.reference_shape().to_vec(),
                    values,
                },
            });
        }
    }

    if entries.len() == 1 {
        if let Some(entry) = entries.pop() {
            return GammaOutput::Single(entry);
        }
    }
    GammaOutput::Multiple(GammaSet { entries })
}

fn finalize(gamma: f64, max_gamma: f64) -> f64 {
    if gamma.is_infinite() {
        f64::NAN
    } else {
        gamma.min(max_gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::{finalize, GammaEntry, GammaMap, GammaOutput};

    #[test]
    fn finalize_maps_infinity_to_nan_and_clamps() {
        assert!(finalize(f64::INFINITY, 2.0).is_nan());
        assert_eq!(finalize(3.5, 2.0), 2.0);
        assert_eq!(finalize(0.5, 2.0), 0.5);
        assert_eq!(finalize(0.5, f64::INFINITY), 0.5);
    }

    #[test]
    fn pass_rate_ignores_nan() {
        let map = GammaMap {
            shape: vec![4],
            values: vec![f64::NAN, 0.5, 1.0, 1.5],
        };
        assert_eq!(map.valid_count(), 3);
        let rate = map.pass_rate().unwrap();
        assert!((rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn pass_rate_is_none_without_valid_points() {
        let map = GammaMap {
            shape: vec![2],
            values: vec![f64::NAN, f64::NAN],
        };
        assert!(map.pass_rate().is_none());
    }

    #[test]
    fn get_uses_row_major_index() {
        let map = GammaMap {
            shape: vec![2, 3],
            values: (0..6).map(|v| v as f64).collect(),
        };
        assert_eq!(map.get(&[1, 1]), Some(4.0));
        assert_eq!(map.get(&[2, 0]), None);
    }

    #[test]
    fn single_output_only_answers_its_own_pair() {
        let map = GammaMap {
            shape: vec![1],
            values: vec![0.25],
        };
        let output = GammaOutput::Single(GammaEntry {
            dose_percent: 3.0,
            distance_mm: 1.0,
            map: map.clone(),
        });
        assert_eq!(output.get(3.0, 1.0), Some(&map));
        assert_eq!(output.get(99.0, 99.0), None);
        assert_eq!(output.get(3.0, 2.0), None);
        assert_eq!(output.into_single(), Some(map));
    }
}
