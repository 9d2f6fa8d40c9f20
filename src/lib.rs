//! Gamma index comparison of dose distributions on regular grids.
//!
//! For every reference grid point above a lower dose cutoff, the gamma index
//! is the smallest combined dose-and-distance discrepancy to the linearly
//! interpolated evaluation distribution. The search walks outward on shells
//! of increasing radius and retires each point once no larger radius could
//! improve it. 1D, 2D and 3D grids are supported, with several dose and
//! distance thresholds evaluated in one pass.
//!
//! ```no_run
//! use gammaindex::{gamma, DoseGrid, GammaConfig};
//!
//! let axes = vec![vec![0.0, 1.0, 2.0, 3.0, 4.0]];
//! let reference = DoseGrid::new(axes.clone(), vec![0.0, 1.0, 2.0, 1.0, 0.0])?;
//! let evaluation = DoseGrid::new(axes, vec![0.0, 1.0, 2.0, 1.0, 0.0])?;
//! let result = gamma(&reference, &evaluation, 3.0, 1.0, &GammaConfig::default())?;
//! let map = result.into_single().expect("one threshold pair");
//! assert_eq!(map.values()[2], 0.0);
//! # Ok::<(), gammaindex::GammaError>(())
//! ```
//!
//! Parallel batch evaluation is available with the `rayon` feature and
//! structured search diagnostics with the `tracing` feature.

pub mod config;
pub mod grid;
pub mod lowlevel;
pub mod plan;
pub mod result;
mod search;
pub mod shell;
mod trace;
pub mod util;

pub use config::{
    GammaConfig, NormalisationMode, Thresholds, DEFAULT_RAM_BYTES, DEFAULT_RANDOM_SEED,
};
pub use grid::DoseGrid;
pub use plan::{gamma, GammaPlan};
pub use result::{GammaEntry, GammaMap, GammaOutput, GammaSet};
pub use util::{GammaError, GammaResult};
