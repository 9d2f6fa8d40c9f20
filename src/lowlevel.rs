//! Low-level building blocks for custom gamma pipelines.
//!
//! These expose the shell generator and the evaluation interpolator used by
//! the search loop. Most users should prefer `gamma` or `GammaPlan`.

pub use crate::grid::interp::GridInterpolator;
pub use crate::grid::MAX_DIMS;
pub use crate::shell::Shell;
