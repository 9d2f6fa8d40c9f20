//! Feature-gated diagnostics for the gamma search.
//!
//! With the `tracing` feature the search opens one info span per run and
//! reports the plan and the final state as info events. The per-radius
//! progress of the distance loop goes out at debug level, since a fine
//! distance step produces hundreds of those. Without the feature every macro
//! compiles to nothing but still evaluates its field values.

/// Opens the info span that wraps one gamma search.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits a once-per-run info event, such as the plan summary.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

/// Emits a debug event for one radius of the distance loop.
#[cfg(feature = "tracing")]
macro_rules! trace_step {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_step {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_step;

/// Stand-in for `tracing::Span` so call sites can write
/// `let _span = trace_span!(..).entered();` in both builds.
#[cfg(not(feature = "tracing"))]
pub(crate) struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub(crate) fn entered(self) -> Self {
        self
    }
}
