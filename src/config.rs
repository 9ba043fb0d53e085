/// Configuration for a [`Buffer`](crate::Buffer).
///
/// The teacher crate's `Config` controls ring capacity, producer count and
/// metrics collection. A bip-buffer has no dynamic capacity (capacity is
/// the length of the caller-supplied backing slice, per spec.md §6) and
/// exactly one producer and one consumer always, so the only knob that
/// survives is whether to pay for metrics counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub enable_metrics: bool,
}

impl Config {
    pub const fn new(enable_metrics: bool) -> Self {
        Self { enable_metrics }
    }

    /// A configuration with metrics collection enabled.
    pub const fn with_metrics() -> Self {
        Self {
            enable_metrics: true,
        }
    }
}
