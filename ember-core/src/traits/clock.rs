//! Time source

/// Monotonic millisecond clock with cooperative delays
///
/// `now_ms` wraps at `u32::MAX`; compare instants with `wrapping_sub`.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Milliseconds since boot, wrapping
    fn now_ms(&self) -> u32;

    /// Suspend the caller for `ms` milliseconds
    async fn sleep_ms(&self, ms: u32);
}
