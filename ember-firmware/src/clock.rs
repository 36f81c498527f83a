//! Embassy time source for the session logic

use embassy_time::{Instant, Timer};
use ember_core::traits::Clock;

/// Millisecond clock backed by the embassy time driver
///
/// `now_ms` truncates to 32 bits and wraps after ~49 days; the session
/// logic compares timestamps with wrapping arithmetic.
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    async fn sleep_ms(&self, ms: u32) {
        Timer::after_millis(u64::from(ms)).await;
    }
}
