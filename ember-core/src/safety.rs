//! Halt action, pixel timeout and lid interlock
//!
//! Every cancellation path ends in [`Engraver::halt`], which is idempotent:
//! the laser is forced off and the session returns to an idle state that
//! the host can re-initialize.

use crate::engraver::Engraver;
use crate::traits::{Clock, Fan, LaserDriver, LidSensor, Motion, PacketLink};

/// Why the laser was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HaltReason {
    /// Gantry reported a fault
    MotorFault,
    /// Host never acknowledged the ready-for-pixel request
    AckTimeout,
    /// No Burn arrived within the pixel timeout
    PixelTimeout,
}

impl<K, L, F, M, S, C> Engraver<K, L, F, M, S, C>
where
    K: PacketLink,
    L: LaserDriver,
    F: Fan,
    M: Motion,
    S: LidSensor,
    C: Clock,
{
    /// Stop burning: PWM off, laser and fan disabled, picture abandoned
    pub fn halt(&mut self, reason: HaltReason) {
        self.laser_off();
        if self.state.halted(reason) {
            error!("halt: {}", reason);
        }
    }

    /// Fire the halt action if the outstanding pixel request is overdue
    ///
    /// Returns true if it fired.
    pub fn check_pixel_timeout(&mut self) -> bool {
        let now = self.clock.now_ms();
        if !self.state.pixel_timed_out(now, self.config.safety.pixel_timeout_ms) {
            return false;
        }
        warn!("no burn within {} ms", self.config.safety.pixel_timeout_ms);
        self.halt(HaltReason::PixelTimeout);
        true
    }

    /// Block until the lid reads closed
    ///
    /// Waits on the operator with no timeout. Returns true if the lid was
    /// seen open.
    pub(crate) async fn wait_for_lid_closed(&mut self) -> bool {
        let mut was_open = false;
        while !self.head.lid.is_closed() {
            if !was_open {
                info!("waiting for lid to close");
            }
            was_open = true;
            self.clock.sleep_ms(self.config.safety.lid_poll_ms).await;
        }
        was_open
    }

    /// Block until the lid reads open, no timeout
    pub(crate) async fn wait_for_lid_open(&mut self) {
        while self.head.lid.is_closed() {
            self.clock.sleep_ms(self.config.safety.lid_poll_ms).await;
        }
    }

    /// Home the gantry, halting on failure
    pub(crate) async fn home(&mut self) {
        if let Err(fault) = self.head.motion.home().await {
            error!("homing failed: {}", fault);
            self.halt(HaltReason::MotorFault);
        }
    }
}
