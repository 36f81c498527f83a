//! Burn execution
//!
//! Runs from the main loop once a Burn has been accepted: position the
//! head, confirm the lid, fire one pulse from the selected preset, then ask
//! the host for the next pixel.

use crate::config::IntensityPreset;
use crate::engraver::Engraver;
use crate::safety::HaltReason;
use crate::traits::{Clock, Fan, LaserDriver, LidSensor, Motion, PacketLink};

impl<K, L, F, M, S, C> Engraver<K, L, F, M, S, C>
where
    K: PacketLink,
    L: LaserDriver,
    F: Fan,
    M: Motion,
    S: LidSensor,
    C: Clock,
{
    /// Execute the accepted Burn, if any
    pub async fn execute_burn(&mut self) {
        let Some(burn) = self.state.take_burn() else {
            return;
        };
        trace!("burn x={} y={}", burn.horizontal, burn.vertical);

        if let Err(fault) = self.head.motion.move_to(burn.horizontal, burn.vertical).await {
            error!("move failed: {}", fault);
            self.halt(HaltReason::MotorFault);
            if self.config.safety.notify_host_on_fault {
                self.broadcast_emergency_stop().await;
            }
            return;
        }

        if !self.head.lid.is_closed() {
            warn!("lid opened during picture");
            self.disable_laser();
            self.wait_for_lid_closed().await;
            self.enable_laser();
        }

        self.pulse(self.config.preset(burn.intensity)).await;
        self.request_next_pixel().await;
    }

    /// Fire the laser for one preset
    async fn pulse(&mut self, preset: IntensityPreset) {
        self.head.laser.turn_on(preset.duty_permille);
        self.clock.sleep_ms(preset.duration_ms).await;
        self.head.laser.turn_off();
    }
}
