//! The engraving head main loop
//!
//! [`Engraver`] owns the link, the hardware collaborators, the clock and the
//! [`SessionState`]. Its behaviour is split over several modules:
//!
//! - this module: power-on, the cooperative main loop and the receive path
//! - [`session`](crate::session): command dispatch
//! - [`reliability`](crate::reliability): send-and-wait-for-Ack exchanges
//! - [`burn`](crate::burn): executing an accepted Burn
//! - [`safety`](crate::safety): the halt action, pixel timeout and lid waits

use ember_protocol::{Codec, Packet, MAX_FRAME_LEN};

use crate::config::EngraverConfig;
use crate::session::{InitState, SessionState};
use crate::traits::{Clock, Fan, LaserDriver, LidSensor, Motion, PacketLink};

/// Hardware collaborators of the engraving head
pub struct Head<L, F, M, S> {
    pub laser: L,
    pub fan: F,
    pub motion: M,
    pub lid: S,
}

/// Session controller for one engraving head
pub struct Engraver<K, L, F, M, S, C> {
    pub(crate) link: K,
    pub(crate) head: Head<L, F, M, S>,
    pub(crate) clock: C,
    pub(crate) codec: Codec,
    pub(crate) config: EngraverConfig,
    pub(crate) state: SessionState,
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
    /// Create an engraver; nothing touches the hardware until [`power_on`](Self::power_on)
    pub fn new(link: K, head: Head<L, F, M, S>, clock: C, config: EngraverConfig) -> Self {
        Self {
            link,
            head,
            clock,
            codec: Codec::device(),
            config,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &EngraverConfig {
        &self.config
    }

    pub fn head(&self) -> &Head<L, F, M, S> {
        &self.head
    }

    /// Run forever: power-on sequence, then the main loop
    pub async fn run(&mut self) -> ! {
        self.power_on().await;
        loop {
            self.step().await;
        }
    }

    /// Force the laser off, home the gantry and owe the host an Init
    pub async fn power_on(&mut self) {
        info!("power-on reset");
        self.laser_off();
        self.home().await;
        self.state.reset_link();
    }

    /// One pass of the main loop
    pub async fn step(&mut self) {
        if self.state.init() == InitState::JustInitialized {
            self.announce_initialized().await;
        }

        let serviced = self.service_link().await.is_some();

        if self.state.burn_ready() {
            self.execute_burn().await;
        } else {
            self.check_pixel_timeout();
        }

        if !serviced {
            self.clock.sleep_ms(self.config.link.poll_interval_ms).await;
        }
    }

    /// Receive path: read one frame, decode it and act on it
    ///
    /// New commands are dispatched here. Malformed frames are answered
    /// with a Nak and dropped. Returns the decoded packet so that callers
    /// waiting on a reply can inspect it.
    pub async fn service_link(&mut self) -> Option<Packet> {
        if !self.link.frame_ready() {
            return None;
        }

        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = self.link.read_frame(&mut buf);
        if len == 0 {
            return None;
        }
        self.state.record_rx(self.clock.now_ms());

        match self.codec.decode(&buf[..len]) {
            Ok(packet) => {
                if !packet.ack.is_reply() {
                    self.dispatch(&packet).await;
                }
                Some(packet)
            }
            Err(e) => {
                warn!("rejected frame: {}", e);
                self.reply(Packet::nak(e.command()));
                None
            }
        }
    }

    /// Encode and queue one packet
    ///
    /// Returns false if the packet could not be queued; callers that need
    /// delivery go through the reliability layer, which retries.
    pub(crate) fn transmit(&mut self, packet: &Packet) -> bool {
        let frame = match self.codec.encode_to_vec(packet) {
            Ok(frame) => frame,
            Err(e) => {
                error!("encode failed: {}", e);
                return false;
            }
        };
        match self.link.send(&frame) {
            Ok(()) => true,
            Err(e) => {
                warn!("send failed: {}", e);
                false
            }
        }
    }

    /// Send a reply; replies are never retried
    pub(crate) fn reply(&mut self, packet: Packet) {
        self.transmit(&packet);
    }

    /// Arm the laser; the fan follows
    pub(crate) fn enable_laser(&mut self) {
        self.head.laser.enable();
        self.head.fan.set_on(true);
    }

    /// Disarm the laser; the fan follows
    pub(crate) fn disable_laser(&mut self) {
        self.head.laser.disable();
        self.head.fan.set_on(false);
    }

    /// PWM off and power stage disarmed
    pub(crate) fn laser_off(&mut self) {
        self.head.laser.turn_off();
        self.disable_laser();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use embassy_futures::block_on;
    use ember_protocol::CommandId;

    #[test]
    fn test_power_on_forces_laser_off_and_homes() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        block_on(engraver.power_on());

        assert_eq!(
            sim.events(),
            vec![Event::LaserOff, Event::LaserDisable, Event::Fan(false), Event::Home]
        );
        assert_eq!(engraver.state().init(), InitState::JustInitialized);
    }

    #[test]
    fn test_first_step_announces_initialized() {
        let sim = Sim::new();
        sim.auto_ack(CommandId::Init, 0);
        let mut engraver = rig(&sim);
        block_on(engraver.power_on());
        block_on(engraver.step());

        assert_eq!(sim.sent(), vec![Packet::empty(CommandId::Init)]);
        assert_eq!(engraver.state().init(), InitState::Initialized);
    }

    #[test]
    fn test_host_init_triggers_new_announcement() {
        let sim = Sim::new();
        sim.auto_ack(CommandId::Init, 0);
        let mut engraver = rig(&sim);
        block_on(engraver.power_on());
        block_on(engraver.step());
        sim.clear_events();

        sim.host_sends(Packet::empty(CommandId::Init));
        block_on(engraver.step());
        assert_eq!(engraver.state().init(), InitState::JustInitialized);
        assert_eq!(sim.sent(), vec![Packet::ack(CommandId::Init)]);

        block_on(engraver.step());
        assert_eq!(
            sim.sent(),
            vec![Packet::ack(CommandId::Init), Packet::empty(CommandId::Init)]
        );
        assert_eq!(engraver.state().init(), InitState::Initialized);
    }

    #[test]
    fn test_idle_step_sleeps_one_poll() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        block_on(engraver.step());
        assert_eq!(sim.now(), engraver.config().link.poll_interval_ms);
        assert!(sim.sent().is_empty());
    }

    #[test]
    fn test_frames_record_last_rx() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        sim.set_now(42);
        sim.host_sends(Packet::empty(CommandId::End));
        block_on(engraver.service_link());
        assert_eq!(engraver.state().last_rx_ms(), Some(42));
    }

    #[test]
    fn test_malformed_frame_gets_nak() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);

        // Corrupt checksum on a Burn
        let mut frame = host_frame(&Packet::command(CommandId::Burn, &[0x20, 0x21, 0x22, 0x23]));
        frame[2] ^= 0x40;
        sim.host_sends_raw(frame);
        assert_eq!(block_on(engraver.service_link()), None);
        assert_eq!(sim.sent(), vec![Packet::nak(Some(CommandId::Burn))]);

        // Unknown command byte
        sim.clear_events();
        sim.host_sends_raw(vec![0x02, 0x7A, 0x03]);
        assert_eq!(block_on(engraver.service_link()), None);
        assert_eq!(sim.sent(), vec![Packet::nak(None)]);
    }
}
