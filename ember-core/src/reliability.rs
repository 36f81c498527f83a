//! Request/acknowledge exchanges
//!
//! The device sends one command at a time and waits for the host's Ack,
//! retransmitting when the ack window closes. While waiting, the receive
//! path keeps running, so host commands arriving in the meantime are still
//! dispatched.

use ember_protocol::{CommandId, Packet};

use crate::engraver::Engraver;
use crate::safety::HaltReason;
use crate::traits::{Clock, Fan, LaserDriver, LidSensor, Motion, PacketLink};

/// How many transmissions a request may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttemptBudget {
    Bounded(u8),
    Unbounded,
}

impl AttemptBudget {
    fn allows(self, attempts: u32) -> bool {
        match self {
            AttemptBudget::Bounded(max) => attempts < u32::from(max),
            AttemptBudget::Unbounded => true,
        }
    }
}

/// Result of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Host acknowledged the command
    Acked,
    /// Attempt budget used up without an Ack
    Exhausted,
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
    /// Send `packet` until the host acknowledges it or the budget runs out
    ///
    /// Each transmission is one attempt. A Nak for the same command closes
    /// the current ack window early.
    pub async fn request_response(&mut self, packet: &Packet, budget: AttemptBudget) -> Outcome {
        let Some(command) = packet.command else {
            return Outcome::Exhausted;
        };

        let mut attempts: u32 = 0;
        while budget.allows(attempts) {
            attempts = attempts.saturating_add(1);
            self.transmit(packet);

            let sent_at = self.clock.now_ms();
            while self.clock.now_ms().wrapping_sub(sent_at) < self.config.link.ack_timeout_ms {
                match self.service_link().await {
                    Some(reply) if reply.acknowledges(command) => {
                        trace!("{} acked after {} attempt(s)", command, attempts);
                        return Outcome::Acked;
                    }
                    Some(reply) if reply.rejects(command) => {
                        debug!("{} rejected by host", command);
                        break;
                    }
                    Some(_) => {}
                    None => self.clock.sleep_ms(self.config.link.poll_interval_ms).await,
                }
            }
        }

        warn!("{} not acked after {} attempt(s)", command, attempts);
        Outcome::Exhausted
    }

    /// Tell the host the device is ready for the next pixel
    ///
    /// Bounded; on exhaustion the halt action fires. On success the pixel
    /// timeout starts running.
    pub async fn request_next_pixel(&mut self) -> Outcome {
        let budget = AttemptBudget::Bounded(self.config.link.pixel_attempts);
        let outcome = self
            .request_response(&Packet::empty(CommandId::PixelReady), budget)
            .await;

        match outcome {
            Outcome::Acked => {
                if self.state.picture_in_progress() {
                    self.state.pixel_requested(self.clock.now_ms());
                }
            }
            Outcome::Exhausted => self.halt(HaltReason::AckTimeout),
        }
        outcome
    }

    /// Broadcast that the device has (re)initialized
    ///
    /// Unbounded: the device is useless until the host answers.
    pub async fn announce_initialized(&mut self) {
        self.request_response(&Packet::empty(CommandId::Init), AttemptBudget::Unbounded)
            .await;
        self.state.announced();
        info!("host link initialized");
    }

    /// Tell the host burning stopped because of a fault
    ///
    /// Unbounded, like the initialized broadcast.
    pub async fn broadcast_emergency_stop(&mut self) {
        self.request_response(&Packet::empty(CommandId::Emergency), AttemptBudget::Unbounded)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use embassy_futures::block_on;

    #[test]
    fn test_budget() {
        assert!(AttemptBudget::Bounded(2).allows(1));
        assert!(!AttemptBudget::Bounded(2).allows(2));
        assert!(!AttemptBudget::Bounded(0).allows(0));
        assert!(AttemptBudget::Unbounded.allows(u32::MAX));
    }

    #[test]
    fn test_acked_first_try() {
        let sim = Sim::new();
        sim.auto_ack(CommandId::PixelReady, 0);
        let mut engraver = rig(&sim);

        let outcome = block_on(
            engraver.request_response(&Packet::empty(CommandId::PixelReady), AttemptBudget::Bounded(3)),
        );
        assert_eq!(outcome, Outcome::Acked);
        assert_eq!(sim.sent().len(), 1);
    }

    #[test]
    fn test_retries_after_lost_acks() {
        let sim = Sim::new();
        sim.auto_ack(CommandId::PixelReady, 2);
        let mut engraver = rig(&sim);
        let window = engraver.config().link.ack_timeout_ms;

        let outcome = block_on(
            engraver.request_response(&Packet::empty(CommandId::PixelReady), AttemptBudget::Bounded(3)),
        );
        assert_eq!(outcome, Outcome::Acked);
        assert_eq!(sim.sent(), vec![Packet::empty(CommandId::PixelReady); 3]);
        assert_eq!(sim.now(), 2 * window);
    }

    #[test]
    fn test_exhausted_after_budget() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);

        let outcome = block_on(
            engraver.request_response(&Packet::empty(CommandId::PixelReady), AttemptBudget::Bounded(4)),
        );
        assert_eq!(outcome, Outcome::Exhausted);
        assert_eq!(sim.sent().len(), 4);
    }

    #[test]
    fn test_nak_retransmits_early() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        sim.host_sends(Packet::nak(Some(CommandId::PixelReady)));
        sim.host_sends_at(5, Packet::ack(CommandId::PixelReady));

        let outcome = block_on(
            engraver.request_response(&Packet::empty(CommandId::PixelReady), AttemptBudget::Bounded(2)),
        );
        assert_eq!(outcome, Outcome::Acked);
        assert_eq!(sim.sent().len(), 2);
        assert!(sim.now() < engraver.config().link.ack_timeout_ms);
    }

    #[test]
    fn test_unrelated_ack_ignored() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        sim.host_sends(Packet::ack(CommandId::Init));

        let outcome = block_on(
            engraver.request_response(&Packet::empty(CommandId::PixelReady), AttemptBudget::Bounded(1)),
        );
        assert_eq!(outcome, Outcome::Exhausted);
    }

    #[test]
    fn test_commands_dispatched_while_waiting() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        sim.host_sends(Packet::empty(CommandId::End));
        sim.host_sends_at(3, Packet::ack(CommandId::Emergency));

        block_on(engraver.broadcast_emergency_stop());
        assert_eq!(
            sim.sent(),
            vec![Packet::empty(CommandId::Emergency), Packet::ack(CommandId::End)]
        );
    }

    #[test]
    fn test_pixel_request_exhaustion_halts() {
        let sim = Sim::new();
        let mut engraver = rig(&sim);
        start_picture(&sim, &mut engraver);

        let outcome = block_on(engraver.request_next_pixel());
        assert_eq!(outcome, Outcome::Exhausted);
        assert_eq!(sim.sent().iter().filter(|p| **p == Packet::empty(CommandId::PixelReady)).count(), 5);
        assert!(!engraver.state().picture_in_progress());
        assert_eq!(engraver.state().last_halt(), Some(HaltReason::AckTimeout));
    }

    #[test]
    fn test_pixel_request_ack_starts_timeout() {
        let sim = Sim::new();
        sim.auto_ack(CommandId::PixelReady, 0);
        let mut engraver = rig(&sim);
        start_picture(&sim, &mut engraver);
        sim.set_now(1234);

        assert_eq!(block_on(engraver.request_next_pixel()), Outcome::Acked);
        assert_eq!(engraver.state().pixel_requested_ms(), Some(1234));
    }

    #[test]
    fn test_announce_waits_for_ack() {
        let sim = Sim::new();
        sim.auto_ack(CommandId::Init, 3);
        let mut engraver = rig(&sim);

        block_on(engraver.announce_initialized());
        assert_eq!(sim.sent(), vec![Packet::empty(CommandId::Init); 4]);
        assert_eq!(engraver.state().init(), crate::session::InitState::Initialized);
    }
}
