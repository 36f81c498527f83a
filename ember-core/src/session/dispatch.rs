//! Command dispatch
//!
//! | Session            | Command | Action                                             |
//! |--------------------|---------|----------------------------------------------------|
//! | any                | Init    | laser off, home, Ack, owe the initialized broadcast |
//! | any                | Start   | wait for lid (and a door cycle), Ack, home         |
//! | picture running    | Burn    | Ack, arm laser on first pixel, queue the burn      |
//! | any                | End     | Ack, laser off, home, reset the session            |
//! | otherwise          | *       | Nak                                                |

use ember_protocol::{BurnCommand, CommandId, Packet};

use crate::engraver::Engraver;
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
    /// Act on a new command from the host
    ///
    /// Every command gets exactly one Ack or Nak.
    pub(crate) async fn dispatch(&mut self, packet: &Packet) {
        let Some(command) = packet.command else {
            return;
        };
        debug!("dispatch {}", command);

        match command {
            CommandId::Init => self.on_init().await,
            CommandId::Start => self.on_start().await,
            CommandId::Burn => self.on_burn(&packet.payload).await,
            CommandId::End => self.on_end().await,
            CommandId::PixelReady | CommandId::Emergency => {
                self.reply(Packet::nak(Some(command)));
            }
        }
    }

    async fn on_init(&mut self) {
        info!("host init");
        // Always reset, even mid-picture
        self.laser_off();
        self.home().await;
        self.reply(Packet::ack(CommandId::Init));
        self.state.reset_link();
    }

    async fn on_start(&mut self) {
        // Both waits block on the operator, no timeout.
        // A lid found open here and then closed counts as the door cycle.
        if self.wait_for_lid_closed().await {
            self.state.door_cycle_observed();
        }
        if !self.state.door_cycled() {
            info!("waiting for lid to be opened and closed");
            self.wait_for_lid_open().await;
            self.wait_for_lid_closed().await;
            self.state.door_cycle_observed();
        }

        self.reply(Packet::ack(CommandId::Start));
        self.state.begin_picture();
        info!("picture started");
        self.home().await;
    }

    async fn on_burn(&mut self, payload: &[u8]) {
        if !self.state.picture_in_progress() {
            warn!("burn outside a picture");
            self.reply(Packet::nak(Some(CommandId::Burn)));
            return;
        }
        let Some(burn) = BurnCommand::from_payload(payload) else {
            self.reply(Packet::nak(Some(CommandId::Burn)));
            return;
        };

        self.reply(Packet::ack(CommandId::Burn));
        self.state.accept_burn(burn);

        if self.state.first_pixel_pending() {
            self.enable_laser();
            self.clock.sleep_ms(self.config.safety.laser_settle_ms).await;
            self.state.first_pixel_armed();
        }
    }

    async fn on_end(&mut self) {
        self.reply(Packet::ack(CommandId::End));
        self.laser_off();
        self.state.end_picture();
        info!("picture ended");
        self.home().await;
    }
}
