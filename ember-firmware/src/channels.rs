//! Inter-task signals
//!
//! The engraver task writes outbound frames into the tx ring; the serial tx
//! task sleeps until the ring is armed.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Raised whenever bytes are queued on the tx ring
pub static TX_KICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Transmitter hook handed to the tx ring
pub fn arm_tx() {
    TX_KICK.signal(());
}
