//! Embassy tasks

mod engraver;
mod serial_rx;
mod serial_tx;

pub use engraver::{engraver_task, FirmwareEngraver};
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;

/// Inbound byte ring capacity
pub const RX_RING_SIZE: usize = 128;

/// Outbound byte ring capacity
pub const TX_RING_SIZE: usize = 128;
