//! [`PacketLink`] over the split byte rings

use ember_protocol::{RxConsumer, TransportError, TxProducer};

use crate::traits::{LinkError, PacketLink};

/// Main-loop end of the serial transport
pub struct SerialLink<'a, const RX: usize, const TX: usize> {
    rx: RxConsumer<'a, RX>,
    tx: TxProducer<'a, TX>,
}

impl<'a, const RX: usize, const TX: usize> SerialLink<'a, RX, TX> {
    pub fn new(rx: RxConsumer<'a, RX>, tx: TxProducer<'a, TX>) -> Self {
        Self { rx, tx }
    }
}

impl<const RX: usize, const TX: usize> PacketLink for SerialLink<'_, RX, TX> {
    fn frame_ready(&self) -> bool {
        self.rx.frame_ready()
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> usize {
        let dropped = self.rx.take_dropped();
        if dropped > 0 {
            warn!("rx overflow, {} byte(s) dropped", dropped);
        }
        self.rx.read_frame(buf)
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.tx.enqueue(frame).map_err(|e| match e {
            TransportError::TxFull { .. } => LinkError::TxFull,
        })
    }
}
