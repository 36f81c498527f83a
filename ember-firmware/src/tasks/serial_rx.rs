//! Host UART receive task
//!
//! Feeds every received byte to the rx ring. Frame detection happens in the
//! ring producer; the engraver task only sees complete frames.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use ember_protocol::RxProducer;

use super::RX_RING_SIZE;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx, mut ring: RxProducer<'static, RX_RING_SIZE>) {
    info!("Serial RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    if ring.push(byte) {
                        trace!("RX: frame complete");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
