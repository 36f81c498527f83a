//! Host UART transmit task
//!
//! Sleeps until the tx ring is armed, then drains it to the UART.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use ember_protocol::TxConsumer;

use super::TX_RING_SIZE;
use crate::channels::TX_KICK;

const TX_CHUNK: usize = 16;

#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx, mut ring: TxConsumer<'static, TX_RING_SIZE>) {
    info!("Serial TX task started");

    let mut buf = [0u8; TX_CHUNK];

    loop {
        TX_KICK.wait().await;

        loop {
            let n = ring.drain_into(&mut buf);
            if n == 0 {
                break;
            }
            if let Err(e) = tx.write_all(&buf[..n]).await {
                warn!("UART write error: {:?}", e);
            }
        }
    }
}
