//! Ember - Laser Engraving Head Firmware
//!
//! Main firmware binary for RP2040-based engraving heads. The host streams
//! pixels over UART; this firmware positions the gantry and fires one laser
//! pulse per pixel.
//!
//! Pin map:
//! - GP0/GP1: UART0 TX/RX to the host
//! - GP2: laser PWM (slice 1, channel A)
//! - GP3: laser driver enable, active low
//! - GP4: exhaust fan
//! - GP5: lid switch, pulled up, high when closed
//! - GP6/GP7: X step/dir, GP8/GP9: Y step/dir
//! - GP10/GP11: X/Y home switches, pulled up, low when triggered

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ember_core::{Engraver, Head, SerialLink};
use ember_drivers::{AxisConfig, Gantry, GpioFan, LidSwitch, PwmLaser, StepDirAxis};
use ember_protocol::{RxChannel, TxChannel};

use crate::clock::EmbassyClock;
use crate::tasks::{RX_RING_SIZE, TX_RING_SIZE};

/// Embedded configuration (compiled into firmware)
/// Edit engraver.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../engraver.toml");

mod channels;
mod clock;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Byte rings between the UART tasks and the engraver task
static RX_RING: StaticCell<RxChannel<RX_RING_SIZE>> = StaticCell::new();
static TX_RING: StaticCell<TxChannel<TX_RING_SIZE>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ember firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(EMBEDDED_CONFIG);

    // Laser first, so the beam is forced off as early as possible
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = 1000;
    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, pwm_config);
    let (pwm_a, _) = pwm.split();
    let pwm_a = unwrap!(pwm_a);
    let laser = PwmLaser::new_active_low(pwm_a, Output::new(p.PIN_3, Level::High));
    let fan = GpioFan::new_active_high(Output::new(p.PIN_4, Level::Low));
    let lid = LidSwitch::closed_high(Input::new(p.PIN_5, Pull::Up));
    info!("Laser, fan and lid initialized");

    let axis_config = AxisConfig::default();
    let x = StepDirAxis::new(
        Output::new(p.PIN_6, Level::Low),
        Output::new(p.PIN_7, Level::Low),
        Input::new(p.PIN_10, Pull::Up),
        axis_config,
    );
    let y = StepDirAxis::new(
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_9, Level::Low),
        Input::new(p.PIN_11, Pull::Up),
        axis_config,
    );
    let motion = Gantry::new(x, y, Delay);
    info!("Gantry initialized");

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.link.baudrate;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (uart_tx, uart_rx) = uart.split();

    let (rx_producer, rx_consumer) = RX_RING.init(RxChannel::new()).split();
    let (tx_producer, tx_consumer) = TX_RING.init(TxChannel::new()).split(Some(channels::arm_tx));
    info!("UART initialized at {} baud", config.link.baudrate);

    let head = Head {
        laser,
        fan,
        motion,
        lid,
    };
    let engraver = Engraver::new(
        SerialLink::new(rx_consumer, tx_producer),
        head,
        EmbassyClock,
        config,
    );

    spawner.spawn(tasks::serial_rx_task(uart_rx, rx_producer)).unwrap();
    spawner.spawn(tasks::serial_tx_task(uart_tx, tx_consumer)).unwrap();
    spawner.spawn(tasks::engraver_task(engraver)).unwrap();

    info!("All tasks spawned");
}
