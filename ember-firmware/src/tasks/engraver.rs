//! Engraver task

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pwm::PwmOutput;
use embassy_time::Delay;

use ember_core::{Engraver, SerialLink};
use ember_drivers::{Gantry, GpioFan, LidSwitch, PwmLaser, StepDirAxis};

use super::{RX_RING_SIZE, TX_RING_SIZE};
use crate::clock::EmbassyClock;

type Axis = StepDirAxis<Output<'static>, Output<'static>, Input<'static>>;

pub type FirmwareEngraver = Engraver<
    SerialLink<'static, RX_RING_SIZE, TX_RING_SIZE>,
    PwmLaser<PwmOutput<'static>, Output<'static>>,
    GpioFan<Output<'static>>,
    Gantry<Axis, Axis, Delay>,
    LidSwitch<Input<'static>>,
    EmbassyClock,
>;

/// Runs the session: power-on reset, then the main loop forever
#[embassy_executor::task]
pub async fn engraver_task(mut engraver: FirmwareEngraver) {
    info!("Engraver task started");
    engraver.run().await
}
