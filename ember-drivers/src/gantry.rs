//! Step/direction gantry
//!
//! Two independent axes driven by step/dir stepper drivers, each with a
//! home switch at position zero. Moves run at a constant step rate, X then
//! Y; there is no acceleration or interpolation.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use ember_core::traits::{Motion, MotionFault};

/// Per-axis settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    /// Motor steps per pixel
    pub steps_per_pixel: u32,
    /// Largest reachable pixel position
    pub max_pixel: u16,
    /// Step pulse high time
    pub step_pulse_us: u32,
    /// Low time between step pulses
    pub step_interval_us: u32,
    /// Give up homing after this many steps
    pub max_homing_steps: u32,
    /// Invert the direction pin (true = LOW moves away from home)
    pub invert_dir: bool,
    /// Home switch reads LOW when triggered (pull-up wiring)
    pub home_active_low: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_pixel: 4,
            max_pixel: 0x1FFF,
            step_pulse_us: 2,
            step_interval_us: 200,
            max_homing_steps: 4 * 0x2000,
            invert_dir: false,
            home_active_low: true,
        }
    }
}

/// One stepper axis
pub struct StepDirAxis<S, D, H> {
    step: S,
    dir: D,
    home: H,
    config: AxisConfig,
    /// Position in steps, `None` until homed
    position: Option<u32>,
}

impl<S: OutputPin, D: OutputPin, H: InputPin> StepDirAxis<S, D, H> {
    pub fn new(step: S, dir: D, home: H, config: AxisConfig) -> Self {
        let mut axis = Self {
            step,
            dir,
            home,
            config,
            position: None,
        };
        let _ = axis.step.set_low();
        axis
    }

    /// Position in pixels, `None` until homed
    pub fn position(&self) -> Option<u16> {
        self.position
            .map(|steps| (steps / self.config.steps_per_pixel.max(1)) as u16)
    }

    fn at_home(&mut self) -> bool {
        match self.home.is_high() {
            Ok(high) => high != self.config.home_active_low,
            Err(_) => false,
        }
    }

    /// Set direction; `away` moves away from the home switch
    fn set_direction(&mut self, away: bool) {
        let _ = if away != self.config.invert_dir {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        };
    }

    async fn pulse<T: DelayNs>(&mut self, delay: &mut T) {
        let _ = self.step.set_high();
        delay.delay_us(self.config.step_pulse_us).await;
        let _ = self.step.set_low();
        delay.delay_us(self.config.step_interval_us).await;
    }

    /// Step toward the switch until it triggers
    pub async fn home<T: DelayNs>(&mut self, delay: &mut T) -> Result<(), MotionFault> {
        self.position = None;
        self.set_direction(false);

        for _ in 0..self.config.max_homing_steps {
            if self.at_home() {
                self.position = Some(0);
                return Ok(());
            }
            self.pulse(delay).await;
        }

        if self.at_home() {
            self.position = Some(0);
            return Ok(());
        }
        Err(MotionFault::HomingFailed)
    }

    /// Move to a pixel position
    pub async fn move_to<T: DelayNs>(&mut self, pixel: u16, delay: &mut T) -> Result<(), MotionFault> {
        if pixel > self.config.max_pixel {
            return Err(MotionFault::OutOfRange);
        }
        let current = self.position.ok_or(MotionFault::NotHomed)?;
        let target = u32::from(pixel) * self.config.steps_per_pixel;

        self.set_direction(target > current);
        for _ in 0..target.abs_diff(current) {
            self.pulse(delay).await;
        }
        self.position = Some(target);
        Ok(())
    }
}

/// Two-axis gantry sharing one delay source
pub struct Gantry<X, Y, T> {
    pub x: X,
    pub y: Y,
    delay: T,
}

impl<X, Y, T> Gantry<X, Y, T> {
    pub fn new(x: X, y: Y, delay: T) -> Self {
        Self { x, y, delay }
    }
}

impl<XS, XD, XH, YS, YD, YH, T> Motion for Gantry<StepDirAxis<XS, XD, XH>, StepDirAxis<YS, YD, YH>, T>
where
    XS: OutputPin,
    XD: OutputPin,
    XH: InputPin,
    YS: OutputPin,
    YD: OutputPin,
    YH: InputPin,
    T: DelayNs,
{
    async fn move_to(&mut self, x: u16, y: u16) -> Result<(), MotionFault> {
        self.x.move_to(x, &mut self.delay).await?;
        self.y.move_to(y, &mut self.delay).await
    }

    async fn home(&mut self) -> Result<(), MotionFault> {
        self.x.home(&mut self.delay).await?;
        self.y.home(&mut self.delay).await
    }
}
