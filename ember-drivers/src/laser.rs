//! PWM laser output
//!
//! The power stage has an enable line (active-low on the reference board)
//! and a PWM input setting beam power. Both are forced off on construction.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use ember_core::traits::LaserDriver;

/// Full-scale duty in permille
const FULL_SCALE_PERMILLE: u16 = 1000;

/// PWM laser with an enable line
pub struct PwmLaser<P, E> {
    pwm: P,
    enable: E,
    /// If true, enabled = pin LOW
    active_low: bool,
    enabled: bool,
    duty_permille: u16,
}

impl<P: SetDutyCycle, E: OutputPin> PwmLaser<P, E> {
    /// Create a new laser driver, disarmed and dark
    ///
    /// # Arguments
    /// - `pwm`: PWM channel driving beam power
    /// - `enable`: power stage enable pin
    /// - `active_low`: if true, the stage is armed when the pin is LOW
    pub fn new(pwm: P, enable: E, active_low: bool) -> Self {
        let mut laser = Self {
            pwm,
            enable,
            active_low,
            enabled: false,
            duty_permille: 0,
        };
        laser.turn_off();
        laser.disable();
        laser
    }

    /// Create a laser whose enable pin is active-low
    pub fn new_active_low(pwm: P, enable: E) -> Self {
        Self::new(pwm, enable, true)
    }

    /// Current PWM duty in permille
    pub fn duty_permille(&self) -> u16 {
        self.duty_permille
    }

    fn drive_enable(&mut self, armed: bool) {
        // GPIO errors are infallible on the supported boards
        let _ = if armed != self.active_low {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        };
    }
}

impl<P: SetDutyCycle, E: OutputPin> LaserDriver for PwmLaser<P, E> {
    fn enable(&mut self) {
        self.enabled = true;
        self.drive_enable(true);
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.drive_enable(false);
    }

    fn turn_on(&mut self, duty_permille: u16) {
        let duty = duty_permille.min(FULL_SCALE_PERMILLE);
        self.duty_permille = duty;
        let _ = self.pwm.set_duty_cycle_fraction(duty, FULL_SCALE_PERMILLE);
    }

    fn turn_off(&mut self) {
        self.duty_permille = 0;
        let _ = self.pwm.set_duty_cycle_fully_off();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
