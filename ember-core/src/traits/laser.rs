//! Laser output and cooling fan traits

/// Trait for the laser power stage
///
/// The driver has two independent controls: an enable line that arms the
/// power stage, and a PWM output that sets the beam power. The beam only
/// fires while both are active.
pub trait LaserDriver {
    /// Arm the power stage
    fn enable(&mut self);

    /// Disarm the power stage
    fn disable(&mut self);

    /// Drive the PWM output
    ///
    /// `duty_permille` is clamped to 0..=1000.
    fn turn_on(&mut self, duty_permille: u16);

    /// Force the PWM output off
    fn turn_off(&mut self);

    /// Check if the power stage is armed
    fn is_enabled(&self) -> bool;
}

/// Trait for the cooling fan
pub trait Fan {
    /// Turn the fan on or off
    fn set_on(&mut self, on: bool);

    /// Check if the fan is currently on
    fn is_on(&self) -> bool;
}
