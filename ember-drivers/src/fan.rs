//! GPIO cooling fan

use embedded_hal::digital::OutputPin;

use ember_core::traits::Fan;

/// Fan switched by a GPIO pin, directly or through a MOSFET
pub struct GpioFan<P> {
    pin: P,
    /// If true, fan ON = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> GpioFan<P> {
    /// Create a fan output, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut fan = Self {
            pin,
            inverted,
            on: false,
        };
        fan.set_on(false);
        fan
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }
}

impl<P: OutputPin> Fan for GpioFan<P> {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        let _ = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPin;

    #[test]
    fn test_active_high_fan() {
        let mut fan = GpioFan::new_active_high(MockPin::default());
        assert!(!fan.is_on());
        assert!(!fan.pin.high);

        fan.set_on(true);
        assert!(fan.is_on());
        assert!(fan.pin.high);
    }

    #[test]
    fn test_inverted_fan() {
        let mut fan = GpioFan::new(MockPin::default(), true);
        assert!(fan.pin.high);
        fan.set_on(true);
        assert!(!fan.pin.high);
    }
}
