//! Lid interlock switch

use embedded_hal::digital::InputPin;

use ember_core::traits::LidSensor;

/// Lid switch on a GPIO input
///
/// A read error counts as open.
pub struct LidSwitch<P> {
    pin: P,
    /// Pin level that means closed
    closed_high: bool,
}

impl<P: InputPin> LidSwitch<P> {
    pub fn new(pin: P, closed_high: bool) -> Self {
        Self { pin, closed_high }
    }

    /// Switch that pulls the line high when the lid is closed
    pub fn closed_high(pin: P) -> Self {
        Self::new(pin, true)
    }
}

impl<P: InputPin> LidSensor for LidSwitch<P> {
    fn is_closed(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high == self.closed_high,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockInput;

    #[test]
    fn test_closed_high() {
        let mut lid = LidSwitch::closed_high(MockInput { high_reads: 1 });
        assert!(lid.is_closed());
        assert!(!lid.is_closed());
    }

    #[test]
    fn test_closed_low() {
        let mut lid = LidSwitch::new(MockInput { high_reads: 1 }, false);
        assert!(!lid.is_closed());
        assert!(lid.is_closed());
    }
}
