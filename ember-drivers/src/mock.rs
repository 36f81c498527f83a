//! Mock pins for driver tests

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

/// Output pin that counts rising edges
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
    pub rising_edges: u32,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

/// Input pin that reads high for `high_reads` reads, then low
pub struct MockInput {
    pub high_reads: u32,
}

impl ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        if self.high_reads > 0 {
            self.high_reads -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// PWM channel with a 1000-count period
#[derive(Default)]
pub struct MockPwm {
    pub duty: u16,
}

impl pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        1000
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty = duty;
        Ok(())
    }
}

/// Delay that returns immediately and counts elapsed microseconds
#[derive(Default)]
pub struct MockDelay {
    pub elapsed_us: u64,
}

impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_us += u64::from(ns / 1000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }
}
