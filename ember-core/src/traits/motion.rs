//! Gantry positioning trait

/// Errors reported by the motion subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionFault {
    /// Target outside the travel range
    OutOfRange,
    /// Home switch not reached within the travel range
    HomingFailed,
    /// Axis has not been homed
    NotHomed,
}

/// Trait for the two-axis gantry
///
/// Positions are in pixels, `x` horizontal and `y` vertical.
#[allow(async_fn_in_trait)]
pub trait Motion {
    /// Move the head to a pixel position
    async fn move_to(&mut self, x: u16, y: u16) -> Result<(), MotionFault>;

    /// Drive both axes to their home switches
    async fn home(&mut self) -> Result<(), MotionFault>;
}
