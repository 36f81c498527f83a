//! Enclosure lid interlock

/// Trait for the lid switch
pub trait LidSensor {
    /// Returns true if the enclosure lid is closed
    ///
    /// Takes `&mut self` because GPIO reads may require mutable access.
    fn is_closed(&mut self) -> bool;
}
