//! Hardware abstraction traits
//!
//! These traits define the interface between the session logic and the
//! board. Reference implementations live in `ember-drivers`.

pub mod clock;
pub mod laser;
pub mod lid;
pub mod link;
pub mod motion;

pub use clock::Clock;
pub use laser::{Fan, LaserDriver};
pub use lid::LidSensor;
pub use link::{LinkError, PacketLink};
pub use motion::{Motion, MotionFault};
