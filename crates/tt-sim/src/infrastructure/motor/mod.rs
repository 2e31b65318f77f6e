//! Turnout motor adapters.
//!
//! Only a simulated bank exists: it implements
//! [`PointActuator`](crate::application::drive_points::PointActuator) with a
//! fixed transit time, so a layout can be exercised without hardware.

pub mod simulated;

pub use simulated::SimulatedMotorBank;
