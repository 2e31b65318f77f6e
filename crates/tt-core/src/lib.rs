//! # tt-core
//!
//! Control state of the devices on a model-railway layout: points
//! (turnouts), double points, decouplers and semaphore signals.
//!
//! The crate owns the state machines only.  It has no dependency on a motor
//! bus, a clock or a display; a host drives it and reacts to its
//! notifications.
//!
//! # Overview
//!
//! - **`position`** – The internal point position vocabulary and its
//!   translation to the Caniche wire codes a motor controller understands.
//!   The translation depends on the handedness ([`Way`]) of each point.
//!
//! - **`domain`** – Devices and their wished/actual state machines, the
//!   fixed-size identifier registries, and the [`Layout`] that owns both.
//!
//! A host typically builds a [`Layout`], installs one [`Action`] on every
//! device, and on each notification polls the device's pending wish to learn
//! what to command.  Motor feedback flows back through
//! [`Layout::set_actual_position_of_point`] and its Caniche variant.

pub mod domain;
pub mod position;

pub use domain::decoupler::Decoupler;
pub use domain::layout::{DecouplerHandle, Layout, PointHandle, Redraw, SignalHandle};
pub use domain::notify::{Action, PendingWish, Sender};
pub use domain::point::{
    DoublePoint, DoublePointSize, Point, PointControl, PointShape, Quadrant, QuadrantError,
    SinglePoint,
};
pub use domain::registry::{DecouplerId, PointId, MAX_DECOUPLERS, MAX_POINTS};
pub use domain::signal::{Direction, SemaphoreState, Signal};
pub use position::{CanichePosition, Position, Way};
