//! Devices of a model-railway layout and the rules that drive them.
//!
//! Nothing in here touches hardware, a clock or a screen.  Hardware drivers
//! and renderers live in outer layers and talk to the [`layout::Layout`]
//! through its identifier-addressed surface.

pub mod decoupler;

/// The owner of every device; see [`layout::Layout`].
pub mod layout;

pub mod notify;
pub mod point;
pub mod registry;
pub mod signal;
