//! Application layer use cases for the simulator.
//!
//! Use cases here orchestrate the core [`tt_core::Layout`] and depend on
//! abstractions (the [`drive_points::PointActuator`] trait) rather than on
//! concrete motors, so every one of them is unit-testable without I/O.
//!
//! # Sub-modules
//!
//! - **`build_layout`** – Turns the layout description into a populated
//!   `Layout`.
//!
//! - **`drive_points`** – Polls pending wishes, commands the motors and
//!   applies their feedback.  Also turns wished-change notifications into a
//!   channel the main loop can await.
//!
//! - **`scenario`** – Replays the scripted touches.
//!
//! - **`simulate`** – Ties the three together into a tick.

pub mod build_layout;
pub mod drive_points;
pub mod scenario;
pub mod simulate;
