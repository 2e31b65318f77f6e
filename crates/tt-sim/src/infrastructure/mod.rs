//! Infrastructure layer for the simulator.
//!
//! Contains the adapters around the core: the TOML layout file, the simulated
//! turnout motors, and the console view.
//!
//! **Dependency rule**: this layer may depend on `application` and `tt_core`,
//! but MUST NOT be imported by the `tt_core` domain.

pub mod console_view;
pub mod motor;
pub mod storage;
