//! Storage infrastructure: the layout description file.
//!
//! The `config` sub-module reads and writes the TOML file describing the
//! devices, the motor behavior and the touch script, and falls back to an
//! empty layout when the file does not exist.

pub mod config;
