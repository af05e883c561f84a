//! Runtime Configuration Module
//!
//! Provides pipeline and spectrum tuning loaded from TOML files,
//! replacing hardcoded constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `ACCELSPEC_CONFIG` environment variable (path to TOML file)
//! 2. `accelspec.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Settings are loaded once in `main` and handed down by reference;
//! every component that needs tuning receives `&Settings` at
//! construction time, so there is no global accessor to reach around.

mod settings;

pub use settings::*;
