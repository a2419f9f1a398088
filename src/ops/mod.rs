//! High-level operations.
//!
//! This module contains the implementation of podlink commands.

pub mod conflicts;
pub mod errors;
pub mod install;
pub mod integrate;
pub mod scripts;

pub use conflicts::{check_overridden_settings, OverrideWarning};
pub use errors::IntegrateError;
pub use install::{check_overrides, install};
pub use integrate::{integrate, IntegrationReport, Integrator};
