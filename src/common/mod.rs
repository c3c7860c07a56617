//! # Common Components
//!
//! Shared definitions used by both the client form layer and the server endpoint.
//!
//! ## Modules
//!
//! - [`constraints`]: Field constraints, enumerations and limits for a submission
//! - [`config`]: Configuration parsing utilities
//! - [`clock`]: Injectable time source for timestamps
//! - [`random`]: Injectable score source for the simulated image checks

pub mod clock;
pub mod config;
pub mod constraints;
pub mod random;

pub use clock::{Clock, FixedClock, SystemClock};
pub use random::{FixedScore, ScoreSource, SeededScores, ThreadRngScores};
