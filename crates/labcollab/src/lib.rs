//! Backend building blocks for the lab collaboration platform.
//!
//! The crate exposes the project evaluation workflow (including the final evaluation lock),
//! the project catalog, and the configuration/telemetry plumbing shared by the HTTP service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
