//! # API Shared
//!
//! Shared definitions for the converter HTTP surface.
//!
//! Contains:
//! - The health-check response type ([`HealthRes`])
//! - [`HealthService`], which builds health responses for the REST API and binaries
//!
//! Used by `api-rest` and the `converter-run` binary.

pub mod health;

pub use health::{HealthRes, HealthService};
