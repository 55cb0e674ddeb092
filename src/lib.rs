//! Discount eligibility and pricing engine for tuition enrollment.
//!
//! The core lives under [`enrollment`] and is a pure, synchronous pipeline:
//! CEP category resolution, per-discount eligibility rules, combination
//! validation, and pricing. Everything else (config, telemetry, the HTTP
//! router wired up by the binary) is the service shell around that engine.

pub mod config;
pub mod enrollment;
pub mod error;
pub mod telemetry;
