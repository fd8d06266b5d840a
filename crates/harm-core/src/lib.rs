//! harm-core: Shared types and error handling for the HARM toolkit.
//!
//! This crate provides the foundational types consumed by the construction
//! engine:
//! - The topology snapshot model (devices, vulnerabilities, anchors) handed
//!   over by the network layer
//! - The privilege model used for edge filtering
//! - Attack path result records
//! - Common error types

pub mod error;
pub mod types;

pub use error::HarmError;
