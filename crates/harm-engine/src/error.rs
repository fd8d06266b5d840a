//! Error types for the harm-engine crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Core error: {0}")]
    Core(#[from] harm_core::HarmError),

    #[error("No attacker start node in topology {topology}")]
    NoStartNode { topology: String },

    #[error("No target end node in topology {topology}")]
    NoEndNode { topology: String },

    #[error("Node not found: {name}")]
    NodeNotFound { name: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
