//! Error types for the routing engine and its collaborators.

use crate::NodeId;
use thiserror::Error;

/// Routing engine errors
///
/// Unreachable targets are not errors; searches report them as `None`.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Invalid weights: wc={wc}, wt={wt} (each must be in [0, 1] and sum to 1)")]
    InvalidWeight { wc: f64, wt: f64 },

    #[error("Invalid path: no edge between {from} and {to}")]
    InvalidPath { from: NodeId, to: NodeId },

    #[error("Empty path")]
    EmptyPath,

    #[error("Node {node} out of range for a network of {num_nodes} nodes")]
    OutOfRangeNode { node: NodeId, num_nodes: usize },

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid wavelength shift: {0}")]
    InvalidWavelengthShift(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoutingError>;
