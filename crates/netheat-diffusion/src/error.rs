//! Error type for the diffusion engine.

use thiserror::Error;
use uuid::Uuid;

use netheat_graph::GraphError;

/// The single error kind raised by the diffusion engine.
///
/// Every failure is terminal for the call that raised it; nothing is written
/// to the graph once an error has been produced.
#[derive(Debug, Error)]
pub enum HeatDiffusionError {
    #[error("input network cannot be None")]
    MissingGraph,

    #[error("network has no nodes")]
    NoNodes,

    #[error("network has no edges")]
    NoEdges,

    #[error("seed set is empty")]
    EmptySeeds,

    #[error("seed node {0} is not in the network")]
    UnknownSeed(Uuid),

    #[error("no node named {0:?} in the network")]
    UnknownNodeName(String),

    #[error("no input heat found in attribute {0:?}")]
    NoInputHeat(String),

    #[error("invalid seed value on node {node}: {reason}")]
    InvalidSeedValue { node: Uuid, reason: String },

    #[error("edge {from} -> {to} references a node outside the network")]
    DanglingEdge { from: Uuid, to: Uuid },

    #[error("edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight { from: Uuid, to: Uuid, weight: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("diffusion did not converge within {max_iterations} iterations (residual {residual:.3e})")]
    NonConvergence { max_iterations: usize, residual: f64 },

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("length mismatch: {nodes} nodes, {heat} heat values, {ranks} ranks")]
    LengthMismatch { nodes: usize, heat: usize, ranks: usize },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}
