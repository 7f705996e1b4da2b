//! `netheat-graph` — graph contract consumed by the diffusion engine.
//!
//! The engine never owns a graph. It reads topology through
//! [`DiffusionGraph`] and writes two output attributes back through the same
//! trait. [`Network`] is the in-memory reference container.
//!
//! | Module      | Responsibility                                         |
//! |-------------|--------------------------------------------------------|
//! | [`model`]   | [`Node`], [`Edge`], [`AttributeValue`]                 |
//! | [`graph`]   | [`DiffusionGraph`] trait + [`EdgeRef`]                 |
//! | [`network`] | [`Network`] — insertion-ordered in-memory graph        |
//! | [`error`]   | [`GraphError`]                                         |

pub mod error;
pub mod graph;
pub mod model;
pub mod network;

pub use error::GraphError;
pub use graph::{DiffusionGraph, EdgeRef};
pub use model::{AttributeValue, Edge, Node};
pub use network::Network;
