//! The graph contract read and written by the diffusion engine.

use uuid::Uuid;

use crate::error::GraphError;
use crate::model::AttributeValue;

/// One edge as seen by the engine: endpoints plus an optional weight.
///
/// `weight == None` means the container carries no explicit weight for this
/// edge; the engine substitutes `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef {
    pub source: Uuid,
    pub target: Uuid,
    pub weight: Option<f64>,
}

/// Minimal surface a graph container must expose to run diffusion on it.
///
/// Iteration order matters: `node_ids` must return nodes in a stable native
/// order so repeated runs on an unmodified graph assign identical indices.
pub trait DiffusionGraph {
    /// Node identifiers in native iteration order.
    fn node_ids(&self) -> Vec<Uuid>;

    /// Edges in native iteration order.
    fn edge_refs(&self) -> Vec<EdgeRef>;

    /// `false` → every edge couples both endpoints.
    fn is_directed(&self) -> bool {
        false
    }

    /// Human-readable node label, if any.
    fn node_name(&self, id: &Uuid) -> Option<&str>;

    fn node_attribute(&self, id: &Uuid, name: &str) -> Option<&AttributeValue>;

    /// Set or overwrite a node attribute.
    fn set_node_attribute(
        &mut self,
        id: &Uuid,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), GraphError>;

    fn node_count(&self) -> usize {
        self.node_ids().len()
    }

    fn edge_count(&self) -> usize {
        self.edge_refs().len()
    }
}
