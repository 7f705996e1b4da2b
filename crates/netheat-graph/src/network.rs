//! Insertion-ordered in-memory network.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::error::GraphError;
use crate::graph::{DiffusionGraph, EdgeRef};
use crate::model::{AttributeValue, Edge, Node};

/// In-memory graph container.
///
/// Nodes and edges keep insertion order, which is the native iteration order
/// reported through [`DiffusionGraph`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Network {
    pub directed: bool,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// node id → position in `nodes`
    #[serde(skip)]
    node_pos: HashMap<Uuid, usize>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directed() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }

    /// Rebuild a network from raw parts, validating ids and edge endpoints.
    pub fn from_parts(
        directed: bool,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self, GraphError> {
        let mut net = Self {
            directed,
            ..Self::default()
        };
        for node in nodes {
            net.insert_node(node)?;
        }
        for edge in edges {
            net.insert_edge(edge)?;
        }
        Ok(net)
    }

    // ── Mutations ──────────────────────────────────────

    /// Add a node with a fresh id and return that id.
    pub fn add_node(&mut self, name: impl Into<String>) -> Uuid {
        let node = Node::new(name);
        let id = node.id;
        self.node_pos.insert(id, self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_pos.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.node_pos.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Add an unweighted edge and return its id.
    pub fn add_edge(&mut self, source: Uuid, target: Uuid) -> Result<Uuid, GraphError> {
        let edge = Edge::new(source, target);
        let id = edge.id;
        self.insert_edge(edge)?;
        Ok(id)
    }

    pub fn add_weighted_edge(
        &mut self,
        source: Uuid,
        target: Uuid,
        weight: f64,
    ) -> Result<Uuid, GraphError> {
        let edge = Edge::weighted(source, target, weight);
        let id = edge.id;
        self.insert_edge(edge)?;
        Ok(id)
    }

    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        for end in [edge.source, edge.target] {
            if !self.node_pos.contains_key(&end) {
                return Err(GraphError::NodeNotFound(end));
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_node_attribute(
        &mut self,
        id: &Uuid,
        name: &str,
    ) -> Result<Option<AttributeValue>, GraphError> {
        Ok(self.node_mut(id)?.attributes.remove(name))
    }

    // ── Queries ────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &Uuid) -> Option<&Node> {
        self.node_pos.get(id).map(|&i| &self.nodes[i])
    }

    /// First node whose name equals `name`, in insertion order.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn node_mut(&mut self, id: &Uuid) -> Result<&mut Node, GraphError> {
        let pos = *self.node_pos.get(id).ok_or(GraphError::NodeNotFound(*id))?;
        Ok(&mut self.nodes[pos])
    }
}

impl DiffusionGraph for Network {
    fn node_ids(&self) -> Vec<Uuid> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    fn edge_refs(&self) -> Vec<EdgeRef> {
        self.edges
            .iter()
            .map(|e| EdgeRef {
                source: e.source,
                target: e.target,
                weight: e.weight,
            })
            .collect()
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn node_name(&self, id: &Uuid) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    fn node_attribute(&self, id: &Uuid, name: &str) -> Option<&AttributeValue> {
        self.node(id).and_then(|n| n.attributes.get(name))
    }

    fn set_node_attribute(
        &mut self,
        id: &Uuid,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), GraphError> {
        self.node_mut(id)?.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
