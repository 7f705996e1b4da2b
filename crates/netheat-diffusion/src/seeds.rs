//! Seed selection and the initial heat vector.
//!
//! Total initial heat is always normalised to `1.0`, so heat scales stay
//! comparable between runs with different seed counts.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use netheat_graph::{AttributeValue, DiffusionGraph};

use crate::error::HeatDiffusionError;
use crate::laplacian::{ordered_sum, NodeIndex};

/// Where the initial heat comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Seeds {
    /// Explicit node ids; every distinct seed gets equal mass.
    Ids(Vec<Uuid>),
    /// Read relative heat from the named node attribute.
    Attribute(String),
    /// Read relative heat from the configured input attribute.
    FromConfig,
}

impl From<Vec<Uuid>> for Seeds {
    fn from(ids: Vec<Uuid>) -> Self {
        Self::Ids(ids)
    }
}

/// Seeds addressed by node name, for [`add_seed_nodes_by_node_name`].
#[derive(Debug, Clone, PartialEq)]
pub enum SeedNames {
    /// Each named node is marked with `1.0`.
    List(Vec<String>),
    /// Each named node is marked with its own value.
    Weighted(Vec<(String, f64)>),
}

// ─────────────────────────────────────────────
// SeedVector
// ─────────────────────────────────────────────

/// Initial heat `H0`, index-aligned to a [`NodeIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeedVector {
    pub heat: Vec<f64>,
    /// Indices with strictly positive heat, ascending.
    pub seed_indices: Vec<usize>,
}

impl SeedVector {
    /// Unit mass spread evenly over `ids`. Duplicates count once.
    pub fn from_ids(index: &NodeIndex, ids: &[Uuid]) -> Result<Self, HeatDiffusionError> {
        if ids.is_empty() {
            return Err(HeatDiffusionError::EmptySeeds);
        }

        let mut seed_indices = Vec::with_capacity(ids.len());
        for id in ids {
            let i = index.get_idx(id).ok_or(HeatDiffusionError::UnknownSeed(*id))?;
            seed_indices.push(i);
        }
        seed_indices.sort_unstable();
        seed_indices.dedup();

        let mass = 1.0 / seed_indices.len() as f64;
        let mut heat = vec![0.0f64; index.len()];
        for &i in &seed_indices {
            heat[i] = mass;
        }

        debug!(seeds = seed_indices.len(), "seed vector built from ids");
        Ok(Self { heat, seed_indices })
    }

    /// Relative heat read from node attribute `name`, normalised to sum 1.
    ///
    /// Nodes without the attribute start cold. Values are scaled by their
    /// maximum before summing, so any finite input normalises without
    /// overflow. Fails when no node carries the attribute, when a value is
    /// not a finite non-negative number, or when every value is zero.
    pub fn from_attribute<G: DiffusionGraph + ?Sized>(
        graph: &G,
        index: &NodeIndex,
        name: &str,
    ) -> Result<Self, HeatDiffusionError> {
        let mut heat = vec![0.0f64; index.len()];
        let mut found = false;

        for (i, id) in index.idx_to_id.iter().enumerate() {
            let Some(value) = graph.node_attribute(id, name) else { continue };
            found = true;
            let v = value.as_f64().ok_or_else(|| HeatDiffusionError::InvalidSeedValue {
                node: *id,
                reason: format!("{} value is not numeric", value.type_name()),
            })?;
            if !v.is_finite() || v < 0.0 {
                return Err(HeatDiffusionError::InvalidSeedValue {
                    node: *id,
                    reason: format!("heat must be finite and >= 0, got {v}"),
                });
            }
            heat[i] = v;
        }

        if !found {
            return Err(HeatDiffusionError::NoInputHeat(name.to_string()));
        }

        let max = heat.iter().copied().fold(0.0, f64::max);
        if max <= 0.0 {
            return Err(HeatDiffusionError::EmptySeeds);
        }
        heat.iter_mut().for_each(|v| *v /= max);
        // in [1, n] after scaling
        let total = ordered_sum(&mut heat.clone());
        heat.iter_mut().for_each(|v| *v /= total);

        let seed_indices: Vec<usize> = heat
            .iter()
            .enumerate()
            .filter(|(_, &h)| h > 0.0)
            .map(|(i, _)| i)
            .collect();
        if seed_indices.is_empty() {
            return Err(HeatDiffusionError::EmptySeeds);
        }

        debug!(seeds = seed_indices.len(), attribute = name, "seed vector built from attribute");
        Ok(Self { heat, seed_indices })
    }

    pub fn total(&self) -> f64 {
        self.heat.iter().sum()
    }
}

// ─────────────────────────────────────────────
// Name helpers
// ─────────────────────────────────────────────

/// Every node id carrying each name, in native node order.
fn name_lookup<G: DiffusionGraph + ?Sized>(graph: &G) -> HashMap<String, Vec<Uuid>> {
    let mut by_name: HashMap<String, Vec<Uuid>> = HashMap::new();
    for id in graph.node_ids() {
        if let Some(name) = graph.node_name(&id) {
            by_name.entry(name.to_string()).or_default().push(id);
        }
    }
    by_name
}

/// Resolve human-readable node names to ids.
///
/// A name shared by several nodes yields all of them, in native order.
pub fn resolve_seed_names<G, S>(graph: &G, names: &[S]) -> Result<Vec<Uuid>, HeatDiffusionError>
where
    G: DiffusionGraph + ?Sized,
    S: AsRef<str>,
{
    let by_name = name_lookup(graph);
    let mut ids = Vec::with_capacity(names.len());
    for n in names {
        let matches = by_name
            .get(n.as_ref())
            .ok_or_else(|| HeatDiffusionError::UnknownNodeName(n.as_ref().to_string()))?;
        ids.extend_from_slice(matches);
    }
    Ok(ids)
}

/// Mark named nodes as seeds by writing `attribute` on them.
///
/// Every node whose name matches is marked. Every name is resolved before
/// anything is written. Returns the number of nodes marked.
pub fn add_seed_nodes_by_node_name<G: DiffusionGraph + ?Sized>(
    graph: &mut G,
    seeds: &SeedNames,
    attribute: &str,
) -> Result<usize, HeatDiffusionError> {
    let marks: Vec<(String, f64)> = match seeds {
        SeedNames::List(names) => names.iter().map(|n| (n.clone(), 1.0)).collect(),
        SeedNames::Weighted(pairs) => pairs.clone(),
    };

    let by_name = name_lookup(&*graph);
    let mut resolved = Vec::with_capacity(marks.len());
    for (name, value) in marks {
        let ids = by_name
            .get(&name)
            .ok_or(HeatDiffusionError::UnknownNodeName(name))?;
        resolved.extend(ids.iter().map(|&id| (id, value)));
    }

    for (id, value) in &resolved {
        graph.set_node_attribute(id, attribute, AttributeValue::Double(*value))?;
    }
    debug!(nodes = resolved.len(), attribute, "seed nodes marked by name");
    Ok(resolved.len())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
