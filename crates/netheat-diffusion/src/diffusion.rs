//! Seeded heat diffusion: orchestration and result write-back.
//!
//! ## Pipeline
//!
//! ```text
//! Validate → Operator → Seeds → Solve → Rank → Write
//! ```
//!
//! All numeric work finishes before the first attribute is written, so a
//! failed run leaves the graph exactly as it was.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let hd = HeatDiffusion::default();
//! hd.add_seed_nodes_by_node_name(&mut net, &SeedNames::List(vec!["E".into(), "M".into()]))?;
//! hd.run_diffusion(Some(&mut net), &Seeds::FromConfig)?;
//!
//! let rank = net.node_attribute(&id, "diffusion_output_rank");
//! ```

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use netheat_graph::{AttributeValue, DiffusionGraph, GraphError};

use crate::config::DiffusionConfig;
use crate::error::HeatDiffusionError;
use crate::kernel::{apply_heat_kernel, KernelParams};
use crate::laplacian::{NodeIndex, TransitionOperator};
use crate::rank::{assign_ranks, RankPolicy};
use crate::seeds::{self, SeedNames, SeedVector, Seeds};

// ─────────────────────────────────────────────
// DiffusionResult
// ─────────────────────────────────────────────

/// Heat and rank per node, index-aligned with `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionResult {
    /// Node ids in the graph's native order, with the reverse lookup.
    pub index:       NodeIndex,
    pub heat:        Vec<f64>,
    pub ranks:       Vec<u32>,
    pub policy:      RankPolicy,
    /// Series terms evaluated across all sub-steps.
    pub iterations:  usize,
    pub sub_steps:   usize,
    pub duration_ms: u64,
}

impl DiffusionResult {
    pub fn node_ids(&self) -> &[Uuid] {
        &self.index.idx_to_id
    }

    pub fn heat_of(&self, id: &Uuid) -> Option<f64> {
        self.index.get_idx(id).and_then(|i| self.heat.get(i).copied())
    }

    pub fn rank_of(&self, id: &Uuid) -> Option<u32> {
        self.index.get_idx(id).and_then(|i| self.ranks.get(i).copied())
    }

    pub fn total_heat(&self) -> f64 {
        self.heat.iter().sum()
    }

    /// The `k` hottest nodes as `(id, heat, rank)`, by rank then native order.
    pub fn top_k(&self, k: usize) -> Vec<(Uuid, f64, u32)> {
        let ids = self.node_ids();
        let mut order: Vec<usize> = (0..ids.len()).collect();
        order.sort_by_key(|&i| self.ranks[i]);
        order
            .into_iter()
            .take(k)
            .map(|i| (ids[i], self.heat[i], self.ranks[i]))
            .collect()
    }
}

// ─────────────────────────────────────────────
// HeatDiffusion
// ─────────────────────────────────────────────

/// Heat diffusion engine.
///
/// Holds only its configuration; every call rebuilds the index and operator
/// from the graph it is given.
#[derive(Debug, Clone, Default)]
pub struct HeatDiffusion {
    pub config: DiffusionConfig,
}

impl HeatDiffusion {
    pub fn new(config: DiffusionConfig) -> Self {
        Self { config }
    }

    /// Engine configured from `NETHEAT_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(DiffusionConfig::from_env())
    }

    fn kernel_params(&self) -> KernelParams {
        KernelParams {
            time:           self.config.time,
            tolerance:      self.config.tolerance,
            max_iterations: self.config.max_iterations,
            max_step:       self.config.max_step,
        }
    }

    /// Run the pipeline up to ranking without touching the graph.
    pub fn diffuse<G: DiffusionGraph + ?Sized>(
        &self,
        graph: &G,
        seeds: &Seeds,
    ) -> Result<DiffusionResult, HeatDiffusionError> {
        let start = Instant::now();
        self.config.validate()?;

        let op = TransitionOperator::build(graph)?;

        let seed_vec = match seeds {
            Seeds::Ids(ids) => SeedVector::from_ids(&op.index, ids)?,
            Seeds::Attribute(name) => SeedVector::from_attribute(graph, &op.index, name)?,
            Seeds::FromConfig => {
                SeedVector::from_attribute(graph, &op.index, &self.config.input_attribute)?
            }
        };
        for &i in &seed_vec.seed_indices {
            if op.is_dangling(i) {
                warn!(node = %op.index.idx_to_id[i], "seed has no outgoing edges; its heat stays put");
            }
        }

        let outcome = apply_heat_kernel(&op, &seed_vec.heat, &self.kernel_params())?;

        let policy = RankPolicy::from_correct_rank(self.config.correct_rank);
        let ranks = assign_ranks(&outcome.heat, policy);

        let result = DiffusionResult {
            index:       op.index,
            heat:        outcome.heat,
            ranks,
            policy,
            iterations:  outcome.iterations,
            sub_steps:   outcome.sub_steps,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            nodes = op.n,
            edges = op.edge_count,
            seeds = seed_vec.seed_indices.len(),
            iterations = result.iterations,
            duration_ms = result.duration_ms,
            "heat diffusion complete"
        );
        Ok(result)
    }

    /// Run diffusion and annotate every node of `graph` with
    /// `<prefix>_heat` (double) and `<prefix>_rank` (integer).
    ///
    /// Returns the graph that was passed in.
    pub fn run_diffusion<'g, G: DiffusionGraph + ?Sized>(
        &self,
        graph: Option<&'g mut G>,
        seeds: &Seeds,
    ) -> Result<&'g mut G, HeatDiffusionError> {
        let graph = graph.ok_or(HeatDiffusionError::MissingGraph)?;
        let result = self.diffuse(&*graph, seeds)?;
        self.write_result(&mut *graph, &result)?;
        Ok(graph)
    }

    /// Write heat and rank attributes from `result` onto `graph`.
    ///
    /// Lengths and node membership are checked before the first write.
    pub fn write_result<G: DiffusionGraph + ?Sized>(
        &self,
        graph: &mut G,
        result: &DiffusionResult,
    ) -> Result<(), HeatDiffusionError> {
        let n = result.node_ids().len();
        if result.heat.len() != n || result.ranks.len() != n {
            return Err(HeatDiffusionError::LengthMismatch {
                nodes: n,
                heat:  result.heat.len(),
                ranks: result.ranks.len(),
            });
        }
        let present: std::collections::HashSet<Uuid> = graph.node_ids().into_iter().collect();
        if let Some(missing) = result.node_ids().iter().find(|id| !present.contains(*id)) {
            return Err(GraphError::NodeNotFound(*missing).into());
        }

        let heat_attr = self.config.heat_attribute();
        let rank_attr = self.config.rank_attribute();
        for ((id, &h), &r) in result.node_ids().iter().zip(&result.heat).zip(&result.ranks) {
            graph.set_node_attribute(id, &heat_attr, AttributeValue::Double(h))?;
            graph.set_node_attribute(id, &rank_attr, AttributeValue::Integer(i64::from(r)))?;
        }
        debug!(nodes = n, heat = %heat_attr, rank = %rank_attr, "diffusion attributes written");
        Ok(())
    }

    /// Mark named nodes as seeds in the configured input attribute.
    pub fn add_seed_nodes_by_node_name<G: DiffusionGraph + ?Sized>(
        &self,
        graph: &mut G,
        names: &SeedNames,
    ) -> Result<usize, HeatDiffusionError> {
        seeds::add_seed_nodes_by_node_name(graph, names, &self.config.input_attribute)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
