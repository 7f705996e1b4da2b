//! Graph adapter: node indexing and the random-walk diffusion operator.
//!
//! ## Operator
//!
//! ```text
//! L = I − P        P = A · D⁻¹
//! ```
//!
//! `A[i][j]` is the summed weight of edges `j → i` and `D` the diagonal of
//! outgoing weights `d_j = Σ_i A[i][j]`. Column `j` of `P` therefore spreads
//! the heat held by `j` over its neighbours in proportion to edge weight, and
//! sums to exactly 1. A node with `d_j = 0` keeps its heat (`P[j][j] = 1`).
//!
//! | Property                    | Consequence for `exp(−tL)`             |
//! |-----------------------------|----------------------------------------|
//! | `P ≥ 0` elementwise         | heat stays non-negative                |
//! | columns of `P` sum to 1     | total heat is conserved                |
//! | no path from a seed         | node stays at exactly 0                |
//!
//! ## Summation order
//!
//! Every sum over a node's neighbourhood (outgoing weight, merged multi-edges,
//! incoming heat) runs over its terms in ascending value order. Nodes related
//! by a symmetry of the graph therefore hold bit-identical heat whatever order
//! the graph lists its nodes and edges in, and exact ties survive to ranking.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use netheat_graph::DiffusionGraph;

use crate::error::HeatDiffusionError;

// ─────────────────────────────────────────────
// NodeIndex — Uuid ↔ usize bijection
// ─────────────────────────────────────────────

/// Bidirectional mapping between node ids and dense indices `0..N`.
///
/// Indices follow the graph's native node order, so an unmodified graph
/// always produces the same assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeIndex {
    pub id_to_idx: HashMap<Uuid, usize>,
    pub idx_to_id: Vec<Uuid>,
}

impl NodeIndex {
    pub fn build<G: DiffusionGraph + ?Sized>(graph: &G) -> Self {
        let ids = graph.node_ids();
        let mut id_to_idx = HashMap::with_capacity(ids.len());
        let mut idx_to_id = Vec::with_capacity(ids.len());

        for id in ids {
            // repeated ids keep their first position
            if id_to_idx.contains_key(&id) {
                continue;
            }
            id_to_idx.insert(id, idx_to_id.len());
            idx_to_id.push(id);
        }

        Self { id_to_idx, idx_to_id }
    }

    #[inline] pub fn len(&self) -> usize { self.idx_to_id.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.idx_to_id.is_empty() }

    #[inline]
    pub fn get_idx(&self, id: &Uuid) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }

    #[inline]
    pub fn get_id(&self, idx: usize) -> Option<Uuid> {
        self.idx_to_id.get(idx).copied()
    }
}

/// Sum `values` in ascending order; equal multisets give bit-identical sums.
pub(crate) fn ordered_sum(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    values.iter().fold(0.0, |acc, v| acc + v)
}

// ─────────────────────────────────────────────
// TransitionOperator
// ─────────────────────────────────────────────

/// Sparse adjacency in CSR form, rows keyed by **source** node, its transpose
/// keyed by **target** node, plus the outgoing weight of every node.
#[derive(Debug, Clone)]
pub struct TransitionOperator {
    /// Number of nodes.
    pub n: usize,
    /// Id ↔ index bijection.
    pub index: NodeIndex,
    /// Row offsets, length `n + 1`. Row `j` spans `targets[offsets[j]..offsets[j+1]]`.
    pub offsets: Vec<usize>,
    /// Target node of each stored entry, sorted within a row.
    pub targets: Vec<usize>,
    /// Summed weight of each stored entry.
    pub weights: Vec<f64>,
    /// Transposed row offsets, length `n + 1`.
    pub in_offsets: Vec<usize>,
    /// Source node of each transposed entry.
    pub sources: Vec<usize>,
    /// Weight of each transposed entry.
    pub in_weights: Vec<f64>,
    /// `d_j = Σ` of row `j`.
    pub out_weight: Vec<f64>,
    /// Number of edges read from the graph (self-loops included).
    pub edge_count: usize,
}

impl TransitionOperator {
    /// Build the operator from the current graph state.
    ///
    /// Edge weight is the explicit weight when present, else `1.0`.
    /// Multi-edges between the same ordered pair are summed; self-loops are
    /// dropped. Undirected graphs add both `u → v` and `v → u`.
    pub fn build<G: DiffusionGraph + ?Sized>(graph: &G) -> Result<Self, HeatDiffusionError> {
        let index = NodeIndex::build(graph);
        let n = index.len();
        if n == 0 {
            return Err(HeatDiffusionError::NoNodes);
        }

        let edges = graph.edge_refs();
        if edges.is_empty() {
            return Err(HeatDiffusionError::NoEdges);
        }
        let directed = graph.is_directed();

        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut self_loops = 0usize;

        for e in &edges {
            let (Some(u), Some(v)) = (index.get_idx(&e.source), index.get_idx(&e.target)) else {
                return Err(HeatDiffusionError::DanglingEdge { from: e.source, to: e.target });
            };
            let w = e.weight.unwrap_or(1.0);
            if !w.is_finite() || w < 0.0 {
                return Err(HeatDiffusionError::InvalidWeight {
                    from: e.source,
                    to: e.target,
                    weight: w,
                });
            }
            if u == v {
                self_loops += 1;
                continue;
            }

            rows[u].push((v, w));
            if !directed {
                rows[v].push((u, w));
            }
        }

        // ── Compress: sort each row by (target, weight), merge multi-edges ────
        let mut offsets = Vec::with_capacity(n + 1);
        let mut targets: Vec<usize> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut out_weight = vec![0.0f64; n];
        let mut scratch: Vec<f64> = Vec::new();
        offsets.push(0);

        for (j, mut row) in rows.into_iter().enumerate() {
            row.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            for (t, w) in row {
                match targets.last() {
                    Some(&last) if last == t && targets.len() > offsets[j] => {
                        if let Some(acc) = weights.last_mut() {
                            *acc += w;
                        }
                    }
                    _ => {
                        targets.push(t);
                        weights.push(w);
                    }
                }
            }
            offsets.push(targets.len());

            scratch.clear();
            scratch.extend_from_slice(&weights[offsets[j]..offsets[j + 1]]);
            out_weight[j] = ordered_sum(&mut scratch);
        }

        // ── Transpose: incoming entries per target ───────────────────────────
        let mut in_offsets = vec![0usize; n + 1];
        for &t in &targets {
            in_offsets[t + 1] += 1;
        }
        for i in 0..n {
            in_offsets[i + 1] += in_offsets[i];
        }
        let mut fill = in_offsets.clone();
        let mut sources = vec![0usize; targets.len()];
        let mut in_weights = vec![0.0f64; targets.len()];
        for j in 0..n {
            for e in offsets[j]..offsets[j + 1] {
                let slot = &mut fill[targets[e]];
                sources[*slot] = j;
                in_weights[*slot] = weights[e];
                *slot += 1;
            }
        }

        debug!(
            nodes = n,
            edges = edges.len(),
            entries = targets.len(),
            self_loops,
            directed,
            "diffusion operator built"
        );

        Ok(Self {
            n,
            index,
            offsets,
            targets,
            weights,
            in_offsets,
            sources,
            in_weights,
            out_weight,
            edge_count: edges.len(),
        })
    }

    /// `(j, w)` entries of row `j`.
    pub fn row(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.offsets[j]..self.offsets[j + 1];
        self.targets[span.clone()]
            .iter()
            .copied()
            .zip(self.weights[span].iter().copied())
    }

    /// `true` when node `j` has no outgoing weight and keeps its heat.
    #[inline]
    pub fn is_dangling(&self, j: usize) -> bool {
        self.out_weight[j] <= 0.0
    }

    /// `(j, w)` entries pointing into node `i`.
    pub fn in_row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.in_offsets[i]..self.in_offsets[i + 1];
        self.sources[span.clone()]
            .iter()
            .copied()
            .zip(self.in_weights[span].iter().copied())
    }

    /// Compute `P · x` into `out`: node `i` collects `x_j · w_ji / d_j` from
    /// each in-neighbour `j`, summed in ascending order.
    pub fn apply_transition_into(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.n);
        debug_assert_eq!(out.len(), self.n);
        let mut terms: Vec<f64> = Vec::new();

        for i in 0..self.n {
            terms.clear();
            if self.is_dangling(i) && x[i] != 0.0 {
                terms.push(x[i]);
            }
            for (j, w) in self.in_row(i) {
                let xj = x[j];
                if xj != 0.0 {
                    terms.push(w * (xj / self.out_weight[j]));
                }
            }
            out[i] = ordered_sum(&mut terms);
        }
    }

    /// Allocating form of [`apply_transition_into`](Self::apply_transition_into).
    pub fn apply_transition(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n];
        self.apply_transition_into(x, &mut out);
        out
    }

    /// Compute `(L · x) = x − P · x`.
    pub fn apply_laplacian(&self, x: &[f64]) -> Vec<f64> {
        let px = self.apply_transition(x);
        x.iter().zip(px.iter()).map(|(xi, pi)| xi - pi).collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use netheat_graph::Network;

    fn path(n: usize) -> (Network, Vec<Uuid>) {
        let mut net = Network::new();
        let ids: Vec<Uuid> = (0..n).map(|i| net.add_node(format!("n{i}"))).collect();
        for w in ids.windows(2) {
            net.add_edge(w[0], w[1]).unwrap();
        }
        (net, ids)
    }

    #[test]
    fn index_follows_native_order() {
        let (net, ids) = path(4);
        let idx = NodeIndex::build(&net);
        assert_eq!(idx.idx_to_id, ids);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(idx.get_idx(id), Some(i));
            assert_eq!(idx.get_id(i), Some(*id));
        }
        assert_eq!(idx.get_id(4), None);
    }

    #[test]
    fn empty_graph_is_rejected() {
        let net = Network::new();
        assert!(matches!(
            TransitionOperator::build(&net),
            Err(HeatDiffusionError::NoNodes)
        ));
    }

    #[test]
    fn edgeless_graph_is_rejected() {
        let mut net = Network::new();
        net.add_node("a");
        assert!(matches!(
            TransitionOperator::build(&net),
            Err(HeatDiffusionError::NoEdges)
        ));
    }

    #[test]
    fn undirected_edges_go_both_ways() {
        let (net, _) = path(3);
        let op = TransitionOperator::build(&net).unwrap();
        assert_eq!(op.n, 3);
        assert_eq!(op.row(0).collect::<Vec<_>>(), vec![(1, 1.0)]);
        assert_eq!(op.row(1).collect::<Vec<_>>(), vec![(0, 1.0), (2, 1.0)]);
        assert_eq!(op.out_weight, vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn directed_edges_go_one_way() {
        let mut net = Network::directed();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.add_edge(a, b).unwrap();
        let op = TransitionOperator::build(&net).unwrap();
        assert_eq!(op.row(0).collect::<Vec<_>>(), vec![(1, 1.0)]);
        assert_eq!(op.row(1).count(), 0);
        assert!(op.is_dangling(1));
    }

    #[test]
    fn multi_edges_accumulate() {
        let mut net = Network::new();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.add_weighted_edge(a, b, 2.0).unwrap();
        net.add_weighted_edge(a, b, 0.5).unwrap();
        net.add_edge(b, a).unwrap();
        let op = TransitionOperator::build(&net).unwrap();
        assert_eq!(op.row(0).collect::<Vec<_>>(), vec![(1, 3.5)]);
        assert_eq!(op.row(1).collect::<Vec<_>>(), vec![(0, 3.5)]);
        assert_eq!(op.edge_count, 3);
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut net = Network::new();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.add_edge(a, a).unwrap();
        net.add_edge(a, b).unwrap();
        let op = TransitionOperator::build(&net).unwrap();
        assert!(op.row(0).all(|(t, _)| t != 0));
        assert_eq!(op.out_weight[0], 1.0);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut net = Network::new();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.add_weighted_edge(a, b, -1.0).unwrap();
        assert!(matches!(
            TransitionOperator::build(&net),
            Err(HeatDiffusionError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn transition_columns_conserve_mass() {
        let mut net = Network::new();
        let ids: Vec<Uuid> = (0..4).map(|i| net.add_node(format!("n{i}"))).collect();
        net.add_weighted_edge(ids[0], ids[1], 3.0).unwrap();
        net.add_weighted_edge(ids[0], ids[2], 1.0).unwrap();
        net.add_edge(ids[2], ids[3]).unwrap();
        let op = TransitionOperator::build(&net).unwrap();

        for j in 0..op.n {
            let mut e = vec![0.0; op.n];
            e[j] = 1.0;
            let col: f64 = op.apply_transition(&e).iter().sum();
            assert!((col - 1.0).abs() < 1e-12, "column {j} sums to {col}");
        }

        // weight-proportional split out of node 0
        let mut e0 = vec![0.0; 4];
        e0[0] = 1.0;
        let p = op.apply_transition(&e0);
        assert!((p[1] - 0.75).abs() < 1e-12);
        assert!((p[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn transpose_mirrors_rows() {
        let mut net = Network::directed();
        let ids: Vec<Uuid> = (0..3).map(|i| net.add_node(format!("n{i}"))).collect();
        net.add_weighted_edge(ids[0], ids[2], 2.0).unwrap();
        net.add_weighted_edge(ids[1], ids[2], 0.5).unwrap();
        net.add_edge(ids[2], ids[0]).unwrap();
        let op = TransitionOperator::build(&net).unwrap();
        assert_eq!(op.in_row(2).collect::<Vec<_>>(), vec![(0, 2.0), (1, 0.5)]);
        assert_eq!(op.in_row(0).collect::<Vec<_>>(), vec![(2, 1.0)]);
        assert_eq!(op.in_row(1).count(), 0);
    }

    /// Circulant C9(1, 2) with weight 1 / offset: node `k` and node `9 - k`
    /// are mirror images around node 0.
    fn circulant(order: &[usize]) -> (Network, Vec<Uuid>) {
        let mut net = Network::new();
        let mut ids = vec![Uuid::nil(); 9];
        for &k in order {
            ids[k] = net.add_node(format!("c{k}"));
        }
        for &k in order {
            for off in [1usize, 2] {
                net.add_weighted_edge(ids[k], ids[(k + off) % 9], 1.0 / off as f64).unwrap();
            }
        }
        (net, ids)
    }

    #[test]
    fn mirror_nodes_stay_bit_identical_under_any_order() {
        let orders: Vec<Vec<usize>> = vec![
            (0..9).collect(),
            (0..9).rev().collect(),
            (0..9).map(|i| (i * 4 + 3) % 9).collect(),
            (0..9).map(|i| (i * 7 + 1) % 9).collect(),
        ];
        let mut reference: Option<Vec<u64>> = None;

        for order in &orders {
            let (net, ids) = circulant(order);
            let op = TransitionOperator::build(&net).unwrap();
            let mut x = vec![0.0; 9];
            x[op.index.get_idx(&ids[0]).unwrap()] = 1.0;
            for _ in 0..6 {
                x = op.apply_transition(&x);
            }
            let by_label: Vec<u64> = (0..9)
                .map(|k| x[op.index.get_idx(&ids[k]).unwrap()].to_bits())
                .collect();
            for k in 1..9 {
                assert_eq!(by_label[k], by_label[9 - k], "order {order:?}, node {k}");
            }
            match &reference {
                Some(r) => assert_eq!(r, &by_label, "order {order:?}"),
                None => reference = Some(by_label),
            }
        }
    }

    #[test]
    fn ordered_sum_ignores_input_order() {
        let mut a = [1e16, 1.0, -1e16, 3.0, 0.1];
        let mut b = [0.1, -1e16, 3.0, 1.0, 1e16];
        assert_eq!(ordered_sum(&mut a).to_bits(), ordered_sum(&mut b).to_bits());
        assert_eq!(ordered_sum(&mut []), 0.0);
    }

    #[test]
    fn laplacian_of_uniform_signal_on_regular_graph_is_zero() {
        let mut net = Network::new();
        let ids: Vec<Uuid> = (0..3).map(|i| net.add_node(format!("n{i}"))).collect();
        for i in 0..3 {
            net.add_edge(ids[i], ids[(i + 1) % 3]).unwrap();
        }
        let op = TransitionOperator::build(&net).unwrap();
        let lx = op.apply_laplacian(&[1.0, 1.0, 1.0]);
        assert!(lx.iter().all(|v| v.abs() < 1e-12), "{lx:?}");
    }
}
