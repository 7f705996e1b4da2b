//! Heat → rank conversion.
//!
//! Rank 1 is the hottest node. Ranks depend only on heat values: two nodes
//! with equal heat always share a rank, whatever their position in the
//! graph, so structurally equivalent graphs listed in different orders rank
//! identically.
//!
//! | Heat           | `Legacy` (dense) | `Corrected` (competition) |
//! |----------------|------------------|---------------------------|
//! | `[9, 5, 5, 1]` | `[1, 2, 2, 3]`   | `[1, 2, 2, 4]`            |
//! | `[5, 5, 3, 1]` | `[1, 1, 2, 3]`   | `[1, 1, 3, 4]`            |

use serde::{Deserialize, Serialize};

/// Tie-break policy, selected by the `correct_rank` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankPolicy {
    /// `correct_rank = false`: the rank after a tie block is the block's
    /// rank + 1.
    #[default]
    Legacy,
    /// `correct_rank = true`: the rank after a tie block is 1 + the 0-based
    /// position where the next block starts.
    Corrected,
}

impl RankPolicy {
    pub fn from_correct_rank(correct_rank: bool) -> Self {
        if correct_rank { Self::Corrected } else { Self::Legacy }
    }
}

/// Rank every entry of `heat`, index-aligned with the input.
pub fn assign_ranks(heat: &[f64], policy: RankPolicy) -> Vec<u32> {
    let mut order: Vec<usize> = (0..heat.len()).collect();
    // descending; tied entries end up adjacent, their relative order is irrelevant
    order.sort_by(|&a, &b| heat[b].total_cmp(&heat[a]));

    let mut ranks = vec![0u32; heat.len()];
    let mut current = 0u32;
    let mut previous: Option<f64> = None;

    for (pos, &i) in order.iter().enumerate() {
        let h = heat[i];
        if previous != Some(h) {
            current = match policy {
                RankPolicy::Legacy => current + 1,
                RankPolicy::Corrected => pos as u32 + 1,
            };
            previous = Some(h);
        }
        ranks[i] = current;
    }
    ranks
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
