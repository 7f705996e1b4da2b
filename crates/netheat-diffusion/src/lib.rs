//! `netheat-diffusion` — seeded heat diffusion over weighted networks.
//!
//! Finds the neighbourhood of a graph most relevant to a set of seed nodes:
//! seeds receive unit total heat, heat flows along edges in proportion to
//! their weight, and every node ends up with a heat score and a rank.
//!
//! ## Crate structure
//!
//! | Module        | Responsibility                                               |
//! |---------------|--------------------------------------------------------------|
//! | [`laplacian`] | [`NodeIndex`] + [`TransitionOperator`] (CSR, random-walk)    |
//! | [`seeds`]     | [`SeedVector`], seed-by-name helpers                         |
//! | [`kernel`]    | `exp(−tL)·h` by Poisson-weighted series                      |
//! | [`rank`]      | [`assign_ranks`] with legacy / corrected tie policies        |
//! | [`diffusion`] | [`HeatDiffusion`] orchestrator and result write-back         |
//! | [`config`]    | [`DiffusionConfig`], attribute-name constants                |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use netheat_diffusion::{HeatDiffusion, Seeds};
//!
//! let hd = HeatDiffusion::default();
//! hd.run_diffusion(Some(&mut network), &Seeds::Ids(vec![seed_id]))?;
//! ```
//!
//! ## Time scale
//!
//! | `time` | Heat reaches                     |
//! |--------|----------------------------------|
//! | 0.1    | Seeds and direct neighbours      |
//! | 1.0    | 2–3 hop neighbourhood            |
//! | 10.0   | Close to the stationary spread   |

pub mod config;
pub mod diffusion;
pub mod error;
pub mod kernel;
pub mod laplacian;
pub mod rank;
pub mod seeds;

// ── Config ────────────────────────────────────────────────────────────────────
pub use config::{
    DiffusionConfig, DEFAULT_HEAT_SUFFIX, DEFAULT_INPUT, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_RANK_SUFFIX, DEFAULT_SERVICE_ENDPOINT,
};

// ── Engine ────────────────────────────────────────────────────────────────────
pub use diffusion::{DiffusionResult, HeatDiffusion};
pub use error::HeatDiffusionError;
pub use kernel::{apply_heat_kernel, poisson_weights, KernelOutcome, KernelParams};
pub use laplacian::{NodeIndex, TransitionOperator};
pub use rank::{assign_ranks, RankPolicy};
pub use seeds::{add_seed_nodes_by_node_name, resolve_seed_names, SeedNames, SeedVector, Seeds};
