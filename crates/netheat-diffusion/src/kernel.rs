//! Heat kernel `exp(−tL)` applied to a heat vector by uniformization.
//!
//! ## Series
//!
//! With `L = I − P` the heat kernel factors as `e^{−t} · e^{tP}`, which
//! expands into a Poisson-weighted sum of random-walk steps:
//!
//! ```text
//! exp(−τL) · h = Σ_{k=0}^{∞}  π_k(τ) · Pᵏ h        π_k(τ) = e^{−τ} τᵏ / k!
//! ```
//!
//! Every `π_k ≥ 0` and `Pᵏ h ≥ 0`, so partial sums are non-negative and grow
//! monotonically toward the exact result. Since `P` conserves mass, the mass
//! still missing after `K` terms is exactly `1 − Σ_{k≤K} π_k` times the input
//! mass; this is the stopping criterion.
//!
//! ## Sub-steps
//!
//! `t` is split into `s = ⌈t / max_step⌉` equal sub-steps `τ = t / s`, so
//! `e^{−τ}` never underflows and each sub-step needs only a handful of
//! terms (about 15 for `τ = 1`, tolerance `1e-12`).

use tracing::debug;

use crate::error::HeatDiffusionError;
use crate::laplacian::TransitionOperator;

/// Hard ceiling on sub-steps to keep absurd `time / max_step` ratios finite.
pub const MAX_SUB_STEPS: usize = 1_000_000;

/// Solver tunables, taken from [`DiffusionConfig`](crate::DiffusionConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    pub time:           f64,
    pub tolerance:      f64,
    pub max_iterations: usize,
    pub max_step:       f64,
}

/// Heat after diffusion plus solver statistics.
#[derive(Debug, Clone)]
pub struct KernelOutcome {
    pub heat:       Vec<f64>,
    /// Number of sub-steps taken.
    pub sub_steps:  usize,
    /// Total series terms over all sub-steps (operator applications).
    pub iterations: usize,
}

// ─────────────────────────────────────────────
// Poisson weights
// ─────────────────────────────────────────────

/// `[π_0(τ), …, π_{k_max}(τ)]` with `π_k(τ) = e^{−τ} τᵏ / k!`.
///
/// For `τ = 0`: `π_0 = 1`, all others `0`.
pub fn poisson_weights(tau: f64, k_max: usize) -> Vec<f64> {
    let mut w = Vec::with_capacity(k_max + 1);
    let mut p = (-tau).exp();
    w.push(p);
    for k in 1..=k_max {
        p *= tau / k as f64;
        w.push(p);
    }
    w
}

/// Number of equal sub-steps needed so no sub-step exceeds `max_step`.
pub fn sub_step_count(time: f64, max_step: f64) -> Result<usize, HeatDiffusionError> {
    if !time.is_finite() || time < 0.0 {
        return Err(HeatDiffusionError::InvalidParameter(format!(
            "time must be finite and >= 0, got {time}"
        )));
    }
    if !max_step.is_finite() || max_step <= 0.0 {
        return Err(HeatDiffusionError::InvalidParameter(format!(
            "max_step must be finite and > 0, got {max_step}"
        )));
    }
    if time == 0.0 {
        return Ok(0);
    }
    let steps = (time / max_step).ceil();
    if steps > MAX_SUB_STEPS as f64 {
        return Err(HeatDiffusionError::InvalidParameter(format!(
            "time / max_step needs {steps} sub-steps, limit is {MAX_SUB_STEPS}"
        )));
    }
    Ok((steps as usize).max(1))
}

// ─────────────────────────────────────────────
// Heat kernel application
// ─────────────────────────────────────────────

/// Apply `exp(−t·L)` to `x`.
///
/// # Errors
/// * [`HeatDiffusionError::InvalidParameter`] — bad `time`, `max_step`,
///   `tolerance` or `max_iterations`, or `x.len() != op.n`.
/// * [`HeatDiffusionError::NonConvergence`] — a sub-step needed more than
///   `max_iterations` terms to push the tail below `tolerance`.
/// * [`HeatDiffusionError::Numerical`] — a non-finite value appeared.
pub fn apply_heat_kernel(
    op:     &TransitionOperator,
    x:      &[f64],
    params: &KernelParams,
) -> Result<KernelOutcome, HeatDiffusionError> {
    if x.len() != op.n {
        return Err(HeatDiffusionError::InvalidParameter(format!(
            "heat vector has {} entries, operator has {} nodes",
            x.len(),
            op.n
        )));
    }
    if !(params.tolerance > 0.0 && params.tolerance < 1.0) {
        return Err(HeatDiffusionError::InvalidParameter(format!(
            "tolerance must lie in (0, 1), got {}",
            params.tolerance
        )));
    }
    if params.max_iterations == 0 {
        return Err(HeatDiffusionError::InvalidParameter(
            "max_iterations must be > 0".into(),
        ));
    }
    if let Some(bad) = x.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(HeatDiffusionError::Numerical(format!(
            "initial heat must be finite and >= 0, found {bad}"
        )));
    }

    let steps = sub_step_count(params.time, params.max_step)?;
    let tau = if steps == 0 { 0.0 } else { params.time / steps as f64 };

    let n = op.n;
    let mut heat = x.to_vec();
    let mut term = vec![0.0f64; n];
    let mut next = vec![0.0f64; n];
    let mut acc_heat = vec![0.0f64; n];
    let mut iterations = 0usize;

    for _ in 0..steps {
        // k = 0
        term.copy_from_slice(&heat);
        let mut weight = (-tau).exp();
        let mut mass = weight;
        for (a, t) in acc_heat.iter_mut().zip(term.iter()) {
            *a = weight * t;
        }

        let mut k = 0usize;
        while 1.0 - mass > params.tolerance {
            k += 1;
            if k > params.max_iterations {
                return Err(HeatDiffusionError::NonConvergence {
                    max_iterations: params.max_iterations,
                    residual: 1.0 - mass,
                });
            }
            op.apply_transition_into(&term, &mut next);
            std::mem::swap(&mut term, &mut next);

            weight *= tau / k as f64;
            mass += weight;
            for (a, t) in acc_heat.iter_mut().zip(term.iter()) {
                *a += weight * t;
            }
        }

        iterations += k;
        std::mem::swap(&mut heat, &mut acc_heat);
    }

    if let Some((i, v)) = heat.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(HeatDiffusionError::Numerical(format!(
            "non-finite heat {v} at index {i}"
        )));
    }

    debug!(time = params.time, sub_steps = steps, tau, iterations, "heat kernel applied");
    Ok(KernelOutcome { heat, sub_steps: steps, iterations })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
