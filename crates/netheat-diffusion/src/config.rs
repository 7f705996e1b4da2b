//! Configuration for the heat diffusion engine.

use serde::{Deserialize, Serialize};

use crate::error::HeatDiffusionError;

/// Remote heat diffusion REST endpoint. Only used by remote collaborators.
pub const DEFAULT_SERVICE_ENDPOINT: &str = "http://v3.heat-diffusion.cytoscape.io";

/// Node attribute holding input heat (seed marker).
pub const DEFAULT_INPUT: &str = "diffusion_input";

/// Prefix of the two output attributes.
pub const DEFAULT_OUTPUT_PREFIX: &str = "diffusion_output";

pub const DEFAULT_HEAT_SUFFIX: &str = "_heat";

pub const DEFAULT_RANK_SUFFIX: &str = "_rank";

/// Tuning parameters and attribute naming for [`HeatDiffusion`](crate::HeatDiffusion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    // ── Solver ────────────────────────────────────────────────────────────────

    /// Diffusion time horizon `t` in `H(t) = exp(−tL)·H0`.
    /// Default: `0.1`
    pub time: f64,

    /// Remaining Poisson tail mass at which a sub-step stops adding terms.
    /// Must lie in `(0, 1)`. Default: `1e-12`
    pub tolerance: f64,

    /// Safety cap on series terms per sub-step. Default: `1000`
    pub max_iterations: usize,

    /// Largest sub-step length; `time` is split into `ceil(time / max_step)`
    /// equal sub-steps. Default: `1.0`
    pub max_step: f64,

    // ── Ranking ───────────────────────────────────────────────────────────────

    /// `false` → dense (legacy) ranking, `true` → competition ranking.
    /// Default: `false`
    pub correct_rank: bool,

    // ── Attribute naming ──────────────────────────────────────────────────────

    /// Default: [`DEFAULT_INPUT`]
    pub input_attribute: String,

    /// Default: [`DEFAULT_OUTPUT_PREFIX`]
    pub output_prefix: String,

    /// Default: [`DEFAULT_SERVICE_ENDPOINT`]
    pub service_endpoint: String,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            time:             0.1,
            tolerance:        1e-12,
            max_iterations:   1000,
            max_step:         1.0,
            correct_rank:     false,
            input_attribute:  DEFAULT_INPUT.to_string(),
            output_prefix:    DEFAULT_OUTPUT_PREFIX.to_string(),
            service_endpoint: DEFAULT_SERVICE_ENDPOINT.to_string(),
        }
    }
}

impl DiffusionConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// | Variable                   | Default                                 |
    /// |----------------------------|-----------------------------------------|
    /// | `NETHEAT_TIME`             | `0.1`                                   |
    /// | `NETHEAT_TOLERANCE`        | `1e-12`                                 |
    /// | `NETHEAT_MAX_ITERATIONS`   | `1000`                                  |
    /// | `NETHEAT_MAX_STEP`         | `1.0`                                   |
    /// | `NETHEAT_CORRECT_RANK`     | `false`                                 |
    /// | `NETHEAT_INPUT_ATTRIBUTE`  | `diffusion_input`                       |
    /// | `NETHEAT_OUTPUT_PREFIX`    | `diffusion_output`                      |
    /// | `NETHEAT_SERVICE_ENDPOINT` | `http://v3.heat-diffusion.cytoscape.io` |
    pub fn from_env() -> Self {
        fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }
        fn env_bool(key: &str, default: bool) -> bool {
            match std::env::var(key).ok().map(|s| s.trim().to_lowercase()) {
                Some(s) if matches!(s.as_str(), "1" | "true" | "yes" | "on") => true,
                Some(s) if matches!(s.as_str(), "0" | "false" | "no" | "off") => false,
                _ => default,
            }
        }
        fn env_string(key: &str, default: String) -> String {
            std::env::var(key)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default)
        }

        let def = Self::default();
        Self {
            time:             env_parse("NETHEAT_TIME",           def.time),
            tolerance:        env_parse("NETHEAT_TOLERANCE",      def.tolerance),
            max_iterations:   env_parse("NETHEAT_MAX_ITERATIONS", def.max_iterations),
            max_step:         env_parse("NETHEAT_MAX_STEP",       def.max_step),
            correct_rank:     env_bool("NETHEAT_CORRECT_RANK",    def.correct_rank),
            input_attribute:  env_string("NETHEAT_INPUT_ATTRIBUTE",  def.input_attribute),
            output_prefix:    env_string("NETHEAT_OUTPUT_PREFIX",    def.output_prefix),
            service_endpoint: env_string("NETHEAT_SERVICE_ENDPOINT", def.service_endpoint),
        }
    }

    /// Name of the heat output attribute, e.g. `diffusion_output_heat`.
    pub fn heat_attribute(&self) -> String {
        format!("{}{}", self.output_prefix, DEFAULT_HEAT_SUFFIX)
    }

    /// Name of the rank output attribute, e.g. `diffusion_output_rank`.
    pub fn rank_attribute(&self) -> String {
        format!("{}{}", self.output_prefix, DEFAULT_RANK_SUFFIX)
    }

    /// Reject tunables the solver cannot work with.
    pub fn validate(&self) -> Result<(), HeatDiffusionError> {
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(HeatDiffusionError::InvalidParameter(format!(
                "time must be finite and >= 0, got {}",
                self.time
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(HeatDiffusionError::InvalidParameter(format!(
                "tolerance must lie in (0, 1), got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(HeatDiffusionError::InvalidParameter(
                "max_iterations must be > 0".into(),
            ));
        }
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            return Err(HeatDiffusionError::InvalidParameter(format!(
                "max_step must be finite and > 0, got {}",
                self.max_step
            )));
        }
        if self.output_prefix.is_empty() {
            return Err(HeatDiffusionError::InvalidParameter(
                "output_prefix cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
