//! Gompertz tumor growth under treatment.
//!
//! The volume follows
//!
//! ```text
//! dV/dt = r·V·ln(K/V) − α·chemo·V − β·radio·V
//! ```
//!
//! integrated with fixed-step explicit Euler. The equation is singular for
//! `V ≤ 0` and degenerate for `K ≤ V0`, so inputs and every step are clamped:
//! the initial volume to at least [MIN_INITIAL_VOLUME], the carrying capacity
//! to at least [MIN_CAPACITY_RATIO] times the initial volume, and the volume
//! to at least [MIN_VOLUME] both before the log term and after each update.

use serde::{Deserialize, Serialize};

use crate::structs::parameters::GompertzParameters;

pub const MIN_INITIAL_VOLUME: f64 = 0.1;
pub const MIN_CAPACITY_RATIO: f64 = 1.1;
pub const MIN_VOLUME: f64 = 0.01;

pub const DEFAULT_HORIZON_MONTHS: f64 = 12.0;
pub const DEFAULT_DT: f64 = 0.01;

/// Outcome of a single simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Volume at the last step
    pub final_volume: f64,
    /// Volume at every step, starting with the clamped initial volume
    pub trajectory: Vec<f64>,
    /// Step size in months
    pub dt: f64,
}

/// Number of Euler steps covering `horizon_months`, never less than one
pub fn step_count(horizon_months: f64, dt: f64) -> usize {
    ((horizon_months / dt).round() as usize).max(1)
}

#[inline]
fn derivative(v: f64, k: f64, params: &GompertzParameters, chemo: f64, radio: f64) -> f64 {
    params.r * v * (k / v).ln() - params.alpha * chemo * v - params.beta * radio * v
}

/// Simulate the tumor volume over `horizon_months`.
///
/// `chemo_on` and `radio_on` switch the respective kill terms. The returned
/// trajectory has `horizon_months / dt` entries and its last entry is the
/// final volume.
pub fn simulate(
    initial_volume: f64,
    params: &GompertzParameters,
    chemo_on: bool,
    radio_on: bool,
    horizon_months: f64,
    dt: f64,
) -> SimulationResult {
    let v0 = initial_volume.max(MIN_INITIAL_VOLUME);
    let k = params.k.max(MIN_CAPACITY_RATIO * v0);
    if v0 != initial_volume || k != params.k {
        tracing::warn!(
            "Clamped simulator inputs: V0 {} -> {}, K {} -> {}",
            initial_volume,
            v0,
            params.k,
            k
        );
    }

    let chemo = if chemo_on { 1.0 } else { 0.0 };
    let radio = if radio_on { 1.0 } else { 0.0 };

    let steps = step_count(horizon_months, dt);
    let mut trajectory = Vec::with_capacity(steps);
    trajectory.push(v0);
    let mut v = v0;
    for _ in 1..steps {
        let current = v.max(MIN_VOLUME);
        let dv = derivative(current, k, params, chemo, radio);
        v = (current + dv * dt).max(MIN_VOLUME);
        trajectory.push(v);
    }

    SimulationResult {
        final_volume: v,
        trajectory,
        dt,
    }
}

/// [simulate] with the default 12 month horizon and 0.01 month step
pub fn simulate_default(
    initial_volume: f64,
    params: &GompertzParameters,
    chemo_on: bool,
    radio_on: bool,
) -> SimulationResult {
    simulate(
        initial_volume,
        params,
        chemo_on,
        radio_on,
        DEFAULT_HORIZON_MONTHS,
        DEFAULT_DT,
    )
}
