//! Demand-driven deployment planning.
//!
//! Given the installed capacity of the existing fleet and a demand curve,
//! schedules builds of one new prototype to cover the shortfall month by
//! month.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use cyclusgen_shared::{CyclusGenError, FleetUnit, Result};

use crate::region::DeploymentEntry;

/// Power demand as a function of the timestep (months from start).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandCurve {
    Constant { mwe: f64 },
    Linear { base_mwe: f64, slope_mwe_per_month: f64 },
    /// Compound growth, `annual_growth` as a fraction (0.01 = 1 %/yr).
    Exponential { base_mwe: f64, annual_growth: f64 },
}

impl DemandCurve {
    /// Demand at timestep `t`, MWe.
    pub fn at(&self, t: usize) -> f64 {
        let t = t as f64;
        match *self {
            Self::Constant { mwe } => mwe,
            Self::Linear {
                base_mwe,
                slope_mwe_per_month,
            } => base_mwe + slope_mwe_per_month * t,
            Self::Exponential {
                base_mwe,
                annual_growth,
            } => base_mwe * (1.0 + annual_growth).powf(t / 12.0),
        }
    }
}

/// The prototype deployed to meet demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUnit {
    pub prototype: String,
    pub power_mwe: f64,
    /// Months each build operates.
    pub lifetime: u32,
    /// First timestep a new design may be built, or the first timestep a
    /// legacy design may no longer be built.
    pub available_from: usize,
    /// `true` for a design that becomes available, `false` for one being
    /// phased out.
    pub new_design: bool,
}

impl NewUnit {
    fn buildable_at(&self, t: usize) -> bool {
        if self.new_design {
            t >= self.available_from
        } else {
            t < self.available_from
        }
    }
}

/// Result of [`plan_deployment`], one slot per timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentPlan {
    pub builds: Vec<u32>,
    pub deployed_mwe: Vec<f64>,
}

impl DeploymentPlan {
    pub fn total_builds(&self) -> u32 {
        self.builds.iter().sum()
    }

    /// Nonzero build steps as a deployment schedule.
    pub fn schedule(&self, unit: &NewUnit) -> Vec<DeploymentEntry> {
        self.builds
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(t, n)| DeploymentEntry {
                prototype: unit.prototype.clone(),
                entry_time: t as i32,
                number: *n,
                lifetime: unit.lifetime as i32,
            })
            .collect()
    }
}

/// Installed capacity per timestep over `horizon` months.
///
/// A deployed unit contributes its net capacity from its entry time for
/// `lifetime` months, clipped to the horizon.
pub fn capacity_series(units: &[FleetUnit], horizon: usize) -> Vec<f64> {
    let mut series = vec![0.0; horizon];
    for unit in units.iter().filter(|u| u.lifecycle.is_deployed()) {
        let from = unit.lifecycle.entry_time.max(0) as usize;
        let to = (from + unit.lifecycle.lifetime as usize).min(horizon);
        for slot in series.iter_mut().take(to).skip(from) {
            *slot += unit.record.net_capacity_mwe;
        }
    }
    series
}

/// Schedule builds of `unit` so installed capacity tracks `demand`.
///
/// Timestep 0 is never built on. At each later step where the shortfall
/// exceeds one unit's power, `floor(shortfall / power)` units are built if
/// the design is buildable then; they cover `[t, t + lifetime)` within the
/// horizon and reduce the shortfall of every step they cover.
#[instrument(skip_all, fields(prototype = %unit.prototype, horizon = existing.len()))]
pub fn plan_deployment(existing: &[f64], demand: &DemandCurve, unit: &NewUnit) -> Result<DeploymentPlan> {
    if !(unit.power_mwe > 0.0) {
        return Err(CyclusGenError::config(format!(
            "new unit power must be positive, got {}",
            unit.power_mwe
        )));
    }
    if unit.lifetime == 0 {
        return Err(CyclusGenError::config("new unit lifetime must be at least one month"));
    }

    let horizon = existing.len();
    let mut lack: Vec<f64> = existing
        .iter()
        .enumerate()
        .map(|(t, installed)| demand.at(t) - installed)
        .collect();
    let mut builds = vec![0u32; horizon];
    let mut deployed_mwe = vec![0.0; horizon];

    for t in 1..horizon {
        if lack[t] <= unit.power_mwe || !unit.buildable_at(t) {
            continue;
        }
        let count = (lack[t] / unit.power_mwe).floor();
        let added = count * unit.power_mwe;
        builds[t] = count as u32;

        let end = (t + unit.lifetime as usize).min(horizon);
        for i in t..end {
            lack[i] -= added;
            deployed_mwe[i] += added;
        }
        debug!(t, count = builds[t], "builds scheduled");
    }

    let plan = DeploymentPlan {
        builds,
        deployed_mwe,
    };
    info!(total_builds = plan.total_builds(), "deployment planned");
    Ok(plan)
}
