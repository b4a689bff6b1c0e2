use anyhow::{bail, Result};
use serde::Serialize;

pub const DEFAULT_BUDGET: f64 = 100_000_000.0;
pub const DEFAULT_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightAxis {
    Revenue,
    Employment,
}

/// Parameter snapshot frozen at the moment a run is triggered.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SimulationRequest {
    pub budget: f64,
    pub w_revenue: f64,
    pub w_employment: f64,
}

/// The two complementary policy weights plus the budget ceiling.
///
/// The weights always sum to one: editing one axis derives the other, and
/// both are rounded to two decimals before storage so repeated edits do not
/// accumulate floating drift. The budget accepts whatever the operator
/// typed, including transiently invalid values; validation happens when the
/// snapshot is taken, not at edit time.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyControls {
    w_revenue: f64,
    w_employment: f64,
    budget: f64,
}

impl Default for PolicyControls {
    fn default() -> Self {
        Self {
            w_revenue: DEFAULT_WEIGHT,
            w_employment: 1.0 - DEFAULT_WEIGHT,
            budget: DEFAULT_BUDGET,
        }
    }
}

impl PolicyControls {
    pub fn new(budget: f64, w_revenue: f64) -> Self {
        let mut controls = Self::default();
        controls.set_budget(budget);
        controls.set_weight(WeightAxis::Revenue, w_revenue);
        controls
    }

    pub fn set_weight(&mut self, axis: WeightAxis, value: f64) {
        let value = round2(value.clamp(0.0, 1.0));
        let other = round2(1.0 - value);
        match axis {
            WeightAxis::Revenue => {
                self.w_revenue = value;
                self.w_employment = other;
            }
            WeightAxis::Employment => {
                self.w_employment = value;
                self.w_revenue = other;
            }
        }
    }

    pub fn set_budget(&mut self, value: f64) {
        self.budget = value;
    }

    pub fn w_revenue(&self) -> f64 {
        self.w_revenue
    }

    pub fn w_employment(&self) -> f64 {
        self.w_employment
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Submission-time validation. Edits never fail; this does.
    pub fn snapshot(&self) -> Result<SimulationRequest> {
        if !self.budget.is_finite() {
            bail!("budget must be a finite amount");
        }
        if self.budget < 0.0 {
            bail!("budget must be non-negative, got {}", self.budget);
        }
        Ok(SimulationRequest {
            budget: self.budget,
            w_revenue: self.w_revenue,
            w_employment: self.w_employment,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{PolicyControls, WeightAxis};

    #[test]
    fn weights_sum_to_one_for_any_edit() {
        let mut controls = PolicyControls::default();
        for step in 0..=100 {
            let value = f64::from(step) / 100.0;
            controls.set_weight(WeightAxis::Revenue, value);
            assert!((controls.w_revenue() + controls.w_employment() - 1.0).abs() < 1e-9);
            controls.set_weight(WeightAxis::Employment, value);
            assert!((controls.w_revenue() + controls.w_employment() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn opposite_axis_is_derived() {
        let mut controls = PolicyControls::default();
        controls.set_weight(WeightAxis::Revenue, 0.7);
        assert!((controls.w_revenue() - 0.7).abs() < 1e-9);
        assert!((controls.w_employment() - 0.3).abs() < 1e-9);

        controls.set_weight(WeightAxis::Employment, 0.25);
        assert!((controls.w_employment() - 0.25).abs() < 1e-9);
        assert!((controls.w_revenue() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn edits_round_to_two_decimals() {
        let mut controls = PolicyControls::default();
        controls.set_weight(WeightAxis::Revenue, 0.333_333);
        assert!((controls.w_revenue() - 0.33).abs() < 1e-9);
        assert!((controls.w_employment() - 0.67).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_edits_clamp() {
        let mut controls = PolicyControls::default();
        controls.set_weight(WeightAxis::Revenue, 1.8);
        assert!((controls.w_revenue() - 1.0).abs() < 1e-9);
        assert!((controls.w_employment()).abs() < 1e-9);

        controls.set_weight(WeightAxis::Revenue, -0.4);
        assert!(controls.w_revenue().abs() < 1e-9);
        assert!((controls.w_employment() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn budget_validation_is_deferred_to_snapshot() {
        let mut controls = PolicyControls::default();
        controls.set_budget(-5_000.0);
        assert!((controls.budget() + 5_000.0).abs() < 1e-9);
        assert!(controls.snapshot().is_err());

        controls.set_budget(f64::NAN);
        assert!(controls.snapshot().is_err());

        controls.set_budget(50_000_000.0);
        let request = controls.snapshot().expect("valid budget must snapshot");
        assert!((request.budget - 50_000_000.0).abs() < 1e-9);
        assert!((request.w_revenue + request.w_employment - 1.0).abs() < 1e-9);
    }
}
