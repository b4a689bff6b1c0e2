use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AllocationRow, RejectionRow, RunSummary, SectorAggregate, SimulationResult};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Allocated,
    Rejected,
    SectorImpact,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Allocated, Tab::Rejected, Tab::SectorImpact];

    pub fn label(self) -> &'static str {
        match self {
            Self::Allocated => "Allocated",
            Self::Rejected => "Rejected",
            Self::SectorImpact => "Sector Impact",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "allocated" | "alloc" | "allocations" => Some(Self::Allocated),
            "rejected" | "reject" | "rejections" => Some(Self::Rejected),
            "sectors" | "sector" | "sector-impact" | "impact" => Some(Self::SectorImpact),
            _ => None,
        }
    }
}

/// One run's results, owned wholesale. Replaced atomically on the next
/// successful run; tab selection is the only mutation and touches nothing
/// but the selector.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResultLedger {
    result: SimulationResult,
    active_tab: Tab,
    settled_at: DateTime<Utc>,
}

impl ResultLedger {
    pub fn new(result: SimulationResult) -> Self {
        Self {
            result,
            active_tab: Tab::Allocated,
            settled_at: Utc::now(),
        }
    }

    pub fn allocations(&self) -> &[AllocationRow] {
        &self.result.allocations
    }

    pub fn rejected(&self) -> &[RejectionRow] {
        &self.result.rejected
    }

    pub fn sector_stats(&self) -> &[SectorAggregate] {
        &self.result.sector_stats
    }

    pub fn summary(&self) -> &RunSummary {
        &self.result.summary
    }

    pub fn result(&self) -> &SimulationResult {
        &self.result
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn settled_at(&self) -> DateTime<Utc> {
        self.settled_at
    }
}
