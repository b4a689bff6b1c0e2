//! Wire types for the optimization backend.
//!
//! The response schema is canonical v1: `allocations`, `rejected`,
//! `sector_stats`, `summary`. Field spellings from older backend builds
//! (`non_selected`, `sector_summary`, `Projected_After_Revenue`,
//! `Subsidy_Cap`) are accepted as deserialization aliases only; there is a
//! single decode path and no presence-branching at runtime. Sections a
//! backend omits deserialize to empty collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    #[serde(default)]
    pub allocations: Vec<AllocationRow>,
    #[serde(default, alias = "non_selected")]
    pub rejected: Vec<RejectionRow>,
    #[serde(default, alias = "sector_summary")]
    pub sector_stats: Vec<SectorAggregate>,
    #[serde(default)]
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRow {
    #[serde(rename = "MSME_ID")]
    pub enterprise_id: String,
    #[serde(rename = "Scheme_Name")]
    pub scheme_name: String,
    #[serde(rename = "Before_Revenue", default)]
    pub before_revenue: f64,
    #[serde(rename = "After_Revenue", alias = "Projected_After_Revenue", default)]
    pub after_revenue: f64,
    #[serde(rename = "Jobs_Created", alias = "Impact_Factor_Employment", default)]
    pub jobs_created: f64,
    #[serde(rename = "Optimization_Score", default)]
    pub optimization_score: f64,
    #[serde(rename = "Subsidy_Cost", alias = "Subsidy_Cap", default)]
    pub subsidy_cost: f64,
    #[serde(rename = "Sector", default)]
    pub sector: String,
}

impl AllocationRow {
    pub fn revenue_gain(&self) -> f64 {
        self.after_revenue - self.before_revenue
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectionRow {
    #[serde(rename = "MSME_ID")]
    pub enterprise_id: String,
    #[serde(rename = "Scheme_Name", alias = "Target_Scheme", default)]
    pub scheme_name: String,
    #[serde(rename = "Optimization_Score", default)]
    pub optimization_score: f64,
    /// Free text from the backend, not a closed set.
    #[serde(rename = "Reason", default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorAggregate {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Funded_Count", alias = "MSMEs_Funded", default)]
    pub funded_count: u64,
    #[serde(rename = "Jobs_Created", default)]
    pub jobs_created: f64,
    #[serde(rename = "Allocated_Budget", default)]
    pub allocated_budget: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    #[serde(rename = "Total_MSMEs_Funded", default)]
    pub total_funded: u64,
    #[serde(rename = "Total_Projected_Jobs_Created", default)]
    pub total_jobs_created: u64,
    #[serde(rename = "Total_Budget_Spent", default)]
    pub total_budget_spent: f64,
    #[serde(rename = "Total_Budget_Initial", default)]
    pub total_budget_initial: f64,
    #[serde(rename = "Total_Budget_Remaining", default)]
    pub total_budget_remaining: f64,
}

/// One row of the enterprise directory (`GET /msmes`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnterpriseRecord {
    #[serde(rename = "MSME_ID")]
    pub enterprise_id: String,
    #[serde(rename = "Sector", default)]
    pub sector: String,
    #[serde(rename = "Annual_Revenue", default)]
    pub annual_revenue: f64,
    #[serde(rename = "Predicted_Growth_Category", default)]
    pub predicted_category: String,
    #[serde(rename = "Growth_Score", default)]
    pub growth_score: f64,
}

impl EnterpriseRecord {
    /// Case-insensitive substring match over id and sector.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.enterprise_id.to_lowercase().contains(&needle)
            || self.sector.to_lowercase().contains(&needle)
    }
}

/// Detail view for one enterprise (`GET /msme/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnterpriseDetail {
    #[serde(default)]
    pub original_data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub predicted_category: String,
    #[serde(default)]
    pub growth_score: f64,
    #[serde(default)]
    pub top_important_features: BTreeMap<String, f64>,
}

impl EnterpriseDetail {
    pub fn enterprise_id(&self) -> &str {
        self.original_data
            .get("MSME_ID")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }

    /// Feature importances sorted by weight, heaviest first.
    pub fn ranked_features(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .top_important_features
            .iter()
            .map(|(name, importance)| (name.as_str(), *importance))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Model evaluation metrics (`GET /train`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingReport {
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub feature_importance: BTreeMap<String, f64>,
    /// 3x3 matrix over the Low/Moderate/High growth categories.
    #[serde(default)]
    pub confusion_matrix: Vec<Vec<u64>>,
}

impl TrainingReport {
    pub fn ranked_features(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .feature_importance
            .iter()
            .map(|(name, importance)| (name.as_str(), *importance))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EnterpriseRecord, SimulationResult};

    #[test]
    fn decodes_canonical_payload() {
        let payload = json!({
            "allocations": [
                {
                    "MSME_ID": "MSME_0042",
                    "Scheme_Name": "Tech Upgradation Grant",
                    "Before_Revenue": 4_500_000.0,
                    "After_Revenue": 5_400_000.0,
                    "Jobs_Created": 12,
                    "Optimization_Score": 0.83,
                    "Subsidy_Cost": 250_000.0,
                    "Sector": "Manufacturing"
                }
            ],
            "rejected": [
                {
                    "MSME_ID": "MSME_0091",
                    "Scheme_Name": "Export Booster",
                    "Optimization_Score": 0.22,
                    "Reason": "Budget exhausted before reaching this applicant"
                }
            ],
            "sector_stats": [
                {
                    "Sector": "Manufacturing",
                    "Funded_Count": 1,
                    "Jobs_Created": 12,
                    "Allocated_Budget": 250_000.0
                }
            ],
            "summary": {
                "Total_MSMEs_Funded": 1,
                "Total_Projected_Jobs_Created": 12,
                "Total_Budget_Spent": 250_000.0,
                "Total_Budget_Initial": 1_000_000.0,
                "Total_Budget_Remaining": 750_000.0
            }
        });

        let result: SimulationResult =
            serde_json::from_value(payload).expect("canonical payload must decode");
        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].enterprise_id, "MSME_0042");
        assert!((result.allocations[0].revenue_gain() - 900_000.0).abs() < 1e-6);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.sector_stats[0].funded_count, 1);
        assert_eq!(result.summary.total_funded, 1);
    }

    #[test]
    fn decodes_legacy_aliases() {
        let payload = json!({
            "allocations": [
                {
                    "MSME_ID": "MSME_0007",
                    "Scheme_Name": "Rural Credit Support",
                    "Before_Revenue": 1_200_000.0,
                    "Projected_After_Revenue": 1_500_000.0,
                    "Impact_Factor_Employment": 4,
                    "Optimization_Score": 0.61,
                    "Subsidy_Cap": 90_000.0
                }
            ],
            "non_selected": [
                {
                    "MSME_ID": "MSME_0008",
                    "Target_Scheme": "Rural Credit Support",
                    "Optimization_Score": 0.18,
                    "Reason": "Per-cost score below cutoff"
                }
            ],
            "sector_summary": [
                {
                    "Sector": "Services",
                    "MSMEs_Funded": 1,
                    "Jobs_Created": 4,
                    "Allocated_Budget": 90_000.0
                }
            ],
            "summary": {
                "Total_MSMEs_Funded": 1,
                "Total_Projected_Jobs_Created": 4,
                "Total_Budget_Spent": 90_000.0
            }
        });

        let result: SimulationResult =
            serde_json::from_value(payload).expect("legacy payload must decode");
        assert!((result.allocations[0].after_revenue - 1_500_000.0).abs() < 1e-6);
        assert!((result.allocations[0].subsidy_cost - 90_000.0).abs() < 1e-6);
        assert_eq!(result.allocations[0].sector, "");
        assert_eq!(result.rejected[0].scheme_name, "Rural Credit Support");
        assert_eq!(result.sector_stats[0].funded_count, 1);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let payload = json!({
            "allocations": [],
            "summary": {
                "Total_MSMEs_Funded": 0,
                "Total_Projected_Jobs_Created": 0,
                "Total_Budget_Spent": 0
            }
        });

        let result: SimulationResult =
            serde_json::from_value(payload).expect("sparse payload must decode");
        assert!(result.allocations.is_empty());
        assert!(result.rejected.is_empty());
        assert!(result.sector_stats.is_empty());
        assert_eq!(result.summary.total_funded, 0);
    }

    #[test]
    fn directory_search_matches_id_and_sector() {
        let record: EnterpriseRecord = serde_json::from_value(json!({
            "MSME_ID": "MSME_0042",
            "Sector": "Food Processing",
            "Annual_Revenue": 2_000_000.0,
            "Predicted_Growth_Category": "High",
            "Growth_Score": 81.5
        }))
        .expect("record must decode");

        assert!(record.matches("0042"));
        assert!(record.matches("food"));
        assert!(record.matches("PROCESSING"));
        assert!(!record.matches("textile"));
    }
}
