//! Stateless terminal rendering. Given a lifecycle state and (when settled)
//! a ledger plus active tab, exactly one view is produced: loading, error
//! panel, pre-first-run placeholder, or the populated tabbed tables.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::console::RunState;
use crate::ledger::{ResultLedger, Tab};
use crate::model::{
    AllocationRow, EnterpriseDetail, EnterpriseRecord, RejectionRow, RunSummary, SectorAggregate,
    TrainingReport,
};
use crate::policy::PolicyControls;
use crate::series::{
    budget_series, format_inr, format_lakh, format_percent, jobs_series, score_band,
    score_display, ScoreBand,
};

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Low => Color::Red,
        ScoreBand::Moderate => Color::Yellow,
        ScoreBand::High => Color::Green,
    }
}

fn base_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

pub fn render_policy_panel(policy: &PolicyControls) -> String {
    format!(
        "Policy: budget {} | revenue weight {:.2} | employment weight {:.2}",
        format_inr(policy.budget()),
        policy.w_revenue(),
        policy.w_employment()
    )
}

/// The single lifecycle dispatch: one of four views, never a mix.
pub fn render_console_view(state: &RunState) -> String {
    match state {
        RunState::Idle => render_ready_placeholder(),
        RunState::Running => "Running knapsack allocation...".to_string(),
        RunState::Failed(message) => render_error_panel(message),
        RunState::Succeeded(ledger) => render_ledger(ledger),
    }
}

fn render_ready_placeholder() -> String {
    "Ready to simulate\n\
     Configure the policy weights and funding budget, then 'run' to allocate\n\
     subsidies across the enterprise dataset."
        .to_string()
}

pub fn render_error_panel(message: &str) -> String {
    format!(
        "Engine failure\n{message}\nThe policy controls remain editable; adjust and run again."
    )
}

pub fn render_ledger(ledger: &ResultLedger) -> String {
    let mut out = String::new();
    out.push_str(&render_summary(ledger.summary()));
    out.push('\n');
    out.push_str(&render_tab_bar(ledger.active_tab()));
    out.push('\n');
    let tab_view = match ledger.active_tab() {
        Tab::Allocated => render_allocations_tab(ledger.allocations()),
        Tab::Rejected => render_rejected_tab(ledger.rejected()),
        Tab::SectorImpact => render_sector_tab(ledger.sector_stats()),
    };
    out.push_str(&tab_view);
    out.push_str(&format!(
        "\nSettled at {}",
        ledger.settled_at().to_rfc3339()
    ));
    out
}

fn render_tab_bar(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut table = base_table(vec!["Funded", "Jobs Created", "Budget Spent"]);
    table.add_row(vec![
        summary.total_funded.to_string(),
        summary.total_jobs_created.to_string(),
        format_inr(summary.total_budget_spent),
    ]);
    let mut out = table.to_string();
    if summary.total_budget_initial > 0.0 {
        out.push_str(&format!(
            "\nBudget remaining: {} of {}",
            format_inr(summary.total_budget_remaining),
            format_inr(summary.total_budget_initial)
        ));
    }
    out
}

pub fn render_allocations_tab(rows: &[AllocationRow]) -> String {
    if rows.is_empty() {
        return "0 Approved\nBudget Too Low\n\
                No schemes fit within the allocated budget pool using these constraints."
            .to_string();
    }

    let mut table = base_table(vec![
        "MSME",
        "Target Scheme",
        "Sector",
        "Revenue Gain",
        "Jobs",
        "Impact Score",
        "Subsidy Cost",
        "Status",
    ]);
    for row in rows {
        let score = score_display(row.optimization_score);
        let sector = if row.sector.is_empty() {
            "-".to_string()
        } else {
            row.sector.clone()
        };
        table.add_row(Row::from(vec![
            Cell::new(&row.enterprise_id),
            Cell::new(&row.scheme_name),
            Cell::new(sector),
            Cell::new(format!("+{}", format_lakh(row.revenue_gain()))),
            Cell::new(format!("+{:.0}", row.jobs_created)),
            Cell::new(format!("{score:.2}")).fg(band_color(score_band(score))),
            Cell::new(format_inr(row.subsidy_cost)),
            Cell::new("PASS").fg(Color::Green),
        ]));
    }
    format!("{} Approved\n{table}", rows.len())
}

pub fn render_rejected_tab(rows: &[RejectionRow]) -> String {
    if rows.is_empty() {
        return "No rejected applicants in this payload.".to_string();
    }

    let mut table = base_table(vec!["MSME", "Best Scheme", "Impact Score", "Reason"]);
    for row in rows {
        let score = score_display(row.optimization_score);
        let reason = if row.reason.is_empty() {
            "-".to_string()
        } else {
            row.reason.clone()
        };
        table.add_row(Row::from(vec![
            Cell::new(&row.enterprise_id),
            Cell::new(&row.scheme_name),
            Cell::new(format!("{score:.2}")).fg(band_color(score_band(score))),
            Cell::new(reason),
        ]));
    }
    format!("{} Rejected\n{table}", rows.len())
}

pub fn render_sector_tab(stats: &[SectorAggregate]) -> String {
    if stats.is_empty() {
        return "No sector aggregates in this payload.".to_string();
    }

    let budget = budget_series(stats);
    let jobs = jobs_series(stats);
    let budget_total = budget.total();

    let mut table = base_table(vec![
        "Sector",
        "Funded",
        "Jobs Created",
        "Allocated Budget",
        "Budget Share",
    ]);
    for (idx, stat) in stats.iter().enumerate() {
        let share = if budget_total > 0.0 {
            budget.values[idx] / budget_total
        } else {
            0.0
        };
        table.add_row(vec![
            stat.sector.clone(),
            stat.funded_count.to_string(),
            format!("{:.0}", jobs.values[idx]),
            format_inr(budget.values[idx]),
            format_percent(share),
        ]);
    }
    table.to_string()
}

pub fn render_directory_table(records: &[EnterpriseRecord]) -> String {
    if records.is_empty() {
        return "No enterprises matched.".to_string();
    }

    let mut table = base_table(vec![
        "MSME ID",
        "Sector",
        "Revenue",
        "Predicted Category",
        "Growth Score",
    ]);
    for record in records {
        let band = score_band(record.growth_score);
        table.add_row(Row::from(vec![
            Cell::new(&record.enterprise_id),
            Cell::new(&record.sector),
            Cell::new(format_lakh(record.annual_revenue)),
            Cell::new(&record.predicted_category).fg(band_color(band)),
            Cell::new(format!("{:.1}", record.growth_score)).fg(band_color(band)),
        ]));
    }
    table.to_string()
}

pub fn render_detail(detail: &EnterpriseDetail) -> String {
    let band = score_band(detail.growth_score);
    let mut out = format!(
        "{}: growth prediction {:.1} / 100 ({})\n",
        detail.enterprise_id(),
        detail.growth_score,
        if detail.predicted_category.is_empty() {
            band.label()
        } else {
            detail.predicted_category.as_str()
        }
    );

    let mut profile = base_table(vec!["Field", "Value"]);
    for (key, value) in &detail.original_data {
        if key == "MSME_ID" {
            continue;
        }
        let display = match value {
            serde_json::Value::Number(n) => {
                if key == "Annual_Revenue" {
                    format_lakh(n.as_f64().unwrap_or(0.0))
                } else {
                    n.to_string()
                }
            }
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        profile.add_row(vec![key.replace('_', " "), display]);
    }
    out.push_str(&profile.to_string());

    let ranked = detail.ranked_features();
    if !ranked.is_empty() {
        let mut features = base_table(vec!["Predictive Factor", "Importance"]);
        for (name, importance) in ranked {
            features.add_row(vec![name.replace('_', " "), format_percent(importance)]);
        }
        out.push('\n');
        out.push_str(&features.to_string());
    }
    out
}

pub fn render_training_report(report: &TrainingReport) -> String {
    let mut out = format!("Model accuracy: {}\n", format_percent(report.accuracy));

    let ranked = report.ranked_features();
    if !ranked.is_empty() {
        let mut table = base_table(vec!["Feature", "Importance"]);
        for (name, importance) in ranked.into_iter().take(10) {
            table.add_row(vec![name.replace('_', " "), format_percent(importance)]);
        }
        out.push_str(&table.to_string());
        out.push('\n');
    }

    if report.confusion_matrix.len() == 3 {
        let labels = ["Low", "Moderate", "High"];
        let mut table = base_table(vec!["True \\ Predicted", "Low", "Moderate", "High"]);
        for (label, counts) in labels.iter().zip(&report.confusion_matrix) {
            let mut row = vec![label.to_string()];
            row.extend(counts.iter().map(u64::to_string));
            table.add_row(row);
        }
        out.push_str(&table.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::console::RunState;
    use crate::ledger::{ResultLedger, Tab};
    use crate::model::{RejectionRow, RunSummary, SectorAggregate, SimulationResult};

    use super::{
        render_allocations_tab, render_console_view, render_error_panel, render_ledger,
        render_rejected_tab, render_sector_tab,
    };

    #[test]
    fn empty_allocations_render_budget_too_low() {
        let view = render_allocations_tab(&[]);
        assert!(view.contains("Budget Too Low"));
        assert!(view.contains("0 Approved"));
    }

    #[test]
    fn missing_sections_render_empty_states() {
        assert!(render_rejected_tab(&[]).contains("No rejected applicants"));
        assert!(render_sector_tab(&[]).contains("No sector aggregates"));
    }

    #[test]
    fn error_state_renders_only_the_panel() {
        let view = render_console_view(&RunState::Failed("backend unreachable".to_string()));
        assert!(view.contains("Engine failure"));
        assert!(view.contains("backend unreachable"));
        assert!(!view.contains("Approved"));
    }

    #[test]
    fn idle_state_renders_the_placeholder() {
        let view = render_console_view(&RunState::Idle);
        assert!(view.contains("Ready to simulate"));
    }

    #[test]
    fn sector_tab_shows_budget_share() {
        let view = render_sector_tab(&[
            SectorAggregate {
                sector: "Manufacturing".to_string(),
                funded_count: 3,
                jobs_created: 40.0,
                allocated_budget: 750_000.0,
            },
            SectorAggregate {
                sector: "Services".to_string(),
                funded_count: 1,
                jobs_created: 5.0,
                allocated_budget: 250_000.0,
            },
        ]);
        assert!(view.contains("75.0%"));
        assert!(view.contains("25.0%"));
    }

    #[test]
    fn ledger_renders_the_active_tab() {
        let mut ledger = ResultLedger::new(SimulationResult {
            allocations: Vec::new(),
            rejected: vec![RejectionRow {
                enterprise_id: "MSME_0009".to_string(),
                scheme_name: "Export Booster".to_string(),
                optimization_score: 0.12,
                reason: "Budget exhausted".to_string(),
            }],
            sector_stats: Vec::new(),
            summary: RunSummary::default(),
        });
        ledger.select_tab(Tab::Rejected);
        let view = render_ledger(&ledger);
        assert!(view.contains("[Rejected]"));
        assert!(view.contains("Budget exhausted"));
        assert!(!view.contains("Budget Too Low"));
    }
}
