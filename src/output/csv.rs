use anyhow::Result;

use crate::model::{AllocationRow, EnterpriseRecord};

pub fn allocations_to_csv(rows: &[AllocationRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "enterprise_id",
        "scheme_name",
        "sector",
        "before_revenue",
        "after_revenue",
        "jobs_created",
        "optimization_score",
        "subsidy_cost",
    ])?;
    for row in rows {
        writer.write_record([
            row.enterprise_id.clone(),
            row.scheme_name.clone(),
            row.sector.clone(),
            format!("{:.2}", row.before_revenue),
            format!("{:.2}", row.after_revenue),
            format!("{:.0}", row.jobs_created),
            format!("{:.4}", row.optimization_score),
            format!("{:.2}", row.subsidy_cost),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn directory_to_csv(records: &[EnterpriseRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "enterprise_id",
        "sector",
        "annual_revenue",
        "predicted_category",
        "growth_score",
    ])?;
    for record in records {
        writer.write_record([
            record.enterprise_id.clone(),
            record.sector.clone(),
            format!("{:.2}", record.annual_revenue),
            record.predicted_category.clone(),
            format!("{:.1}", record.growth_score),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
