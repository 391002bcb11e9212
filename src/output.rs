use crate::cli::OutputFormat;
use anyhow::Result;
use fertiplan::models::{FertilizationPlan, LimingPlan, PlanWarning, ScheduleEntry, Tier};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
pub struct TierReport {
    pub parcel: String,
    pub tier: Tier,
    pub plan_type: String,
    pub description: String,
}

impl TierReport {
    pub fn new(parcel: &str, tier: Tier) -> Self {
        Self {
            parcel: parcel.to_string(),
            tier,
            plan_type: tier.plan_type().as_str().to_string(),
            description: tier.description().to_string(),
        }
    }
}

/// JSON and YAML dump the whole record; CSV writes the flat rows.
fn write_structured<W, T, R>(out: &mut W, value: &T, rows: &[R], format: OutputFormat) -> Result<bool>
where
    W: Write,
    T: Serialize,
    R: Serialize,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => {
            write!(out, "{}", serde_yaml::to_string(value)?)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => return Ok(false),
    }
    Ok(true)
}

fn write_warnings<W: Write>(out: &mut W, warnings: &[PlanWarning]) -> Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Warnings")?;
    for w in warnings {
        writeln!(out, "  {} [{}] {}", w.severity.symbol(), w.key, w.message)?;
        if let Some(rec) = &w.recommendation {
            writeln!(out, "      -> {}", rec)?;
        }
    }
    Ok(())
}

pub fn liming<W: Write>(out: &mut W, plan: &LimingPlan, format: OutputFormat) -> Result<()> {
    if write_structured(out, plan, &plan.rows(), format)? {
        return Ok(());
    }

    writeln!(
        out,
        "Liming plan: pH {:.2} -> {:.2} ({}, {}, {} lime)",
        plan.current_ph,
        plan.target_ph,
        plan.texture,
        plan.land_use,
        plan.lime_type
    )?;
    writeln!(
        out,
        "Need: {:.0} kg CaO/ha ({:.0} kg for {:.2} ha), max {:.0} kg CaO/ha per application",
        plan.total_cao_need_per_ha, plan.total_cao_need, plan.area_ha, plan.max_dose_per_ha
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<6} {:<14} {:<24} {:>10} {:>10} {:>7} {:>7}",
        "Year", "Entry", "Product", "CaO kg/ha", "Prod kg/ha", "pH from", "pH to"
    )?;
    for entry in plan.timeline() {
        match entry {
            ScheduleEntry::Application(a) => writeln!(
                out,
                "{:<6} {:<14} {:<24} {:>10.0} {:>10.0} {:>7.2} {:>7.2}",
                a.year,
                format!("{} #{}", a.season, a.sequence),
                a.product.as_deref().unwrap_or("-"),
                a.dose_per_ha,
                a.product_dose_per_ha,
                a.ph_before,
                a.ph_after
            )?,
            ScheduleEntry::Acidification(s) => writeln!(
                out,
                "{:<6} {:<14} {:<24} {:>10} {:>10} {:>7.2} {:>7.2}",
                s.year, "drift", "", "", "", s.ph_start, s.ph_end
            )?,
        }
    }
    if plan.liming_required {
        writeln!(
            out,
            "Scheduled: {:.0} kg CaO/ha in {} applications",
            plan.scheduled_cao_per_ha(),
            plan.applications.len()
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Projected pH {:.2}; maintenance {:.0} kg CaO/ha per interval",
        plan.final_projected_ph, plan.maintenance_cao_per_ha
    )?;
    write_warnings(out, &plan.warnings)
}

pub fn fertilization<W: Write>(out: &mut W, plan: &FertilizationPlan, format: OutputFormat) -> Result<()> {
    if write_structured(out, plan, &plan.rows(), format)? {
        return Ok(());
    }

    writeln!(
        out,
        "Fertilization plan {} (Tier {}, {}), yield factor {:.2}",
        plan.target_year, plan.tier, plan.plan_type, plan.yield_factor
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<6} {:<6} {:<12} {:>10} {:>10}",
        "Year", "", "Category", "kg/ha", "kg total"
    )?;
    for row in plan.rows() {
        writeln!(
            out,
            "{:<6} {:<6} {:<12} {:>10.1} {:>10.1}",
            row.year,
            row.nutrient,
            row.category.as_deref().unwrap_or("estimated"),
            row.dose_kg_ha,
            row.total_kg
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Cost: {:.0} {}/ha, {:.0} {} total",
        plan.cost.per_ha, plan.cost.currency, plan.cost.total, plan.cost.currency
    )?;
    for note in &plan.notes {
        writeln!(out, "  * {}", note)?;
    }
    write_warnings(out, &plan.warnings)
}

pub fn tier<W: Write>(out: &mut W, report: &TierReport, format: OutputFormat) -> Result<()> {
    if write_structured(out, report, std::slice::from_ref(report), format)? {
        return Ok(());
    }
    writeln!(
        out,
        "{}: Tier {} ({} plan, {})",
        report.parcel, report.tier, report.plan_type, report.description
    )?;
    Ok(())
}
