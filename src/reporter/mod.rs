//! Writes the two top-level JSON artifacts the driver leaves in
//! `output/final/` (§6, §7): `metrics.json` (timings and the degraded-path
//! trail) and `summary.json` (a compact, human- and dashboard-facing
//! recap). The four per-iteration CSVs are written by
//! `parser::write_reports`; this module only covers the run-level JSON.

use crate::error::Result;
use crate::utilization::UtilizationRow;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Timings and the degraded-path trail for one full driver run (§7).
/// Field names carry a `_ms` suffix in Rust (they hold milliseconds) but
/// serialize under the bare names (`greedy_time`, etc.) §7 specifies for
/// `metrics.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    pub iterations: usize,
    #[serde(rename = "greedy_time")]
    pub greedy_time_ms: u128,
    #[serde(rename = "milp_time")]
    pub milp_time_ms: u128,
    #[serde(rename = "oracle_time")]
    pub oracle_time_ms: u128,
    pub initial_utilization: f64,
    pub final_utilization: f64,
    pub sections_adjusted: usize,
    pub fallbacks: usize,
}

/// A compact recap of the final schedule, independent of the detailed
/// per-section CSVs.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub algorithm: String,
    pub iterations_run: usize,
    pub total_sections: usize,
    pub scheduled_sections: usize,
    pub total_students: usize,
    pub total_assignments: usize,
    pub missed_course_preferences: usize,
    pub average_utilization: f64,
    pub underutilized_sections: usize,
}

pub fn average_utilization(rows: &[UtilizationRow]) -> f64 {
    let scheduled: Vec<&UtilizationRow> = rows.iter().filter(|r| r.status != "unscheduled").collect();
    if scheduled.is_empty() {
        return 0.0;
    }
    scheduled.iter().map(|r| r.utilization).sum::<f64>() / scheduled.len() as f64
}

pub fn write_metrics(path: &Path, metrics: &Metrics) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(metrics)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, utilization: f64) -> UtilizationRow {
        UtilizationRow {
            section_id: "S001".to_string(),
            course_id: "MATH101".to_string(),
            capacity: 30,
            enrollment: (utilization * 30.0) as usize,
            utilization,
            status: status.to_string(),
        }
    }

    #[test]
    fn average_utilization_ignores_unscheduled_sections() {
        let rows = vec![row("good", 0.5), row("unscheduled", 0.0), row("high", 1.0)];
        assert_eq!(average_utilization(&rows), 0.75);
    }

    #[test]
    fn average_utilization_of_empty_is_zero() {
        assert_eq!(average_utilization(&[]), 0.0);
    }
}
