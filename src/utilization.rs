//! Per-section enrollment analysis: a pure function of a `Schedule` and the
//! catalog it was built from. No side effects, no mutation — the iteration
//! driver decides what to do with the result.

use crate::types::{PolicyConfig, Schedule, SectionId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationStatus {
    Low,
    Good,
    High,
    Unscheduled,
}

impl UtilizationStatus {
    fn as_str(&self) -> &'static str {
        match self {
            UtilizationStatus::Low => "low",
            UtilizationStatus::Good => "good",
            UtilizationStatus::High => "high",
            UtilizationStatus::Unscheduled => "unscheduled",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UtilizationRow {
    #[serde(rename = "Section ID")]
    pub section_id: String,
    #[serde(rename = "Course ID")]
    pub course_id: String,
    #[serde(rename = "Capacity")]
    pub capacity: u32,
    #[serde(rename = "Enrollment")]
    pub enrollment: usize,
    #[serde(rename = "Utilization")]
    pub utilization: f64,
    #[serde(rename = "Status")]
    pub status: String,
}

fn classify(utilization: f64, is_scheduled: bool) -> UtilizationStatus {
    if !is_scheduled {
        return UtilizationStatus::Unscheduled;
    }
    if utilization < 0.30 {
        UtilizationStatus::Low
    } else if utilization > 0.90 {
        UtilizationStatus::High
    } else {
        UtilizationStatus::Good
    }
}

/// One row per section in the schedule's catalog, in the schedule's
/// natural (id-ascending) order.
pub fn analyze(schedule: &Schedule) -> Vec<UtilizationRow> {
    schedule
        .sections
        .values()
        .map(|section| {
            let enrollment = schedule.enrollment(&section.id);
            let utilization = if section.capacity > 0 {
                enrollment as f64 / section.capacity as f64
            } else {
                0.0
            };
            let status = classify(utilization, section.is_scheduled());
            UtilizationRow {
                section_id: section.id.0.clone(),
                course_id: section.course_id.0.clone(),
                capacity: section.capacity,
                enrollment,
                utilization,
                status: status.as_str().to_string(),
            }
        })
        .collect()
}

/// Sections below the policy's utilization floor τ, restricted to sections
/// that actually got a period (an unscheduled section is a greedy/MILP
/// failure, not an underutilization problem the action applier can fix).
pub fn underutilized(schedule: &Schedule, policy: &PolicyConfig) -> Vec<SectionId> {
    schedule
        .sections
        .values()
        .filter(|section| section.is_scheduled())
        .filter(|section| {
            let enrollment = schedule.enrollment(&section.id);
            let utilization = if section.capacity > 0 {
                enrollment as f64 / section.capacity as f64
            } else {
                0.0
            };
            utilization < policy.utilization_floor
        })
        .map(|section| section.id.clone())
        .collect()
}
