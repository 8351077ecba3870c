//! Checks the §8 testable-property invariants against a produced
//! `Schedule`. Distinct from `parser::validate_catalog`, which checks
//! *input* referential integrity before any optimization runs — this
//! module checks what the greedy constructor or MILP solve *produced*,
//! and is used by both end-to-end tests and the driver's own sanity pass
//! after each iteration.

use crate::parser::Catalog;
use crate::types::{PeriodId, Schedule, SectionId, StudentId, TeacherId};
use std::collections::{HashMap, HashSet};

/// One invariant violation found in a `Schedule`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub detail: String,
}

/// Walks every invariant in §8 against `schedule` and the `catalog` it was
/// built from. An empty result means the schedule is feasible.
pub fn check_invariants(schedule: &Schedule, catalog: &Catalog) -> Vec<Violation> {
    let mut violations = Vec::new();

    let teacher_by_id: HashMap<&TeacherId, &crate::types::Teacher> =
        catalog.teachers.iter().map(|t| (&t.id, t)).collect();
    let period_by_id: HashMap<&PeriodId, &crate::types::Period> =
        catalog.periods.iter().map(|p| (&p.id, p)).collect();

    // Teacher unavailability.
    for section in schedule.sections.values() {
        let (Some(teacher_id), Some(period_id)) = (&section.teacher_id, &section.period_id) else {
            continue;
        };
        if let Some(teacher) = teacher_by_id.get(teacher_id) {
            if !teacher.is_available(period_id) {
                violations.push(Violation {
                    rule: "teacher_unavailable",
                    detail: format!(
                        "section '{}' scheduled into period '{period_id}' which teacher '{teacher_id}' is unavailable for",
                        section.id
                    ),
                });
            }
        }
    }

    // Teacher non-overlap.
    let mut teacher_periods: HashMap<(&TeacherId, &PeriodId), Vec<&SectionId>> = HashMap::new();
    for section in schedule.sections.values() {
        if let (Some(teacher_id), Some(period_id)) = (&section.teacher_id, &section.period_id) {
            teacher_periods
                .entry((teacher_id, period_id))
                .or_default()
                .push(&section.id);
        }
    }
    for ((teacher_id, period_id), sections) in &teacher_periods {
        if sections.len() > 1 {
            violations.push(Violation {
                rule: "teacher_overlap",
                detail: format!(
                    "teacher '{teacher_id}' has {} sections in period '{period_id}': {:?}",
                    sections.len(),
                    sections
                ),
            });
        }
    }

    // Student non-overlap per period.
    let mut student_periods: HashMap<(&StudentId, &PeriodId), Vec<&SectionId>> = HashMap::new();
    for assignment in &schedule.assignments {
        let Some(section) = schedule.section(&assignment.section_id) else {
            continue;
        };
        if let Some(period_id) = &section.period_id {
            student_periods
                .entry((&assignment.student_id, period_id))
                .or_default()
                .push(&section.id);
        }
    }
    for ((student_id, period_id), sections) in &student_periods {
        if sections.len() > 1 {
            violations.push(Violation {
                rule: "student_overlap",
                detail: format!(
                    "student '{student_id}' has {} assignments in period '{period_id}': {:?}",
                    sections.len(),
                    sections
                ),
            });
        }
    }

    // Every assignment's course is in the student's preferences and the
    // section is scheduled.
    let pref_by_student: HashMap<&StudentId, &crate::types::StudentPreference> =
        catalog.preferences.iter().map(|p| (&p.student_id, p)).collect();
    for assignment in &schedule.assignments {
        let Some(section) = schedule.section(&assignment.section_id) else {
            violations.push(Violation {
                rule: "dangling_assignment",
                detail: format!(
                    "assignment references unknown section '{}'",
                    assignment.section_id
                ),
            });
            continue;
        };
        if !section.is_scheduled() {
            violations.push(Violation {
                rule: "assignment_to_unscheduled_section",
                detail: format!(
                    "student '{}' assigned to unscheduled section '{}'",
                    assignment.student_id, section.id
                ),
            });
        }
        if let Some(pref) = pref_by_student.get(&assignment.student_id) {
            if !pref.wants(&section.course_id) {
                violations.push(Violation {
                    rule: "assignment_outside_preferences",
                    detail: format!(
                        "student '{}' assigned to course '{}' not in their preferences",
                        assignment.student_id, section.course_id
                    ),
                });
            }
        }
    }

    // Capacity (informational for MILP, since cap_over absorbs overshoot
    // there; still checked here as a hard ceiling for the greedy path).
    for section in schedule.sections.values() {
        let enrollment = schedule.enrollment(&section.id);
        if enrollment > section.capacity as usize {
            violations.push(Violation {
                rule: "capacity_exceeded",
                detail: format!(
                    "section '{}' has {enrollment} students over capacity {}",
                    section.id, section.capacity
                ),
            });
        }
    }

    // Restricted-course periods.
    for section in schedule.sections.values() {
        let Some(allowed) = catalog.policy.allowed_periods(&section.course_id) else {
            continue;
        };
        let Some(period_id) = &section.period_id else {
            continue;
        };
        let name_ok = period_by_id
            .get(period_id)
            .map(|p| allowed.contains(&p.name))
            .unwrap_or(false);
        if !name_ok {
            violations.push(Violation {
                rule: "restricted_period_violation",
                detail: format!(
                    "restricted course '{}' section '{}' scheduled into disallowed period '{period_id}'",
                    section.course_id, section.id
                ),
            });
        }
    }

    violations
}

/// One section per student per course: a student never holds two
/// assignments for the same course. Checked separately from
/// `check_invariants` since it's a property of `schedule.assignments`
/// alone, with no catalog context needed.
pub fn check_one_section_per_course(schedule: &Schedule) -> Vec<Violation> {
    let mut seen: HashMap<&StudentId, HashSet<&crate::types::CourseId>> = HashMap::new();
    let mut violations = Vec::new();
    for assignment in &schedule.assignments {
        let Some(section) = schedule.section(&assignment.section_id) else {
            continue;
        };
        let courses = seen.entry(&assignment.student_id).or_default();
        if !courses.insert(&section.course_id) {
            violations.push(Violation {
                rule: "duplicate_course_assignment",
                detail: format!(
                    "student '{}' has more than one assignment for course '{}'",
                    assignment.student_id, section.course_id
                ),
            });
        }
    }
    violations
}
