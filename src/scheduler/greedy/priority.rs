use crate::types::{CourseId, Period, PolicyConfig, Section, Teacher, TeacherId};
use std::collections::HashMap;

/// Higher-scoring sections are placed into a period earlier in the sweep.
pub fn section_priority(
    section: &Section,
    teacher: Option<&Teacher>,
    sections_per_course: &HashMap<CourseId, usize>,
    sections_per_teacher: &HashMap<TeacherId, usize>,
    demand_per_course: &HashMap<CourseId, usize>,
    policy: &PolicyConfig,
) -> f64 {
    let mut score = 1.0;

    if policy.is_restricted(&section.course_id) {
        score *= 5.0;
    }
    if section.course_id.0 == "Sports Med" {
        score *= 3.0;
    }
    if let Some(teacher) = teacher {
        score *= 1.0 + 0.1 * teacher.unavailable_periods.len() as f64;
        let taught = sections_per_teacher.get(&teacher.id).copied().unwrap_or(0);
        score *= 1.0 + 0.2 * taught as f64;
    }

    let course_sections = sections_per_course
        .get(&section.course_id)
        .copied()
        .unwrap_or(1)
        .max(1);
    score *= 1.0 + 1.0 / course_sections as f64;

    let demand = demand_per_course
        .get(&section.course_id)
        .copied()
        .unwrap_or(0);
    score *= 1.0 + 0.001 * demand as f64;

    score
}

/// Score for placing `section` into `period`; 0.0 means the placement is
/// forbidden outright (a hard constraint would be violated).
#[allow(clippy::too_many_arguments)]
pub fn period_score(
    section: &Section,
    period: &Period,
    teacher: Option<&Teacher>,
    teacher_already_scheduled_here: bool,
    policy: &PolicyConfig,
    course_unused_in_period: bool,
    sports_med_already_here: bool,
    sections_of_course_here: usize,
    sections_total_here: usize,
) -> f64 {
    if let Some(allowed) = policy.allowed_periods(&section.course_id) {
        if !allowed.contains(&period.name) {
            return 0.0;
        }
    }
    if let Some(teacher) = teacher {
        if !teacher.is_available(&period.id) {
            return 0.0;
        }
    }
    if teacher_already_scheduled_here {
        return 0.0;
    }

    let mut score = 1.0;
    if policy.is_restricted(&section.course_id) && course_unused_in_period {
        score *= 2.0;
    }
    if sports_med_already_here {
        score *= 0.5;
    }
    score /= 1.0 + 0.5 * sections_of_course_here as f64;
    score /= 1.0 + 0.1 * sections_total_here as f64;
    score
}
