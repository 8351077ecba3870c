use crate::types::{CourseId, Schedule, Section, Student, StudentPreference};

/// Courses that make a student's hardness score jump regardless of their
/// other preferences (mirrors the restricted-course bump on the section side).
const HARD_COURSES: [&str; 2] = ["Medical Career", "Heroes Teach"];

/// Three "special" courses placed before any other preference in Pass A,
/// in this fixed order.
pub const SPECIAL_COURSES: [&str; 3] = ["Medical Career", "Heroes Teach", "Sports Med"];

/// Higher-hardness students are assigned first: they have the fewest
/// feasible options left once the easier students have claimed seats.
pub fn student_hardness(student: &Student, pref: Option<&StudentPreference>) -> f64 {
    let mut score = 1.0;

    if student.has_special_needs {
        score *= 2.0;
    }

    if let Some(pref) = pref {
        if pref
            .preferred_courses
            .iter()
            .any(|c| HARD_COURSES.contains(&c.0.as_str()))
        {
            score *= 1.5;
        }
        score *= 1.0 + 0.1 * pref.preferred_courses.len() as f64;
        score *= 1.0 + 0.2 * pref.required_courses.len() as f64;
    }

    score
}

/// 0.0 means placing `student` into `section` is infeasible; a positive
/// value ranks candidate sections for the same course against each other.
pub fn student_section_score(
    schedule: &Schedule,
    student: &Student,
    pref: &StudentPreference,
    course_id: &CourseId,
    section: &Section,
    sped_already_placed: usize,
    non_full_sections_of_course: usize,
) -> f64 {
    if !section.is_scheduled() {
        return 0.0;
    }
    if !pref.wants(course_id) {
        return 0.0;
    }
    if schedule
        .student_sections(&student.id)
        .iter()
        .any(|s| &s.course_id == course_id)
    {
        return 0.0;
    }
    if schedule.is_full(&section.id) {
        return 0.0;
    }
    let section_period = section.period_id.as_ref().expect("checked is_scheduled above");
    let clashes = schedule
        .student_sections(&student.id)
        .iter()
        .any(|s| s.period_id.as_ref() == Some(section_period));
    if clashes {
        return 0.0;
    }

    let enrollment = schedule.enrollment(&section.id) as f64;
    let fill_ratio = if section.capacity > 0 {
        enrollment / section.capacity as f64
    } else {
        1.0
    };

    let mut score = 1.0;
    score *= 1.1 - fill_ratio;
    if sped_already_placed >= 2 {
        score *= 0.5_f64.powi(sped_already_placed as i32 - 1);
    }
    if pref.is_required(course_id) {
        score *= 2.0;
    }
    if non_full_sections_of_course <= 2 {
        score *= 2.0;
    }
    score
}

/// Count of sections of `course_id` that are scheduled and not yet full —
/// feeds the "scarcity" multiplier in `student_section_score`.
pub fn non_full_sections_of_course(schedule: &Schedule, course_id: &CourseId) -> usize {
    schedule
        .sections_for_course(course_id)
        .into_iter()
        .filter(|s| s.is_scheduled() && !schedule.is_full(&s.id))
        .count()
}
