use super::{CourseId, PeriodId, SectionId, TeacherId};
use serde::{Deserialize, Serialize};

/// A concrete offering of a course taught by one teacher. `period_id` is
/// unset until the greedy constructor or MILP solve assigns one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub course_id: CourseId,
    pub teacher_id: Option<TeacherId>,
    pub period_id: Option<PeriodId>,
    pub capacity: u32,
    pub department: Option<String>,
    pub room: Option<String>,
}

impl Section {
    /// Panics if `capacity` is 0: every section must hold at least one
    /// seat (§4.1). CSV input carrying a literal zero is rejected earlier,
    /// at `parser::load_catalog_from_dir`, with a proper `Result` error —
    /// this assertion only guards misuse from code constructing a
    /// `Section` directly.
    pub fn new(id: SectionId, course_id: CourseId, capacity: u32) -> Self {
        assert!(capacity >= 1, "section '{id}' must have capacity >= 1, got {capacity}");
        Self {
            id,
            course_id,
            teacher_id: None,
            period_id: None,
            capacity,
            department: None,
            room: None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.period_id.is_some()
    }

    pub fn has_teacher(&self) -> bool {
        self.teacher_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_section_is_unscheduled() {
        let s = Section::new(SectionId("S001".into()), CourseId("MATH101".into()), 30);
        assert!(!s.is_scheduled());
        assert!(!s.has_teacher());
    }

    #[test]
    #[should_panic(expected = "capacity >= 1")]
    fn zero_capacity_panics() {
        Section::new(SectionId("S001".into()), CourseId("MATH101".into()), 0);
    }
}
