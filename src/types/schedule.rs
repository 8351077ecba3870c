use super::{Assignment, CourseId, Section, SectionId, StudentId, UnassignedCourse};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Provenance and summary metadata; reporting-only, never read by an
/// optimizer or validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub generated_at: String,
    pub algorithm: String,
    pub score: f64,
    pub solve_time_ms: u64,
}

impl Default for ScheduleMetadata {
    fn default() -> Self {
        Self {
            generated_at: String::new(),
            algorithm: String::new(),
            score: 0.0,
            solve_time_ms: 0,
        }
    }
}

/// The complete generated schedule: a section catalog plus the set of
/// student-section placements over it.
///
/// `sections` is a `BTreeMap` and `assignments` a `BTreeSet` rather than
/// `Vec`s so that iterating either is always id-ascending without a sort
/// step — this is what makes the greedy constructor's output bit-identical
/// for identical inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub sections: BTreeMap<SectionId, Section>,
    pub assignments: BTreeSet<Assignment>,
    pub unassigned: Vec<UnassignedCourse>,
    pub metadata: ScheduleMetadata,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            sections: BTreeMap::new(),
            assignments: BTreeSet::new(),
            unassigned: Vec::new(),
            metadata: ScheduleMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                algorithm: String::new(),
                score: 0.0,
                solve_time_ms: 0,
            },
        }
    }

    /// Build an empty schedule seeded from a catalog (sections, no period
    /// assignments yet). Used as the starting point for both optimizers.
    pub fn from_catalog(sections: impl IntoIterator<Item = Section>) -> Self {
        let mut schedule = Self::new();
        for section in sections {
            schedule.sections.insert(section.id.clone(), section);
        }
        schedule
    }

    pub fn section(&self, section_id: &SectionId) -> Option<&Section> {
        self.sections.get(section_id)
    }

    pub fn section_mut(&mut self, section_id: &SectionId) -> Option<&mut Section> {
        self.sections.get_mut(section_id)
    }

    pub fn sections_for_course(&self, course_id: &CourseId) -> Vec<&Section> {
        self.sections
            .values()
            .filter(|s| &s.course_id == course_id)
            .collect()
    }

    /// Enrollment count for a section; O(|assignments|), recomputed rather
    /// than cached so it can never drift from `assignments`.
    pub fn enrollment(&self, section_id: &SectionId) -> usize {
        self.assignments
            .iter()
            .filter(|a| &a.section_id == section_id)
            .count()
    }

    pub fn is_full(&self, section_id: &SectionId) -> bool {
        match self.sections.get(section_id) {
            Some(section) => self.enrollment(section_id) >= section.capacity as usize,
            None => false,
        }
    }

    pub fn assignments_for_student(&self, student_id: &StudentId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| &a.student_id == student_id)
            .collect()
    }

    pub fn assignments_for_section(&self, section_id: &SectionId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| &a.section_id == section_id)
            .collect()
    }

    pub fn student_sections(&self, student_id: &StudentId) -> Vec<&Section> {
        self.assignments_for_student(student_id)
            .into_iter()
            .filter_map(|a| self.sections.get(&a.section_id))
            .collect()
    }

    pub fn has_student(&self, section_id: &SectionId, student_id: &StudentId) -> bool {
        self.assignments.contains(&Assignment {
            student_id: student_id.clone(),
            section_id: section_id.clone(),
        })
    }

    /// Assign a student to a section. Does not check capacity or
    /// feasibility; callers (greedy, MILP extraction, action applier) are
    /// responsible for only calling this when it is legal.
    pub fn assign(&mut self, student_id: StudentId, section_id: SectionId) {
        self.assignments.insert(Assignment::new(student_id, section_id));
    }

    pub fn unassign(&mut self, student_id: &StudentId, section_id: &SectionId) {
        self.assignments.remove(&Assignment {
            student_id: student_id.clone(),
            section_id: section_id.clone(),
        });
    }

    pub fn total_assignments(&self) -> usize {
        self.assignments.len()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::CourseId;

    fn section(id: &str, course: &str) -> Section {
        Section::new(SectionId(id.to_string()), CourseId(course.to_string()), 30)
    }

    #[test]
    fn assign_and_query_round_trips() {
        let mut schedule = Schedule::from_catalog([section("S001", "MATH101")]);
        schedule.assign(StudentId("u1".into()), SectionId("S001".into()));

        assert!(schedule.has_student(&SectionId("S001".into()), &StudentId("u1".into())));
        assert_eq!(schedule.enrollment(&SectionId("S001".into())), 1);
        assert_eq!(schedule.student_sections(&StudentId("u1".into())).len(), 1);
    }

    #[test]
    fn sections_iterate_id_ascending() {
        let schedule = Schedule::from_catalog([
            section("S003", "ART101"),
            section("S001", "MATH101"),
            section("S002", "SCI101"),
        ]);
        let ids: Vec<_> = schedule.sections.keys().map(|id| id.0.clone()).collect();
        assert_eq!(ids, vec!["S001", "S002", "S003"]);
    }
}
