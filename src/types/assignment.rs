use super::{SectionId, StudentId};
use serde::{Deserialize, Serialize};

/// A single student-to-section placement. Identity is the pair itself, so a
/// `Schedule` can hold these in a `BTreeSet` without a separate dedup step.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub student_id: StudentId,
    pub section_id: SectionId,
}

impl Assignment {
    pub fn new(student_id: StudentId, section_id: SectionId) -> Self {
        Self {
            student_id,
            section_id,
        }
    }
}

/// A preferred course a student did not end up in, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedCourse {
    pub student_id: StudentId,
    pub course_id: super::CourseId,
    pub reason: String,
}
