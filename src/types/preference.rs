use super::{CourseId, StudentId};
use serde::{Deserialize, Serialize};

/// A student's ordered course wishlist, with a subset marked required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPreference {
    pub student_id: StudentId,
    /// Ordered by priority, highest first. `required_courses` is a subset.
    pub preferred_courses: Vec<CourseId>,
    pub required_courses: Vec<CourseId>,
}

impl StudentPreference {
    pub fn new(student_id: StudentId) -> Self {
        Self {
            student_id,
            preferred_courses: Vec::new(),
            required_courses: Vec::new(),
        }
    }

    pub fn is_required(&self, course_id: &CourseId) -> bool {
        self.required_courses.contains(course_id)
    }

    pub fn wants(&self, course_id: &CourseId) -> bool {
        self.preferred_courses.contains(course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_is_subset_of_preferred() {
        let mut pref = StudentPreference::new(StudentId("u1".into()));
        pref.preferred_courses = vec![CourseId("MATH101".into()), CourseId("ART101".into())];
        pref.required_courses = vec![CourseId("MATH101".into())];

        assert!(pref.is_required(&CourseId("MATH101".into())));
        assert!(!pref.is_required(&CourseId("ART101".into())));
    }
}
