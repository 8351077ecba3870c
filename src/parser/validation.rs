use crate::parser::Catalog;
use std::collections::HashSet;

/// Validation result with collected errors and warnings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Checks a loaded catalog for duplicate IDs and dangling references.
/// Input errors abort the run (see error taxonomy); this never mutates
/// the catalog, only reports on it.
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_duplicate_ids(
        catalog.students.iter().map(|s| s.id.0.as_str()),
        "student",
        &mut result,
    );
    check_duplicate_ids(
        catalog.teachers.iter().map(|t| t.id.0.as_str()),
        "teacher",
        &mut result,
    );
    check_duplicate_ids(
        catalog.sections.iter().map(|s| s.id.0.as_str()),
        "section",
        &mut result,
    );
    check_duplicate_ids(
        catalog.periods.iter().map(|p| p.id.0.as_str()),
        "period",
        &mut result,
    );

    let teacher_ids: HashSet<&str> = catalog.teachers.iter().map(|t| t.id.0.as_str()).collect();
    for section in &catalog.sections {
        if let Some(teacher_id) = &section.teacher_id {
            if !teacher_ids.contains(teacher_id.0.as_str()) {
                result.add_error(format!(
                    "Section '{}' references unknown teacher '{}'",
                    section.id, teacher_id
                ));
            }
        }
    }

    let student_ids: HashSet<&str> = catalog.students.iter().map(|s| s.id.0.as_str()).collect();
    for pref in &catalog.preferences {
        if !student_ids.contains(pref.student_id.0.as_str()) {
            result.add_error(format!(
                "Preference row references unknown student '{}'",
                pref.student_id
            ));
        }
        for course_id in &pref.required_courses {
            if !pref.preferred_courses.contains(course_id) {
                result.add_warning(format!(
                    "Student '{}' requires course '{}' not listed in preferred courses",
                    pref.student_id, course_id
                ));
            }
        }
    }

    let course_ids: HashSet<&str> = catalog
        .sections
        .iter()
        .map(|s| s.course_id.0.as_str())
        .collect();
    for pref in &catalog.preferences {
        for course_id in &pref.preferred_courses {
            if !course_ids.contains(course_id.0.as_str()) {
                result.add_warning(format!(
                    "Student '{}' prefers course '{}' with no sections offered",
                    pref.student_id, course_id
                ));
            }
        }
    }

    result
}

fn check_duplicate_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    id_type: &str,
    result: &mut ValidationResult,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            result.add_error(format!("Duplicate {} ID: '{}'", id_type, id));
        }
    }
}
