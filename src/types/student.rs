use super::StudentId;
use serde::{Deserialize, Serialize};

/// A student. Name/email are reporting-only, like on `Teacher`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade_level: u8,
    #[serde(default)]
    pub has_special_needs: bool,
}

impl Student {
    pub fn new(id: StudentId, grade_level: u8) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            grade_level,
            has_special_needs: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
