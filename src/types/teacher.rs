use super::{PeriodId, TeacherId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A teacher. Name/email are carried for CSV fidelity and reporting only —
/// no scoring or feasibility formula looks at them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub max_sections: u32,
    #[serde(default)]
    pub unavailable_periods: HashSet<PeriodId>,
}

impl Teacher {
    pub fn new(id: TeacherId, department: impl Into<String>) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            department: department.into(),
            max_sections: 5,
            unavailable_periods: HashSet::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_available(&self, period_id: &PeriodId) -> bool {
        !self.unavailable_periods.contains(period_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_period_blocks_availability() {
        let mut t = Teacher::new(TeacherId("t1".into()), "Math");
        t.unavailable_periods.insert(PeriodId("P1".into()));
        assert!(!t.is_available(&PeriodId("P1".into())));
        assert!(t.is_available(&PeriodId("P2".into())));
    }
}
