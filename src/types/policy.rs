use super::CourseId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Tunable policy knobs for the greedy constructor, the MILP objective, and
/// the action applier. Loadable from an optional `scheduler.toml`; every
/// field has a shipped default so the scheduler runs with none present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// course -> allowed period *names* (not ids). Empty set for a course
    /// means "no restriction", same as the course being absent entirely.
    pub course_period_restrictions: HashMap<CourseId, HashSet<String>>,
    /// Utilization floor τ; sections below this are "underutilized".
    pub utilization_floor: f64,
    /// Max special-needs students per section (MILP constraint 8).
    pub special_needs_cap: u32,
    /// Capacity ceiling applied to a MERGE result.
    pub merge_capacity_cap: u32,
    /// A teacher must stay under this many sections to pick up a SPLIT/ADD.
    pub teacher_section_cap: u32,
    /// Default capacity for an ADD'd section, keyed by department.
    pub department_default_capacity: HashMap<String, u32>,
    pub fallback_default_capacity: u32,
    /// MILP objective weights (see SPEC_FULL.md Open Question on weights).
    pub objective_schedule_weight: f64,
    pub objective_preference_weight: f64,
    pub objective_miss_penalty: f64,
    pub objective_capacity_overrun_penalty: f64,
    /// MILP solver time limit per call, in seconds.
    pub milp_time_limit_secs: u64,
    /// Acceptable MIP gap (e.g. 0.10 = stop within 10% of the bound).
    pub milp_mip_gap: f64,
    /// Solver thread count; 0 lets HiGHS pick based on available hardware.
    /// Reproducibility (§5/§8) requires setting this to 1 with a fixed seed.
    pub milp_threads: u32,
    pub milp_seed: u64,
    /// Weight of the warm-start nudge added to matching x/y terms in the
    /// MILP objective; strictly dominated by the real objective weights so
    /// it never changes which solutions are optimal (see DESIGN.md).
    pub milp_warm_start_bonus: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mut course_period_restrictions = HashMap::new();
        course_period_restrictions.insert(
            CourseId("Medical Career".to_string()),
            ["R1", "G1"].iter().map(|s| s.to_string()).collect(),
        );
        course_period_restrictions.insert(
            CourseId("Heroes Teach".to_string()),
            ["R2", "G2"].iter().map(|s| s.to_string()).collect(),
        );

        let mut department_default_capacity = HashMap::new();
        department_default_capacity.insert("Special".to_string(), 15);
        department_default_capacity.insert("PE".to_string(), 35);
        department_default_capacity.insert("Science".to_string(), 30);

        Self {
            course_period_restrictions,
            utilization_floor: 0.75,
            special_needs_cap: 12,
            merge_capacity_cap: 35,
            teacher_section_cap: 6,
            department_default_capacity,
            fallback_default_capacity: 25,
            objective_schedule_weight: 10.0,
            objective_preference_weight: 1.0,
            objective_miss_penalty: 1000.0,
            objective_capacity_overrun_penalty: 1.0,
            milp_time_limit_secs: 900,
            milp_mip_gap: 0.10,
            milp_threads: 0,
            milp_seed: 42,
            milp_warm_start_bonus: 1e-4,
        }
    }
}

impl PolicyConfig {
    /// Load from a TOML file, falling back to defaults for anything the
    /// file omits (mirrors the teacher's `load_config_or_default`).
    pub fn load_or_default(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn allowed_periods(&self, course_id: &CourseId) -> Option<&HashSet<String>> {
        self.course_period_restrictions
            .get(course_id)
            .filter(|set| !set.is_empty())
    }

    pub fn is_restricted(&self, course_id: &CourseId) -> bool {
        self.allowed_periods(course_id).is_some()
    }

    pub fn default_capacity_for_department(&self, department: Option<&str>) -> u32 {
        department
            .and_then(|d| self.department_default_capacity.get(d))
            .copied()
            .unwrap_or(self.fallback_default_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_restricts_medical_career_and_heroes_teach() {
        let policy = PolicyConfig::default();
        assert!(policy.is_restricted(&CourseId("Medical Career".to_string())));
        assert!(policy.is_restricted(&CourseId("Heroes Teach".to_string())));
        assert!(!policy.is_restricted(&CourseId("Algebra I".to_string())));
    }

    #[test]
    fn department_default_capacity_falls_back() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.default_capacity_for_department(Some("PE")), 35);
        assert_eq!(policy.default_capacity_for_department(Some("Art")), 25);
        assert_eq!(policy.default_capacity_for_department(None), 25);
    }
}
