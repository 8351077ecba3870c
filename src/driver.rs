//! The fixed-point iteration loop tying the greedy constructor, the MILP
//! model, the utilization analyzer and the action applier together
//! (§4.6). Persists per-iteration artifacts before moving on so a crash
//! leaves the most recent good state on disk (§5, §7).

use crate::actions::{apply_actions, catalogs_structurally_equal, MutableCatalog};
use crate::error::Result;
use crate::oracle::{Oracle, OracleRequest};
use crate::parser::{write_reports, Catalog};
use crate::reporter::{self, Metrics, RunSummary};
use crate::scheduler::{greedy, milp};
use crate::types::{Period, PeriodId, Schedule};
use crate::utilization::{self, UtilizationRow};
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

/// Which optimizer(s) to run each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Greedy,
    Milp,
    Both,
}

pub struct DriverConfig {
    pub algorithm: Algorithm,
    pub max_iterations: u32,
    pub output_dir: PathBuf,
}

/// Everything the driver produced, for the CLI to print/persist further.
pub struct DriverOutcome {
    pub schedule: Schedule,
    pub utilization: Vec<UtilizationRow>,
    pub metrics: Metrics,
}

/// Runs the fixed-point loop described in §4.6's pseudocode, writing
/// iteration artifacts under `output_dir/iterations/iteration_i/` and the
/// final snapshot under `output_dir/final/`.
pub fn run(
    mut catalog: Catalog,
    config: &DriverConfig,
    oracle: &dyn Oracle,
) -> Result<DriverOutcome> {
    let mut metrics = Metrics::default();
    let periods_by_id: HashMap<PeriodId, &Period> =
        catalog.periods.iter().map(|p| (p.id.clone(), p)).collect();

    let mut schedule = Schedule::new();
    let mut util_rows: Vec<UtilizationRow> = Vec::new();
    let mut initial_utilization_recorded = false;

    for iteration in 1..=config.max_iterations.max(1) {
        metrics.iterations = iteration as usize;
        info!("driver: starting iteration {iteration}");

        let (iter_schedule, greedy_elapsed, milp_elapsed, used_fallback) =
            run_optimizers(&catalog, config.algorithm);
        metrics.greedy_time_ms += greedy_elapsed.as_millis();
        metrics.milp_time_ms += milp_elapsed.as_millis();
        if used_fallback {
            metrics.fallbacks += 1;
        }
        schedule = iter_schedule;

        util_rows = utilization::analyze(&schedule);
        if !initial_utilization_recorded {
            metrics.initial_utilization = reporter::average_utilization(&util_rows);
            initial_utilization_recorded = true;
        }
        metrics.final_utilization = reporter::average_utilization(&util_rows);

        let iteration_dir = config
            .output_dir
            .join("iterations")
            .join(format!("iteration_{iteration}"));
        write_reports(&iteration_dir, &schedule, &periods_by_id, &util_rows)?;

        let underutilized = utilization::underutilized(&schedule, &catalog.policy);
        if underutilized.is_empty() {
            info!("driver: all sections meet the utilization floor, stopping");
            break;
        }
        if iteration == config.max_iterations {
            info!("driver: reached max_iterations ({iteration}), stopping");
            break;
        }

        let oracle_start = Instant::now();
        let request = OracleRequest {
            underutilized: &underutilized,
            catalog: &catalog,
        };
        let proposed = oracle.propose(&request);
        metrics.oracle_time_ms += oracle_start.elapsed().as_millis();

        let sections_before = catalog.sections.clone();
        let mut mutable = MutableCatalog {
            sections: &mut catalog.sections,
            preferences: &mut catalog.preferences,
            teachers: &catalog.teachers,
            policy: &catalog.policy,
        };
        let report = apply_actions(&mut mutable, &proposed);
        metrics.sections_adjusted += report.applied;

        if !report.changed || catalogs_structurally_equal(&sections_before, &catalog.sections) {
            info!("driver: action applier made no structural change, stopping");
            break;
        }
    }

    let final_dir = config.output_dir.join("final");
    write_reports(&final_dir, &schedule, &periods_by_id, &util_rows)?;

    let summary = RunSummary {
        algorithm: format!("{:?}", config.algorithm).to_lowercase(),
        iterations_run: metrics.iterations,
        total_sections: schedule.sections.len(),
        scheduled_sections: schedule.sections.values().filter(|s| s.is_scheduled()).count(),
        total_students: catalog.students.len(),
        total_assignments: schedule.total_assignments(),
        missed_course_preferences: count_missed_preferences(&schedule, &catalog),
        average_utilization: metrics.final_utilization,
        underutilized_sections: utilization::underutilized(&schedule, &catalog.policy).len(),
    };
    reporter::write_summary(&final_dir.join("summary.json"), &summary)?;
    reporter::write_metrics(&final_dir.join("metrics.json"), &metrics)?;

    Ok(DriverOutcome {
        schedule,
        utilization: util_rows,
        metrics,
    })
}

fn count_missed_preferences(schedule: &Schedule, catalog: &Catalog) -> usize {
    catalog
        .preferences
        .iter()
        .map(|pref| {
            let sections = schedule.student_sections(&pref.student_id);
            pref.preferred_courses
                .iter()
                .filter(|course_id| !sections.iter().any(|s| &s.course_id == **course_id))
                .count()
        })
        .sum()
}

/// Runs the configured optimizer(s) for one iteration. `--algorithm both`
/// (the default, and what §4.6's pseudocode always does) runs greedy first
/// to seed the MILP warm start and prefers the MILP schedule whenever it
/// scheduled anything, falling back to greedy otherwise (§7: solver errors
/// degrade to the warm-start greedy schedule). `milp` solves cold, with no
/// warm start, for comparison; `greedy` skips the MILP stage entirely.
fn run_optimizers(
    catalog: &Catalog,
    algorithm: Algorithm,
) -> (Schedule, std::time::Duration, std::time::Duration, bool) {
    match algorithm {
        Algorithm::Greedy => {
            let start = Instant::now();
            let schedule = greedy::build_schedule(catalog);
            (schedule, start.elapsed(), std::time::Duration::ZERO, false)
        }
        Algorithm::Milp => {
            let start = Instant::now();
            let schedule = milp::solve(catalog, None);
            let elapsed = start.elapsed();
            if schedule.sections.values().any(|s| s.is_scheduled()) {
                (schedule, std::time::Duration::ZERO, elapsed, false)
            } else {
                warn!("driver: cold MILP produced no scheduled sections, falling back to greedy");
                let greedy_start = Instant::now();
                let greedy_schedule = greedy::build_schedule(catalog);
                (greedy_schedule, greedy_start.elapsed(), elapsed, true)
            }
        }
        Algorithm::Both => {
            let greedy_start = Instant::now();
            let greedy_schedule = greedy::build_schedule(catalog);
            let greedy_elapsed = greedy_start.elapsed();

            let milp_start = Instant::now();
            let milp_schedule = milp::solve(catalog, Some(&greedy_schedule));
            let milp_elapsed = milp_start.elapsed();

            if milp_schedule.sections.values().any(|s| s.is_scheduled()) {
                (milp_schedule, greedy_elapsed, milp_elapsed, false)
            } else {
                warn!("driver: MILP produced no scheduled sections, falling back to greedy");
                (greedy_schedule, greedy_elapsed, milp_elapsed, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NullOracle;
    use crate::types::{CourseId, Period, PolicyConfig, Section, SectionId, Student, StudentId, StudentPreference, Teacher, TeacherId};

    fn tmp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scheduler_driver_test_{name}_{}", std::process::id()))
    }

    fn minimal_catalog() -> Catalog {
        let mut section_a = Section::new(SectionId("S001".into()), CourseId("MATH101".into()), 30);
        section_a.teacher_id = Some(TeacherId("t1".into()));
        let mut section_b = Section::new(SectionId("S002".into()), CourseId("SCI101".into()), 30);
        section_b.teacher_id = Some(TeacherId("t2".into()));

        let mut pref_a = StudentPreference::new(StudentId("u1".into()));
        pref_a.preferred_courses = vec![CourseId("MATH101".into()), CourseId("SCI101".into())];
        let mut pref_b = StudentPreference::new(StudentId("u2".into()));
        pref_b.preferred_courses = vec![CourseId("MATH101".into()), CourseId("SCI101".into())];

        Catalog {
            periods: vec![Period::new("P1", "P1"), Period::new("P2", "P2")],
            teachers: vec![Teacher::new(TeacherId("t1".into()), "Math"), Teacher::new(TeacherId("t2".into()), "Science")],
            students: vec![Student::new(StudentId("u1".into()), 10), Student::new(StudentId("u2".into()), 10)],
            sections: vec![section_a, section_b],
            preferences: vec![pref_a, pref_b],
            policy: PolicyConfig::default(),
        }
    }

    #[test]
    fn greedy_only_run_terminates_and_writes_artifacts() {
        let dir = tmp_dir("greedy");
        let config = DriverConfig {
            algorithm: Algorithm::Greedy,
            max_iterations: 3,
            output_dir: dir.clone(),
        };

        let outcome = run(minimal_catalog(), &config, &NullOracle).unwrap();
        assert_eq!(outcome.schedule.total_assignments(), 4);
        assert!(dir.join("final").join("Master_Schedule.csv").exists());
        assert!(dir.join("final").join("summary.json").exists());
        assert!(dir.join("final").join("metrics.json").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn terminates_at_max_iterations_even_without_oracle_progress() {
        let dir = tmp_dir("max_iter");
        let mut catalog = minimal_catalog();
        catalog.policy.utilization_floor = 1.1; // unreachable, forces the loop to run out

        let config = DriverConfig {
            algorithm: Algorithm::Greedy,
            max_iterations: 2,
            output_dir: dir.clone(),
        };

        let outcome = run(catalog, &config, &NullOracle).unwrap();
        assert_eq!(outcome.metrics.iterations, 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
