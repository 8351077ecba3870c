//! Integer program over the same catalog the greedy constructor uses,
//! built with `good_lp` against the HiGHS backend (§4.3). Always produces
//! a schedule for the caller: on infeasibility or a solver failure it logs
//! a warning and returns an empty schedule rather than propagating an
//! error, since a MILP miss is not an input error — the driver treats an
//! empty result as a signal to fall back to the greedy schedule.

mod model;

use crate::parser::Catalog;
use crate::types::Schedule;
use good_lp::{Solution, SolverModel};
use log::{info, warn};
use model::{add_constraints, build_objective, build_variables};

/// Solves the catalog, nudged toward `warm_start` if one is given.
/// Never fails: callers get back either a fully or partially scheduled
/// `Schedule`, or an empty one on infeasibility/solver error.
pub fn solve(catalog: &Catalog, warm_start: Option<&Schedule>) -> Schedule {
    match try_solve(catalog, warm_start) {
        Ok(schedule) => schedule,
        Err(e) => {
            warn!("milp: falling back to an empty schedule: {e}");
            Schedule::from_catalog(catalog.sections.iter().cloned())
        }
    }
}

fn try_solve(catalog: &Catalog, warm_start: Option<&Schedule>) -> crate::error::Result<Schedule> {
    let mut vars = good_lp::ProblemVariables::new();
    let model_vars = build_variables(catalog, &mut vars);
    let objective = build_objective(catalog, &model_vars, warm_start);
    let policy = &catalog.policy;

    let model = vars
        .maximise(objective)
        .using(good_lp::solvers::highs::highs);
    let mut model = model
        .set_time_limit(policy.milp_time_limit_secs as f64)
        .set_option("random_seed", policy.milp_seed as i32)
        .set_option("mip_rel_gap", policy.milp_mip_gap);
    if policy.milp_threads > 0 {
        model = model.set_option("threads", policy.milp_threads as i32);
    }
    let model = add_constraints(model, catalog, &model_vars);

    info!(
        "milp: solving {} section-period, {} student-section, {} linearization variable(s)",
        model_vars.x.len(),
        model_vars.y.len(),
        model_vars.z.len()
    );

    let solution = model
        .solve()
        .map_err(|e| crate::error::SchedulerError::SolverFailed(e.to_string()))?;

    let mut schedule = Schedule::from_catalog(catalog.sections.iter().cloned());
    for ((section_id, period_id), var) in &model_vars.x {
        if solution.value(*var) > 0.5 {
            if let Some(section) = schedule.section_mut(section_id) {
                section.period_id = Some(period_id.clone());
            }
        }
    }
    for ((student_id, section_id), var) in &model_vars.y {
        if solution.value(*var) > 0.5 {
            schedule.assign(student_id.clone(), section_id.clone());
        }
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Catalog;
    use crate::types::{
        CourseId, Period, PeriodId, PolicyConfig, Section, SectionId, Student, StudentId,
        StudentPreference, Teacher, TeacherId,
    };

    fn small_catalog() -> Catalog {
        let mut section_a = Section::new(SectionId("S001".into()), CourseId("MATH101".into()), 2);
        section_a.teacher_id = Some(TeacherId("T1".into()));
        let mut section_b = Section::new(SectionId("S002".into()), CourseId("MATH101".into()), 2);
        section_b.teacher_id = Some(TeacherId("T1".into()));

        let mut pref_a = StudentPreference::new(StudentId("u1".into()));
        pref_a.preferred_courses = vec![CourseId("MATH101".into())];
        let mut pref_b = StudentPreference::new(StudentId("u2".into()));
        pref_b.preferred_courses = vec![CourseId("MATH101".into())];

        Catalog {
            periods: vec![Period::new("P1", "P1"), Period::new("P2", "P2")],
            teachers: vec![Teacher::new(TeacherId("T1".into()), "Ada".into())],
            students: vec![Student::new(StudentId("u1".into()), 10), Student::new(StudentId("u2".into()), 10)],
            sections: vec![section_a, section_b],
            preferences: vec![pref_a, pref_b],
            policy: PolicyConfig::default(),
        }
    }

    #[test]
    fn solves_a_small_feasible_catalog_without_erroring() {
        let catalog = small_catalog();
        let schedule = solve(&catalog, None);
        assert_eq!(schedule.sections.len(), 2);
        assert!(schedule.sections.values().any(|s| s.period_id == Some(PeriodId("P1".into()))
            || s.period_id == Some(PeriodId("P2".into()))));
    }

    #[test]
    fn warm_start_accepts_an_empty_schedule_without_panicking() {
        let catalog = small_catalog();
        let warm = Schedule::from_catalog(catalog.sections.iter().cloned());
        let schedule = solve(&catalog, Some(&warm));
        assert_eq!(schedule.sections.len(), 2);
    }

    /// §8's warm-start monotonicity law, checked on a catalog small enough
    /// that both a cold solve and a greedy-warm-started solve reach the
    /// same optimum within the default time budget: a greedy schedule fed
    /// in as a warm start must never leave the solver with *fewer*
    /// assignments than solving cold, since the warm-start bonus in the
    /// objective (`milp_warm_start_bonus`) is additive and never
    /// penalizes a variable the cold solve would also have chosen.
    #[test]
    fn warm_started_solve_assigns_at_least_as_much_as_cold() {
        let catalog = small_catalog();
        let cold = solve(&catalog, None);

        let warm_start = crate::scheduler::greedy::build_schedule(&catalog);
        let warmed = solve(&catalog, Some(&warm_start));

        assert!(
            warmed.total_assignments() >= cold.total_assignments(),
            "warm-started solve ({}) scored fewer assignments than cold ({})",
            warmed.total_assignments(),
            cold.total_assignments()
        );
    }
}
