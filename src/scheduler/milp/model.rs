//! Variable creation, hard/soft constraints, linearization and the
//! objective (§4.3). Returns an unsolved `good_lp` model plus the variable
//! maps needed to extract a solution back into a `Schedule`.

use crate::parser::Catalog;
use crate::types::{CourseId, PeriodId, Schedule, SectionId, StudentId};
use good_lp::{constraint, variable, Expression, ProblemVariables, SolverModel, Variable};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// Every decision variable the model created, keyed so extraction can walk
/// them back into entity ids without re-deriving admissibility rules.
pub struct ModelVars {
    pub x: BTreeMap<(SectionId, PeriodId), Variable>,
    pub y: BTreeMap<(StudentId, SectionId), Variable>,
    pub z: BTreeMap<(StudentId, SectionId, PeriodId), Variable>,
    pub miss: BTreeMap<(StudentId, CourseId), Variable>,
    pub cap_over: BTreeMap<SectionId, Variable>,
}

/// `x[s,p]`: admissible (section, period) pairs. A restricted course only
/// gets its policy-allowed periods; a teacher's unavailable periods are
/// never modeled at all, which satisfies hard constraint 4 (§4.3) by
/// construction instead of by an explicit `x[s,p] = 0` constraint.
fn admissible_periods(catalog: &Catalog) -> BTreeMap<(SectionId, PeriodId), ()> {
    let mut out = BTreeMap::new();
    let teacher_by_id: std::collections::HashMap<_, _> =
        catalog.teachers.iter().map(|t| (&t.id, t)).collect();

    for section in &catalog.sections {
        let allowed_names = catalog.policy.allowed_periods(&section.course_id);
        let teacher = section.teacher_id.as_ref().and_then(|id| teacher_by_id.get(id).copied());

        for period in &catalog.periods {
            if let Some(allowed) = allowed_names {
                if !allowed.contains(&period.name) {
                    continue;
                }
            }
            if let Some(teacher) = teacher {
                if !teacher.is_available(&period.id) {
                    continue;
                }
            }
            out.insert((section.id.clone(), period.id.clone()), ());
        }
    }
    out
}

/// Build every decision variable the spec names, registering each with
/// `vars` and returning the lookup maps used by constraints, the
/// objective, warm start and extraction alike.
pub fn build_variables(catalog: &Catalog, vars: &mut ProblemVariables) -> ModelVars {
    let admissible = admissible_periods(catalog);

    let mut x = BTreeMap::new();
    for key in admissible.keys() {
        x.insert(key.clone(), vars.add(variable().binary()));
    }

    let mut y = BTreeMap::new();
    let pref_by_student: std::collections::HashMap<_, _> = catalog
        .preferences
        .iter()
        .map(|p| (&p.student_id, p))
        .collect();
    for student in &catalog.students {
        let Some(pref) = pref_by_student.get(&student.id) else {
            continue;
        };
        for section in &catalog.sections {
            if pref.wants(&section.course_id) {
                y.insert(
                    (student.id.clone(), section.id.clone()),
                    vars.add(variable().binary()),
                );
            }
        }
    }

    let mut z = BTreeMap::new();
    for ((student_id, section_id), _) in y.iter() {
        for period_id in catalog.periods.iter().map(|p| &p.id) {
            if x.contains_key(&(section_id.clone(), period_id.clone())) {
                z.insert(
                    (student_id.clone(), section_id.clone(), period_id.clone()),
                    vars.add(variable().binary()),
                );
            }
        }
    }

    let mut miss = BTreeMap::new();
    for student in &catalog.students {
        let Some(pref) = pref_by_student.get(&student.id) else {
            continue;
        };
        for course_id in &pref.preferred_courses {
            miss.insert(
                (student.id.clone(), course_id.clone()),
                vars.add(variable().binary()),
            );
        }
    }

    let mut cap_over = BTreeMap::new();
    for section in &catalog.sections {
        cap_over.insert(section.id.clone(), vars.add(variable().integer().min(0)));
    }

    ModelVars { x, y, z, miss, cap_over }
}

fn sum_over<'a>(vars: impl Iterator<Item = &'a Variable>) -> Expression {
    vars.copied().map(Expression::from).sum()
}

/// Applies hard constraints 1-8 and the two soft-constraint slack
/// relations to `model`, returning it back for further chaining.
pub fn add_constraints<M: SolverModel>(mut model: M, catalog: &Catalog, v: &ModelVars) -> M {
    // 1 & 2: each section scheduled at most once (exactly once if restricted).
    for section in &catalog.sections {
        let terms: Vec<&Variable> = catalog
            .periods
            .iter()
            .filter_map(|p| v.x.get(&(section.id.clone(), p.id.clone())))
            .collect();
        if terms.is_empty() {
            warn!(
                "milp: section '{}' has no admissible period, cannot be scheduled",
                section.id
            );
            continue;
        }
        let sum = sum_over(terms.into_iter());
        model = if catalog.policy.is_restricted(&section.course_id) {
            model.with(constraint!(sum == 1))
        } else {
            model.with(constraint!(sum <= 1))
        };
    }

    // 3: teacher non-overlap.
    for teacher in &catalog.teachers {
        let sections: Vec<_> = catalog
            .sections
            .iter()
            .filter(|s| s.teacher_id.as_ref() == Some(&teacher.id))
            .collect();
        for period in &catalog.periods {
            let terms: Vec<&Variable> = sections
                .iter()
                .filter_map(|s| v.x.get(&(s.id.clone(), period.id.clone())))
                .collect();
            if terms.len() > 1 {
                let sum = sum_over(terms.into_iter());
                model = model.with(constraint!(sum <= 1));
            }
        }
    }

    // 5: a student's section only counts if the section is actually scheduled.
    for ((student_id, section_id), y_var) in &v.y {
        let terms: Vec<&Variable> = catalog
            .periods
            .iter()
            .filter_map(|p| v.x.get(&(section_id.clone(), p.id.clone())))
            .collect();
        let sum = sum_over(terms.into_iter());
        model = model.with(constraint!(*y_var <= sum));
        let _ = student_id;
    }

    // 6: z[u,s,p] linearizes y[u,s] AND x[s,p].
    for ((student_id, section_id, period_id), z_var) in &v.z {
        let y_var = v.y[&(student_id.clone(), section_id.clone())];
        let x_var = v.x[&(section_id.clone(), period_id.clone())];
        model = model.with(constraint!(*z_var <= y_var));
        model = model.with(constraint!(*z_var <= x_var));
        model = model.with(constraint!(*z_var >= y_var + x_var - 1));
    }

    // 7: a student occupies at most one section per period.
    let mut periods_by_student: std::collections::HashMap<&StudentId, HashSet<&PeriodId>> =
        std::collections::HashMap::new();
    for (student_id, _, period_id) in v.z.keys() {
        periods_by_student.entry(student_id).or_default().insert(period_id);
    }
    for (student_id, periods) in periods_by_student {
        for period_id in periods {
            let terms: Vec<&Variable> = catalog
                .sections
                .iter()
                .filter_map(|s| v.z.get(&(student_id.clone(), s.id.clone(), period_id.clone())))
                .collect();
            if terms.len() > 1 {
                let sum = sum_over(terms.into_iter());
                model = model.with(constraint!(sum <= 1));
            }
        }
    }

    // 8: special-needs cap per section.
    let sped_ids: HashSet<&StudentId> = catalog
        .students
        .iter()
        .filter(|s| s.has_special_needs)
        .map(|s| &s.id)
        .collect();
    for section in &catalog.sections {
        let terms: Vec<&Variable> = sped_ids
            .iter()
            .filter_map(|sid| v.y.get(&((*sid).clone(), section.id.clone())))
            .collect();
        if !terms.is_empty() {
            let sum = sum_over(terms.into_iter());
            model = model.with(constraint!(sum <= catalog.policy.special_needs_cap as f64));
        }
    }

    // Soft: capacity overshoot slack.
    for section in &catalog.sections {
        let terms: Vec<&Variable> = catalog
            .students
            .iter()
            .filter_map(|u| v.y.get(&(u.id.clone(), section.id.clone())))
            .collect();
        if terms.is_empty() {
            continue;
        }
        let cap_over = v.cap_over[&section.id];
        let sum = sum_over(terms.into_iter());
        model = model.with(constraint!(sum <= section.capacity as f64 + cap_over));
    }

    // Soft: course coverage slack.
    for ((student_id, course_id), miss_var) in &v.miss {
        let terms: Vec<&Variable> = catalog
            .sections
            .iter()
            .filter(|s| &s.course_id == course_id)
            .filter_map(|s| v.y.get(&(student_id.clone(), s.id.clone())))
            .collect();
        let sum = sum_over(terms.into_iter());
        model = model.with(constraint!(sum + *miss_var >= 1));
    }

    model
}

/// The maximize-weighted-sum objective (§4.3), plus a warm-start nudge
/// strictly dominated by the real weights (`PolicyConfig::milp_warm_start_bonus`
/// is small enough that it can never flip which integral solution is optimal —
/// see DESIGN.md) so the warm start stays advisory, never a constraint.
pub fn build_objective(catalog: &Catalog, v: &ModelVars, warm_start: Option<&Schedule>) -> Expression {
    let policy = &catalog.policy;
    let mut objective = Expression::default();

    objective += policy.objective_schedule_weight * sum_over(v.x.values());
    objective += policy.objective_preference_weight * sum_over(v.y.values());
    objective -= policy.objective_miss_penalty * sum_over(v.miss.values());
    objective -= policy.objective_capacity_overrun_penalty * sum_over(v.cap_over.values());

    if let Some(warm) = warm_start {
        let bonus = policy.milp_warm_start_bonus;
        let mut nudged = 0usize;
        for section in warm.sections.values() {
            if let Some(period_id) = &section.period_id {
                if let Some(var) = v.x.get(&(section.id.clone(), period_id.clone())) {
                    objective += bonus * *var;
                    nudged += 1;
                }
            }
        }
        for assignment in &warm.assignments {
            if let Some(var) = v.y.get(&(assignment.student_id.clone(), assignment.section_id.clone())) {
                objective += bonus * *var;
                nudged += 1;
            }
        }
        debug!("milp: warm start nudged {nudged} matching variable(s)");
    }

    objective
}
