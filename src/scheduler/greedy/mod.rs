//! The priority-driven heuristic constructor (§4.2). Builds a complete
//! `Schedule` in two phases — section→period, then student→section — each
//! processing its actors in a deterministic hardness order. Used standalone
//! (`--algorithm greedy`) and as the MILP's warm start.

mod priority;
mod student;

pub use priority::{period_score, section_priority};
pub use student::{non_full_sections_of_course, student_hardness, student_section_score, SPECIAL_COURSES};

use crate::parser::Catalog;
use crate::types::{CourseId, Period, PeriodId, PolicyConfig, Schedule, Section, Teacher, TeacherId};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Build a complete `Schedule` from `catalog` under every hard constraint.
/// Never fails: infeasible sections/students are left unscheduled and
/// recorded, per the greedy's failure semantics (§4.2, §7).
pub fn build_schedule(catalog: &Catalog) -> Schedule {
    let mut schedule = Schedule::from_catalog(catalog.sections.iter().cloned());
    schedule_sections(&mut schedule, catalog);
    assign_students(&mut schedule, catalog);
    schedule
}

fn sections_per_course(catalog: &Catalog) -> HashMap<CourseId, usize> {
    let mut counts = HashMap::new();
    for section in &catalog.sections {
        *counts.entry(section.course_id.clone()).or_insert(0) += 1;
    }
    counts
}

fn sections_per_teacher(catalog: &Catalog) -> HashMap<TeacherId, usize> {
    let mut counts = HashMap::new();
    for section in &catalog.sections {
        if let Some(teacher_id) = &section.teacher_id {
            *counts.entry(teacher_id.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn demand_per_course(catalog: &Catalog) -> HashMap<CourseId, usize> {
    let mut demand = HashMap::new();
    for pref in &catalog.preferences {
        for course_id in &pref.preferred_courses {
            *demand.entry(course_id.clone()).or_insert(0) += 1;
        }
    }
    demand
}

/// Tracks everything `period_score` needs as sections get placed, so each
/// placement only has to touch the handful of counters it changes.
struct PlacementState<'a> {
    teachers_here: HashMap<PeriodId, HashSet<TeacherId>>,
    course_periods_used: HashMap<CourseId, HashSet<PeriodId>>,
    sports_med_here: HashSet<PeriodId>,
    course_count_here: HashMap<(CourseId, PeriodId), usize>,
    total_here: HashMap<PeriodId, usize>,
    teacher_by_id: HashMap<&'a TeacherId, &'a Teacher>,
}

impl<'a> PlacementState<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            teachers_here: HashMap::new(),
            course_periods_used: HashMap::new(),
            sports_med_here: HashSet::new(),
            course_count_here: HashMap::new(),
            total_here: HashMap::new(),
            teacher_by_id: catalog.teachers.iter().map(|t| (&t.id, t)).collect(),
        }
    }

    fn record_placement(&mut self, section: &Section, period: &Period) {
        if let Some(teacher_id) = &section.teacher_id {
            self.teachers_here
                .entry(period.id.clone())
                .or_default()
                .insert(teacher_id.clone());
        }
        self.course_periods_used
            .entry(section.course_id.clone())
            .or_default()
            .insert(period.id.clone());
        if section.course_id.0 == "Sports Med" {
            self.sports_med_here.insert(period.id.clone());
        }
        *self
            .course_count_here
            .entry((section.course_id.clone(), period.id.clone()))
            .or_insert(0) += 1;
        *self.total_here.entry(period.id.clone()).or_insert(0) += 1;
    }
}

/// Phase 1 (§4.2): three ordered sweeps — restricted courses, Sports Med,
/// then everything else — each internally sorted by priority descending.
fn schedule_sections(schedule: &mut Schedule, catalog: &Catalog) {
    let course_counts = sections_per_course(catalog);
    let teacher_counts = sections_per_teacher(catalog);
    let demand = demand_per_course(catalog);

    let mut sorted_periods = catalog.periods.clone();
    sorted_periods.sort_by(|a, b| a.name.cmp(&b.name));

    let mut ids: Vec<_> = catalog.sections.iter().map(|s| s.id.clone()).collect();
    ids.sort_by(|a, b| {
        let sa = catalog.sections.iter().find(|s| &s.id == a).unwrap();
        let sb = catalog.sections.iter().find(|s| &s.id == b).unwrap();
        let teacher_a = sa.teacher_id.as_ref().and_then(|t| {
            catalog.teachers.iter().find(|ct| &ct.id == t)
        });
        let teacher_b = sb.teacher_id.as_ref().and_then(|t| {
            catalog.teachers.iter().find(|ct| &ct.id == t)
        });
        let pa = section_priority(sa, teacher_a, &course_counts, &teacher_counts, &demand, &catalog.policy);
        let pb = section_priority(sb, teacher_b, &course_counts, &teacher_counts, &demand, &catalog.policy);
        pb.partial_cmp(&pa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });

    let restricted: Vec<_> = ids
        .iter()
        .filter(|id| {
            let section = catalog.sections.iter().find(|s| &s.id == *id).unwrap();
            catalog.policy.is_restricted(&section.course_id)
        })
        .cloned()
        .collect();
    let sports_med: Vec<_> = ids
        .iter()
        .filter(|id| {
            let section = catalog.sections.iter().find(|s| &s.id == *id).unwrap();
            !catalog.policy.is_restricted(&section.course_id) && section.course_id.0 == "Sports Med"
        })
        .cloned()
        .collect();
    let rest: Vec<_> = ids
        .iter()
        .filter(|id| {
            let section = catalog.sections.iter().find(|s| &s.id == *id).unwrap();
            !catalog.policy.is_restricted(&section.course_id) && section.course_id.0 != "Sports Med"
        })
        .cloned()
        .collect();

    let mut state = PlacementState::new(catalog);
    for sweep in [restricted, sports_med, rest] {
        for id in sweep {
            let section = catalog.sections.iter().find(|s| s.id == id).unwrap();
            place_section(schedule, section, &sorted_periods, &catalog.policy, &mut state);
        }
    }
}

fn place_section(
    schedule: &mut Schedule,
    section: &Section,
    periods: &[Period],
    policy: &PolicyConfig,
    state: &mut PlacementState,
) {
    let teacher = section
        .teacher_id
        .as_ref()
        .and_then(|id| state.teacher_by_id.get(id).copied());

    let mut best: Option<(&Period, f64)> = None;
    for period in periods {
        let teacher_already_here = teacher
            .map(|t| {
                state
                    .teachers_here
                    .get(&period.id)
                    .map(|set| set.contains(&t.id))
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        let course_unused = !state
            .course_periods_used
            .get(&section.course_id)
            .map(|set| set.contains(&period.id))
            .unwrap_or(false);
        let sports_med_here = state.sports_med_here.contains(&period.id);
        let course_here = state
            .course_count_here
            .get(&(section.course_id.clone(), period.id.clone()))
            .copied()
            .unwrap_or(0);
        let total_here = state.total_here.get(&period.id).copied().unwrap_or(0);

        let score = period_score(
            section,
            period,
            teacher,
            teacher_already_here,
            policy,
            course_unused,
            sports_med_here,
            course_here,
            total_here,
        );

        if score > 0.0 {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((period, score)),
            }
        }
    }

    match best {
        Some((period, _)) => {
            state.record_placement(section, period);
            schedule.section_mut(&section.id).unwrap().period_id = Some(period.id.clone());
        }
        None => {
            warn!("greedy: section '{}' could not be scheduled into any period", section.id);
        }
    }
}

/// Phase 2 (§4.2): Pass A places the three "special" courses in fixed
/// order for every student before Pass B ranks the rest of each student's
/// preference list.
fn assign_students(schedule: &mut Schedule, catalog: &Catalog) {
    let pref_by_student: HashMap<_, _> = catalog
        .preferences
        .iter()
        .map(|p| (p.student_id.clone(), p))
        .collect();

    let mut students: Vec<_> = catalog.students.iter().collect();
    students.sort_by(|a, b| {
        let ha = student_hardness(*a, pref_by_student.get(&a.id).copied());
        let hb = student_hardness(*b, pref_by_student.get(&b.id).copied());
        hb.partial_cmp(&ha)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut sped_placed: HashMap<crate::types::SectionId, usize> = HashMap::new();

    for student_ref in &students {
        let student: &crate::types::Student = *student_ref;
        let Some(pref) = pref_by_student.get(&student.id).copied() else {
            continue;
        };

        // Pass A: special courses in fixed order.
        for course_name in SPECIAL_COURSES {
            let course_id = CourseId(course_name.to_string());
            if !pref.wants(&course_id) {
                continue;
            }
            place_best_section(schedule, student, pref, &course_id, &mut sped_placed);
        }

        // Pass B: remaining preferred courses, ranked and placed in score order.
        let mut candidates: Vec<(CourseId, f64)> = Vec::new();
        for course_id in &pref.preferred_courses {
            if SPECIAL_COURSES.contains(&course_id.0.as_str()) {
                continue;
            }
            if schedule
                .student_sections(&student.id)
                .iter()
                .any(|s| &s.course_id == course_id)
            {
                continue;
            }
            let best = best_section_score(schedule, student, pref, course_id, &sped_placed);
            if let Some((_, score)) = best {
                candidates.push((course_id.clone(), score));
            }
        }
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (course_id, _) in candidates {
            place_best_section(schedule, student, pref, &course_id, &mut sped_placed);
        }
    }
}

fn best_section_score(
    schedule: &Schedule,
    student: &crate::types::Student,
    pref: &crate::types::StudentPreference,
    course_id: &CourseId,
    sped_placed: &HashMap<crate::types::SectionId, usize>,
) -> Option<(crate::types::SectionId, f64)> {
    let non_full = non_full_sections_of_course(schedule, course_id);
    schedule
        .sections_for_course(course_id)
        .into_iter()
        .map(|section| {
            let k = sped_placed.get(&section.id).copied().unwrap_or(0);
            let score = student_section_score(schedule, student, pref, course_id, section, k, non_full);
            (section.id.clone(), score)
        })
        .filter(|(_, score)| *score > 0.0)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

fn place_best_section(
    schedule: &mut Schedule,
    student: &crate::types::Student,
    pref: &crate::types::StudentPreference,
    course_id: &CourseId,
    sped_placed: &mut HashMap<crate::types::SectionId, usize>,
) {
    let Some((section_id, _)) = best_section_score(schedule, student, pref, course_id, sped_placed) else {
        debug!(
            "greedy: student '{}' has no feasible section for course '{}'",
            student.id, course_id
        );
        return;
    };
    schedule.assign(student.id.clone(), section_id.clone());
    if student.has_special_needs {
        *sped_placed.entry(section_id).or_insert(0) += 1;
    }
}
