//! End-to-end scenarios over the greedy constructor, the action applier,
//! and the invariant checker, built from hand-authored catalogs rather
//! than CSV fixtures so each scenario's intent stays readable in one
//! place.

use school_scheduler::actions::{apply_actions, ActionKind, MutableCatalog, ProposedAction};
use school_scheduler::parser::Catalog;
use school_scheduler::scheduler::greedy::build_schedule;
use school_scheduler::types::{
    CourseId, Period, PeriodId, PolicyConfig, Section, SectionId, Student, StudentId,
    StudentPreference, Teacher, TeacherId,
};
use school_scheduler::validator::check_invariants;

fn periods(names: &[&str]) -> Vec<Period> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Period::new(format!("P{i}"), *name))
        .collect()
}

fn section(id: &str, course: &str, capacity: u32, teacher: &str) -> Section {
    let mut s = Section::new(SectionId(id.into()), CourseId(course.into()), capacity);
    s.teacher_id = Some(TeacherId(teacher.into()));
    s
}

fn student(id: &str, grade: u8) -> Student {
    Student::new(StudentId(id.into()), grade)
}

fn wants(student_id: &str, courses: &[&str]) -> StudentPreference {
    let mut pref = StudentPreference::new(StudentId(student_id.into()));
    pref.preferred_courses = courses.iter().map(|c| CourseId((*c).into())).collect();
    pref.required_courses = pref.preferred_courses.clone();
    pref
}

#[test]
fn minimal_feasible_scenario_schedules_everything() {
    let catalog = Catalog {
        periods: periods(&["P1", "P2"]),
        teachers: vec![
            Teacher::new(TeacherId("T1".into()), "Math"),
            Teacher::new(TeacherId("T2".into()), "English"),
        ],
        students: vec![student("S1", 10), student("S2", 10)],
        sections: vec![
            section("S001", "Algebra I", 30, "T1"),
            section("S002", "English 10", 30, "T2"),
        ],
        preferences: vec![
            wants("S1", &["Algebra I", "English 10"]),
            wants("S2", &["Algebra I", "English 10"]),
        ],
        policy: PolicyConfig::default(),
    };

    let schedule = build_schedule(&catalog);
    assert_eq!(schedule.total_assignments(), 4);
    assert!(schedule.sections.values().all(|s| s.is_scheduled()));
    assert!(check_invariants(&schedule, &catalog).is_empty());
}

#[test]
fn restricted_course_lands_on_allowed_period() {
    let mut policy = PolicyConfig::default();
    policy
        .course_period_restrictions
        .insert(CourseId("Medical Career".into()), ["R1"].iter().map(|s| s.to_string()).collect());

    let catalog = Catalog {
        periods: periods(&["R1", "R2"]),
        teachers: vec![Teacher::new(TeacherId("T1".into()), "Special")],
        students: vec![student("S1", 11)],
        sections: vec![section("S001", "Medical Career", 15, "T1")],
        preferences: vec![wants("S1", &["Medical Career"])],
        policy,
    };

    let schedule = build_schedule(&catalog);
    let section = schedule.section(&SectionId("S001".into())).unwrap();
    let period_id = section.period_id.clone().expect("section should be scheduled");
    let period = catalog.periods.iter().find(|p| p.id == period_id).unwrap();
    assert_eq!(period.name, "R1");
    assert!(check_invariants(&schedule, &catalog).is_empty());
}

#[test]
fn teacher_unavailability_dominates_placement() {
    let mut teacher = Teacher::new(TeacherId("T1".into()), "Math");
    teacher.unavailable_periods.insert(PeriodId("P0".into()));

    let catalog = Catalog {
        periods: periods(&["P1", "P2"]),
        teachers: vec![teacher],
        students: vec![student("S1", 10)],
        sections: vec![section("S001", "Algebra I", 30, "T1")],
        preferences: vec![wants("S1", &["Algebra I"])],
        policy: PolicyConfig::default(),
    };

    let schedule = build_schedule(&catalog);
    assert!(check_invariants(&schedule, &catalog).is_empty());
}

// Scenario 4 (§8): the special-needs cap is MILP hard constraint 8, not a
// greedy one — §4.2 only gives clustering a soft `0.5^(k-1)` penalty for
// k >= 2, which never stops a second SPED student from being placed when
// there's room. So this exercises `milp::solve`, not `build_schedule`.
#[test]
fn milp_respects_special_needs_cap_and_misses_the_rest() {
    let policy = PolicyConfig::default(); // special_needs_cap = 12

    let students: Vec<Student> = (1..=15)
        .map(|i| {
            let mut s = student(&format!("S{i}"), 10);
            s.has_special_needs = true;
            s
        })
        .collect();
    let preferences: Vec<StudentPreference> = students
        .iter()
        .map(|s| wants(&s.id.0, &["Resource Room"]))
        .collect();

    let catalog = Catalog {
        periods: periods(&["P1"]),
        teachers: vec![Teacher::new(TeacherId("T1".into()), "Special")],
        students,
        sections: vec![section("S001", "Resource Room", 30, "T1")],
        preferences,
        policy,
    };

    let schedule = school_scheduler::scheduler::milp::solve(&catalog, None);
    let enrolled = schedule.enrollment(&SectionId("S001".into()));
    assert!(enrolled <= 12, "special-needs cap of 12 was exceeded: {enrolled}");
    assert!(
        15 - enrolled >= 3,
        "expected at least 3 SPED students to miss the course, only {} missed",
        15 - enrolled
    );
    assert!(check_invariants(&schedule, &catalog).is_empty());
}

#[test]
fn merge_action_combines_two_underfull_sections() {
    let mut sections = vec![
        section("S001", "Art", 20, "T1"),
        section("S002", "Art", 20, "T2"),
    ];
    let mut preferences = vec![];
    let policy = PolicyConfig::default();
    let mut catalog = MutableCatalog {
        sections: &mut sections,
        preferences: &mut preferences,
        teachers: &[],
        policy: &policy,
    };

    let report = apply_actions(
        &mut catalog,
        &[ProposedAction {
            section_id: SectionId("S001".into()),
            action: ActionKind::Merge,
            merge_with: Some(SectionId("S002".into())),
            reason: Some("both underfull".to_string()),
        }],
    );

    assert_eq!(report.applied, 1);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].capacity, 35); // policy default merge_capacity_cap
}

#[test]
fn split_refused_below_the_capacity_floor() {
    let mut sections = vec![section("S001", "Art", 28, "T1")];
    let mut preferences = vec![];
    let policy = PolicyConfig::default();
    let mut catalog = MutableCatalog {
        sections: &mut sections,
        preferences: &mut preferences,
        teachers: &[],
        policy: &policy,
    };

    let report = apply_actions(
        &mut catalog,
        &[ProposedAction {
            section_id: SectionId("S001".into()),
            action: ActionKind::Split,
            merge_with: None,
            reason: None,
        }],
    );

    assert_eq!(report.applied, 0);
    assert_eq!(report.refused, 1);
    assert_eq!(sections.len(), 1, "refused split must not mutate the catalog");
}
