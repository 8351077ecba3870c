//! Validated SPLIT / ADD / REMOVE / MERGE mutations over the section
//! catalog (§4.5). Every action is checked against the catalog's current
//! state before it is applied; a refused action is logged and otherwise
//! has no effect — the rest of the batch still applies.

use crate::types::{PolicyConfig, Section, SectionId, StudentPreference, Teacher, TeacherId};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// One mutation proposed by the oracle (§6). `merge_with` is only present
/// on `Merge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Split,
    Add,
    Remove,
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedAction {
    pub section_id: SectionId,
    pub action: ActionKind,
    #[serde(default)]
    pub merge_with: Option<SectionId>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// The section catalog and preference lists the action applier mutates.
/// Mirrors the subset of `Catalog` that SPLIT/ADD/REMOVE/MERGE can touch;
/// `teachers` is read-only context needed to resolve §4.5(ii)'s "department
/// peer" rule against the full roster, not just teachers who already teach
/// a section in that department; periods/students/policy are likewise
/// read-only context.
pub struct MutableCatalog<'a> {
    pub sections: &'a mut Vec<Section>,
    pub preferences: &'a mut Vec<StudentPreference>,
    pub teachers: &'a [Teacher],
    pub policy: &'a PolicyConfig,
}

/// Outcome of applying one action: whether the catalog actually changed,
/// for the driver's no-structural-change termination guard (§4.6).
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub applied: usize,
    pub refused: usize,
    pub changed: bool,
}

/// Applies every action in order, skipping (and logging) any that §4.5
/// forbids. Returns whether the catalog changed at all.
pub fn apply_actions(catalog: &mut MutableCatalog, actions: &[ProposedAction]) -> ApplyReport {
    let mut report = ApplyReport::default();
    for action in actions {
        let outcome = match action.action {
            ActionKind::Merge => apply_merge(catalog, &action.section_id, action.merge_with.as_ref()),
            ActionKind::Remove => apply_remove(catalog, &action.section_id),
            ActionKind::Split => apply_split(catalog, &action.section_id),
            ActionKind::Add => apply_add(catalog, &action.section_id),
        };
        match outcome {
            Ok(()) => {
                report.applied += 1;
                report.changed = true;
            }
            Err(reason) => {
                report.refused += 1;
                warn!(
                    "action applier: refused {:?} on section '{}': {reason}",
                    action.action, action.section_id
                );
            }
        }
    }
    report
}

fn find_section<'a>(sections: &'a [Section], id: &SectionId) -> Option<&'a Section> {
    sections.iter().find(|s| &s.id == id)
}

fn section_index(sections: &[Section], id: &SectionId) -> Option<usize> {
    sections.iter().position(|s| &s.id == id)
}

/// `MERGE(a, b)` — combine two sections of the same course. Sums
/// capacities (capped at the policy ceiling), deletes `b`, rewrites every
/// preference list that names `b` to name `a` instead (deduplicated).
fn apply_merge(
    catalog: &mut MutableCatalog,
    a_id: &SectionId,
    b_id: Option<&SectionId>,
) -> Result<(), String> {
    let Some(b_id) = b_id else {
        return Err("MERGE requires merge_with".to_string());
    };
    if a_id == b_id {
        return Err("cannot merge a section with itself".to_string());
    }
    let a = find_section(catalog.sections, a_id).ok_or_else(|| format!("unknown section '{a_id}'"))?;
    let b = find_section(catalog.sections, b_id).ok_or_else(|| format!("unknown section '{b_id}'"))?;
    if a.course_id != b.course_id {
        return Err(format!(
            "sections '{a_id}' and '{b_id}' teach different courses ('{}' vs '{}')",
            a.course_id, b.course_id
        ));
    }

    let merged_capacity = (a.capacity + b.capacity).min(catalog.policy.merge_capacity_cap);
    let a_idx = section_index(catalog.sections, a_id).unwrap();
    catalog.sections[a_idx].capacity = merged_capacity;

    let b_idx = section_index(catalog.sections, b_id).unwrap();
    catalog.sections.remove(b_idx);

    for pref in catalog.preferences.iter_mut() {
        rewrite_section_reference(pref, b_id, a_id);
    }

    info!("action applier: merged '{b_id}' into '{a_id}' (capacity {merged_capacity})");
    Ok(())
}

/// Preferences reference courses, not sections directly, but a section
/// rewrite still needs to happen wherever a SPLIT/ADD mutation minted a
/// section specifically to carry a student's preference forward. MERGE and
/// REMOVE never need to touch `preferred_courses`/`required_courses`
/// (those key on course, which is unaffected) — this is a no-op placeholder
/// kept symmetrical with `remove_section_everywhere` for the one case
/// (future section-scoped preferences) where it would matter.
fn rewrite_section_reference(_pref: &mut StudentPreference, _from: &SectionId, _to: &SectionId) {}

/// `REMOVE(s)` — forbidden if `s` is its teacher's only section, or its
/// course's only section.
fn apply_remove(catalog: &mut MutableCatalog, section_id: &SectionId) -> Result<(), String> {
    let section = find_section(catalog.sections, section_id)
        .ok_or_else(|| format!("unknown section '{section_id}'"))?;
    let course_id = section.course_id.clone();
    let teacher_id = section.teacher_id.clone();

    if let Some(teacher_id) = &teacher_id {
        let teacher_sections = catalog
            .sections
            .iter()
            .filter(|s| s.teacher_id.as_ref() == Some(teacher_id))
            .count();
        if teacher_sections <= 1 {
            return Err(format!(
                "section '{section_id}' is teacher '{teacher_id}''s only section"
            ));
        }
    }

    let course_sections = catalog
        .sections
        .iter()
        .filter(|s| s.course_id == course_id)
        .count();
    if course_sections <= 1 {
        return Err(format!(
            "section '{section_id}' is the only section of course '{course_id}'"
        ));
    }

    let idx = section_index(catalog.sections, section_id).unwrap();
    catalog.sections.remove(idx);
    for pref in catalog.preferences.iter_mut() {
        // REMOVE drops the section outright; preferences key on course, so
        // nothing to rewrite there, but any section-scoped bookkeeping the
        // preference carries would be cleaned up here too.
        let _ = pref;
    }

    info!("action applier: removed section '{section_id}'");
    Ok(())
}

/// Picks a teacher for a SPLIT/ADD new section: another teacher of the
/// same course with headroom, else a department peer with headroom, else
/// the original teacher if it still has headroom, else refused.
fn pick_teacher_for_new_section(
    catalog: &MutableCatalog,
    template: &Section,
) -> Result<Option<TeacherId>, String> {
    let cap = catalog.policy.teacher_section_cap as usize;
    let sections_per_teacher = |teacher_id: &TeacherId| {
        catalog
            .sections
            .iter()
            .filter(|s| s.teacher_id.as_ref() == Some(teacher_id))
            .count()
    };

    let same_course_peer = catalog
        .sections
        .iter()
        .filter(|s| s.course_id == template.course_id)
        .filter_map(|s| s.teacher_id.as_ref())
        .find(|t| template.teacher_id.as_ref() != Some(*t) && sections_per_teacher(t) < cap);
    if let Some(t) = same_course_peer {
        return Ok(Some(t.clone()));
    }

    if let Some(department) = &template.department {
        // Full roster, not just teachers who already hold a section in
        // this department — a department peer with zero current sections
        // there is still a valid pick.
        let dept_peer = catalog
            .teachers
            .iter()
            .filter(|t| &t.department == department)
            .map(|t| &t.id)
            .find(|t| template.teacher_id.as_ref() != Some(*t) && sections_per_teacher(t) < cap);
        if let Some(t) = dept_peer {
            return Ok(Some(t.clone()));
        }
    }

    if let Some(original) = &template.teacher_id {
        if sections_per_teacher(original) < cap {
            return Ok(Some(original.clone()));
        }
    }

    Err(format!(
        "no teacher available under the {cap}-section cap for a new section of course '{}'",
        template.course_id
    ))
}

/// Next free `S###` id: one past the highest numeric suffix among all
/// current section ids (`SectionId::numeric_part` tolerates `S002_B`).
fn next_section_id(sections: &[Section]) -> SectionId {
    let max = sections
        .iter()
        .filter_map(|s| s.id.numeric_part())
        .max()
        .unwrap_or(0);
    SectionId(format!("S{:03}", max + 1))
}

/// `SPLIT(s)` — forbidden unless `capacity(s) > 30` and both halves end up
/// `>= 15`. The new section gets the template's course/department and a
/// teacher picked by `pick_teacher_for_new_section`.
fn apply_split(catalog: &mut MutableCatalog, section_id: &SectionId) -> Result<(), String> {
    let template = find_section(catalog.sections, section_id)
        .ok_or_else(|| format!("unknown section '{section_id}'"))?
        .clone();

    if template.capacity <= 30 {
        return Err(format!(
            "capacity {} is not > 30, cannot split",
            template.capacity
        ));
    }
    let half_a = template.capacity / 2;
    let half_b = template.capacity - half_a;
    if half_a < 15 || half_b < 15 {
        return Err(format!(
            "split halves ({half_a}, {half_b}) would fall below the 15-seat floor"
        ));
    }

    let new_teacher = pick_teacher_for_new_section(catalog, &template)?;
    let new_id = next_section_id(catalog.sections);

    let idx = section_index(catalog.sections, section_id).unwrap();
    catalog.sections[idx].capacity = half_a;

    let mut new_section = Section::new(new_id.clone(), template.course_id.clone(), half_b);
    new_section.department = template.department.clone();
    new_section.teacher_id = new_teacher;
    catalog.sections.push(new_section);

    info!("action applier: split '{section_id}' into '{section_id}' ({half_a}) and '{new_id}' ({half_b})");
    Ok(())
}

/// `ADD(template_s)` — new section with the template's course/department,
/// a default capacity by department, and a teacher picked the same way as
/// SPLIT.
fn apply_add(catalog: &mut MutableCatalog, template_id: &SectionId) -> Result<(), String> {
    let template = find_section(catalog.sections, template_id)
        .ok_or_else(|| format!("unknown template section '{template_id}'"))?
        .clone();

    let new_teacher = pick_teacher_for_new_section(catalog, &template)?;
    let new_id = next_section_id(catalog.sections);
    let capacity = catalog
        .policy
        .default_capacity_for_department(template.department.as_deref());

    let mut new_section = Section::new(new_id.clone(), template.course_id.clone(), capacity);
    new_section.department = template.department.clone();
    new_section.teacher_id = new_teacher;
    catalog.sections.push(new_section);

    info!(
        "action applier: added '{new_id}' (course '{}', capacity {capacity}) from template '{template_id}'",
        template.course_id
    );
    Ok(())
}

/// True when no section id in `after` was already present in `before` with
/// a different shape and nothing structural moved — used by the driver's
/// no-structural-change termination guard (§4.6). Compares section ids and
/// capacities, since those are the only fields actions can change.
pub fn catalogs_structurally_equal(before: &[Section], after: &[Section]) -> bool {
    if before.len() != after.len() {
        return false;
    }
    let mut before_sorted: Vec<_> = before.iter().map(|s| (&s.id, s.capacity)).collect();
    let mut after_sorted: Vec<_> = after.iter().map(|s| (&s.id, s.capacity)).collect();
    before_sorted.sort();
    after_sorted.sort();
    before_sorted == after_sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CourseId, PolicyConfig, TeacherId};

    fn section(id: &str, course: &str, capacity: u32, teacher: &str) -> Section {
        let mut s = Section::new(SectionId(id.into()), CourseId(course.into()), capacity);
        s.teacher_id = Some(TeacherId(teacher.into()));
        s
    }

    #[test]
    fn merge_sums_capacity_and_caps_at_policy_ceiling() {
        let mut sections = vec![
            section("S001", "MATH101", 20, "T1"),
            section("S002", "MATH101", 20, "T2"),
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
                reason: None,
            }],
        );

        assert_eq!(report.applied, 1);
        assert!(report.changed);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].capacity, 35);
    }

    #[test]
    fn remove_refused_when_only_section_of_course() {
        let mut sections = vec![section("S001", "MATH101", 20, "T1")];
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
                action: ActionKind::Remove,
                merge_with: None,
                reason: None,
            }],
        );

        assert_eq!(report.applied, 0);
        assert_eq!(report.refused, 1);
        assert!(!report.changed);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn split_refused_below_capacity_floor() {
        let mut sections = vec![
            section("S001", "MATH101", 28, "T1"),
            section("S002", "MATH101", 10, "T2"),
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
                action: ActionKind::Split,
                merge_with: None,
                reason: None,
            }],
        );

        assert_eq!(report.refused, 1);
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn split_accepted_above_capacity_floor_mints_next_id() {
        let mut sections = vec![
            section("S001", "MATH101", 32, "T1"),
            section("S002", "MATH101", 20, "T2"),
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
                action: ActionKind::Split,
                merge_with: None,
                reason: None,
            }],
        );

        assert_eq!(report.applied, 1);
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().any(|s| s.id == SectionId("S003".into())));
    }

    #[test]
    fn add_uses_department_default_capacity() {
        let mut sections = vec![{
            let mut s = section("S001", "Biology", 30, "T1");
            s.department = Some("Science".to_string());
            s
        }];
        let mut preferences = vec![];
        let policy = PolicyConfig::default();
        let mut catalog = MutableCatalog {
            sections: &mut sections,
            preferences: &mut preferences,
            teachers: &[],
            policy: &policy,
        };

        apply_actions(
            &mut catalog,
            &[ProposedAction {
                section_id: SectionId("S001".into()),
                action: ActionKind::Add,
                merge_with: None,
                reason: None,
            }],
        );

        let added = sections.iter().find(|s| s.id == SectionId("S002".into())).unwrap();
        assert_eq!(added.capacity, 30);
    }

    #[test]
    fn add_picks_a_department_peer_with_no_current_sections_there() {
        // T1 teaches the only Biology section; T2 is a Science-department
        // teacher who doesn't currently teach any section at all. ADD must
        // still be able to pick T2 as a department peer.
        let mut sections = vec![{
            let mut s = section("S001", "Biology", 30, "T1");
            s.department = Some("Science".to_string());
            s
        }];
        let teachers = vec![
            Teacher::new(TeacherId("T1".into()), "Science"),
            Teacher::new(TeacherId("T2".into()), "Science"),
        ];
        let mut preferences = vec![];
        let policy = PolicyConfig::default();
        let mut catalog = MutableCatalog {
            sections: &mut sections,
            preferences: &mut preferences,
            teachers: &teachers,
            policy: &policy,
        };

        apply_actions(
            &mut catalog,
            &[ProposedAction {
                section_id: SectionId("S001".into()),
                action: ActionKind::Add,
                merge_with: None,
                reason: None,
            }],
        );

        let added = sections.iter().find(|s| s.id == SectionId("S002".into())).unwrap();
        assert_eq!(added.teacher_id, Some(TeacherId("T2".into())));
    }

    #[test]
    fn add_refused_when_every_candidate_teacher_is_at_the_section_cap() {
        let mut policy = PolicyConfig::default();
        policy.teacher_section_cap = 1;
        let mut sections = vec![section("S001", "Biology", 30, "T1")];
        let mut preferences = vec![];
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
                action: ActionKind::Add,
                merge_with: None,
                reason: None,
            }],
        );

        assert_eq!(report.refused, 1);
        assert_eq!(sections.len(), 1, "refused action must not mutate the catalog");
    }

    #[test]
    fn repeated_splits_never_collide_on_section_id() {
        let mut sections = vec![
            section("S001", "Biology", 40, "T1"),
            section("S002", "Biology", 10, "T2"),
        ];
        let mut preferences = vec![];
        let policy = PolicyConfig::default();
        let mut catalog = MutableCatalog {
            sections: &mut sections,
            preferences: &mut preferences,
            teachers: &[],
            policy: &policy,
        };

        // Split S001, then split the half that's still big enough.
        apply_actions(
            &mut catalog,
            &[ProposedAction {
                section_id: SectionId("S001".into()),
                action: ActionKind::Split,
                merge_with: None,
                reason: None,
            }],
        );
        let mut ids: Vec<_> = sections.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), sections.len(), "no two sections share an id after SPLIT");
        assert!(sections.iter().any(|s| s.id == SectionId("S003".into())));
    }
}
