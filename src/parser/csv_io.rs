use crate::error::{Result, SchedulerError};
use crate::types::{
    CourseId, Period, PeriodId, PolicyConfig, Schedule, Section, SectionId, Student, StudentId,
    StudentPreference, Teacher, TeacherId,
};
use crate::utilization::UtilizationRow;
use chrono::NaiveTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Everything the greedy constructor and MILP builder need, loaded fresh
/// from a directory of CSV files at the start of each iteration.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub periods: Vec<Period>,
    pub teachers: Vec<Teacher>,
    pub students: Vec<Student>,
    pub sections: Vec<Section>,
    pub preferences: Vec<StudentPreference>,
    pub policy: PolicyConfig,
}

pub fn load_catalog_from_dir(dir: &Path) -> Result<Catalog> {
    let periods = load_periods(&dir.join("Period.csv"))?;
    let teachers = load_teachers(
        &dir.join("Teacher_Info.csv"),
        &dir.join("Teacher_unavailability.csv"),
        &periods,
    )?;
    let students = load_students(&dir.join("Student_Info.csv"))?;
    let sections = load_sections(&dir.join("Sections_Information.csv"))?;
    let preferences = load_preferences(&dir.join("Student_Preference_Info.csv"))?;
    let policy = PolicyConfig::load_or_default(&dir.join("scheduler.toml"))?;

    Ok(Catalog {
        periods,
        teachers,
        students,
        sections,
        preferences,
        policy,
    })
}

fn csv_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            SchedulerError::FileRead {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            }
            .into()
        })
}

fn parse_bool_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "y"
    )
}

fn split_list(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    #[serde(rename = "Period ID")]
    period_id: Option<String>,
    #[serde(rename = "Period Name")]
    period_name: Option<String>,
    #[serde(rename = "Start Time")]
    start_time: Option<String>,
    #[serde(rename = "End Time")]
    end_time: Option<String>,
    #[serde(rename = "Day of Week")]
    day_of_week: Option<u8>,
}

fn parse_time(raw: Option<&str>, default: NaiveTime) -> NaiveTime {
    raw.and_then(|s| {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M").or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S")).ok()
    })
    .unwrap_or(default)
}

fn load_periods(path: &Path) -> Result<Vec<Period>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv_reader(path)?;
    let mut periods = Vec::new();
    for row in reader.deserialize::<PeriodRow>() {
        let row = row.map_err(|e| SchedulerError::JsonParse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = row
            .period_name
            .or(row.period_id.clone())
            .unwrap_or_default();
        let id = row.period_id.unwrap_or_else(|| name.clone());
        let default_start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let default_end = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        periods.push(Period {
            id: PeriodId(id),
            name,
            start: parse_time(row.start_time.as_deref(), default_start),
            end: parse_time(row.end_time.as_deref(), default_end),
            day_of_week: row.day_of_week.unwrap_or(0),
        });
    }
    Ok(periods)
}

#[derive(Debug, Deserialize)]
struct TeacherRow {
    #[serde(rename = "Teacher ID")]
    teacher_id: String,
    #[serde(rename = "First Name")]
    first_name: Option<String>,
    #[serde(rename = "Last Name")]
    last_name: Option<String>,
    #[serde(rename = "Email")]
    email: Option<String>,
    #[serde(rename = "Department")]
    department: Option<String>,
    #[serde(rename = "Max Sections")]
    max_sections: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct UnavailabilityRow {
    #[serde(rename = "Teacher ID")]
    teacher_id: String,
    #[serde(rename = "Unavailable Periods")]
    unavailable_periods: Option<String>,
}

fn load_teachers(
    teacher_path: &Path,
    unavailability_path: &Path,
    periods: &[Period],
) -> Result<Vec<Teacher>> {
    let name_to_id: HashMap<&str, &PeriodId> =
        periods.iter().map(|p| (p.name.as_str(), &p.id)).collect();

    let mut unavailable_by_teacher: HashMap<String, std::collections::HashSet<PeriodId>> =
        HashMap::new();
    if unavailability_path.exists() {
        let mut reader = csv_reader(unavailability_path)?;
        for row in reader.deserialize::<UnavailabilityRow>() {
            let row = row.map_err(|e| SchedulerError::JsonParse {
                file: unavailability_path.display().to_string(),
                message: e.to_string(),
            })?;
            let entry = unavailable_by_teacher.entry(row.teacher_id).or_default();
            for name in split_list(&row.unavailable_periods.unwrap_or_default(), ',') {
                if let Some(id) = name_to_id.get(name.as_str()) {
                    entry.insert((*id).clone());
                }
            }
        }
    }

    let mut reader = csv_reader(teacher_path)?;
    let mut teachers = Vec::new();
    for row in reader.deserialize::<TeacherRow>() {
        let row = row.map_err(|e| SchedulerError::JsonParse {
            file: teacher_path.display().to_string(),
            message: e.to_string(),
        })?;
        teachers.push(Teacher {
            id: TeacherId(row.teacher_id.clone()),
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            department: row.department.unwrap_or_default(),
            max_sections: row.max_sections.unwrap_or(5),
            unavailable_periods: unavailable_by_teacher
                .remove(&row.teacher_id)
                .unwrap_or_default(),
        });
    }
    Ok(teachers)
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    #[serde(rename = "Student ID")]
    student_id: String,
    #[serde(rename = "First Name")]
    first_name: Option<String>,
    #[serde(rename = "Last Name")]
    last_name: Option<String>,
    #[serde(rename = "Email")]
    email: Option<String>,
    #[serde(rename = "Grade Level")]
    grade_level: Option<u8>,
    #[serde(rename = "SPED")]
    sped: Option<String>,
}

fn load_students(path: &Path) -> Result<Vec<Student>> {
    let mut reader = csv_reader(path)?;
    let mut students = Vec::new();
    for row in reader.deserialize::<StudentRow>() {
        let row = row.map_err(|e| SchedulerError::JsonParse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        students.push(Student {
            id: StudentId(row.student_id),
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            grade_level: row.grade_level.unwrap_or(9),
            has_special_needs: row.sped.map(|s| parse_bool_flag(&s)).unwrap_or(false),
        });
    }
    Ok(students)
}

#[derive(Debug, Deserialize)]
struct SectionRow {
    #[serde(rename = "Section ID")]
    section_id: String,
    #[serde(rename = "Course ID")]
    course_id: String,
    #[serde(rename = "Teacher Assigned")]
    teacher_assigned: Option<String>,
    #[serde(rename = "Department")]
    department: Option<String>,
    #[serde(rename = "# of Seats Available")]
    seats_available: Option<u32>,
    #[serde(rename = "Room")]
    room: Option<String>,
}

fn load_sections(path: &Path) -> Result<Vec<Section>> {
    let mut reader = csv_reader(path)?;
    let mut sections = Vec::new();
    for row in reader.deserialize::<SectionRow>() {
        let row = row.map_err(|e| SchedulerError::JsonParse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        let capacity = row.seats_available.unwrap_or(25);
        if capacity == 0 {
            return Err(SchedulerError::InvalidCapacity {
                section_id: row.section_id,
                capacity,
            }
            .into());
        }
        let mut section = Section::new(SectionId(row.section_id), CourseId(row.course_id), capacity);
        section.teacher_id = row
            .teacher_assigned
            .filter(|s| !s.trim().is_empty())
            .map(TeacherId);
        section.department = row.department.filter(|s| !s.trim().is_empty());
        section.room = row.room.filter(|s| !s.trim().is_empty());
        sections.push(section);
    }
    Ok(sections)
}

#[derive(Debug, Deserialize)]
struct PreferenceRow {
    #[serde(rename = "Student ID")]
    student_id: String,
    #[serde(rename = "Preferred Sections")]
    preferred_sections: Option<String>,
    #[serde(rename = "Required Sections")]
    required_sections: Option<String>,
}

fn load_preferences(path: &Path) -> Result<Vec<StudentPreference>> {
    let mut reader = csv_reader(path)?;
    let mut preferences = Vec::new();
    for row in reader.deserialize::<PreferenceRow>() {
        let row = row.map_err(|e| SchedulerError::JsonParse {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut pref = StudentPreference::new(StudentId(row.student_id));
        pref.preferred_courses = split_list(&row.preferred_sections.unwrap_or_default(), ';')
            .into_iter()
            .map(CourseId)
            .collect();
        pref.required_courses = split_list(&row.required_sections.unwrap_or_default(), ';')
            .into_iter()
            .map(CourseId)
            .collect();
        preferences.push(pref);
    }
    Ok(preferences)
}

fn csv_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(csv::Writer::from_path(path)?)
}

#[derive(Debug, serde::Serialize)]
struct MasterScheduleRow<'a> {
    #[serde(rename = "Section ID")]
    section_id: &'a str,
    #[serde(rename = "Course ID")]
    course_id: &'a str,
    #[serde(rename = "Teacher ID")]
    teacher_id: &'a str,
    #[serde(rename = "Period")]
    period: &'a str,
    #[serde(rename = "Capacity")]
    capacity: u32,
    #[serde(rename = "Room")]
    room: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct StudentAssignmentRow<'a> {
    #[serde(rename = "Student ID")]
    student_id: &'a str,
    #[serde(rename = "Section ID")]
    section_id: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct TeacherScheduleRow<'a> {
    #[serde(rename = "Teacher ID")]
    teacher_id: &'a str,
    #[serde(rename = "Section ID")]
    section_id: &'a str,
    #[serde(rename = "Course ID")]
    course_id: &'a str,
    #[serde(rename = "Period")]
    period: &'a str,
}

/// Writes the four output CSVs for one iteration (or the final snapshot)
/// into `dir`, creating it if needed.
pub fn write_reports(
    dir: &Path,
    schedule: &Schedule,
    periods_by_id: &HashMap<PeriodId, &Period>,
    utilization: &[UtilizationRow],
) -> Result<()> {
    let mut master = csv_writer(&dir.join("Master_Schedule.csv"))?;
    let mut teacher_schedule = csv_writer(&dir.join("Teacher_Schedule.csv"))?;
    for section in schedule.sections.values() {
        let period_name = section
            .period_id
            .as_ref()
            .and_then(|id| periods_by_id.get(id))
            .map(|p| p.name.as_str())
            .unwrap_or("");
        master.serialize(MasterScheduleRow {
            section_id: &section.id.0,
            course_id: &section.course_id.0,
            teacher_id: section.teacher_id.as_ref().map(|t| t.0.as_str()).unwrap_or(""),
            period: period_name,
            capacity: section.capacity,
            room: section.room.as_deref().unwrap_or(""),
        })?;
        if let Some(teacher_id) = &section.teacher_id {
            teacher_schedule.serialize(TeacherScheduleRow {
                teacher_id: &teacher_id.0,
                section_id: &section.id.0,
                course_id: &section.course_id.0,
                period: period_name,
            })?;
        }
    }
    master.flush()?;
    teacher_schedule.flush()?;

    let mut assignments = csv_writer(&dir.join("Student_Assignments.csv"))?;
    for assignment in &schedule.assignments {
        assignments.serialize(StudentAssignmentRow {
            student_id: &assignment.student_id.0,
            section_id: &assignment.section_id.0,
        })?;
    }
    assignments.flush()?;

    let mut util_writer = csv_writer(&dir.join("Utilization_Report.csv"))?;
    for row in utilization {
        util_writer.serialize(row)?;
    }
    util_writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sped_flags_case_insensitively() {
        for flag in ["Yes", "true", "1", "y", "TRUE"] {
            assert!(parse_bool_flag(flag), "expected {flag} to parse as true");
        }
        for flag in ["No", "false", "0", "n", ""] {
            assert!(!parse_bool_flag(flag), "expected {flag} to parse as false");
        }
    }

    #[test]
    fn splits_semicolon_lists_and_trims() {
        assert_eq!(
            split_list("MATH101; ART101 ;SCI101", ';'),
            vec!["MATH101", "ART101", "SCI101"]
        );
        assert!(split_list("", ';').is_empty());
    }

    #[test]
    fn load_sections_rejects_a_literal_zero_capacity() {
        let dir = std::env::temp_dir().join(format!(
            "scheduler_csv_io_test_{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Sections_Information.csv");
        fs::write(
            &path,
            concat!(
                "Section ID,Course ID,Teacher Assigned,Department,# of Seats Available,Room\n",
                "S001,MATH101,T1,Math,0,101\n",
            ),
        )
        .unwrap();

        let result = load_sections(&path);
        assert!(result.is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
