use criterion::{criterion_group, criterion_main, Criterion};
use school_scheduler::parser::Catalog;
use school_scheduler::scheduler::greedy::build_schedule;
use school_scheduler::types::{
    CourseId, Period, PolicyConfig, Section, SectionId, Student, StudentId, StudentPreference,
    Teacher, TeacherId,
};

const COURSES: &[&str] = &[
    "Algebra I", "Geometry", "English 9", "English 10", "Biology", "Chemistry", "World History",
    "Art", "Music", "PE",
];

fn synthetic_catalog(student_count: usize) -> Catalog {
    let periods: Vec<Period> = (0..7).map(|i| Period::new(format!("P{i}"), format!("P{i}"))).collect();

    let teachers: Vec<Teacher> = COURSES
        .iter()
        .enumerate()
        .map(|(i, _)| Teacher::new(TeacherId(format!("T{i:03}")), "General"))
        .collect();

    let mut sections = Vec::new();
    for (i, course) in COURSES.iter().enumerate() {
        for section_n in 0..3 {
            sections.push({
                let mut s = Section::new(
                    SectionId(format!("S{:03}", i * 3 + section_n)),
                    CourseId((*course).to_string()),
                    30,
                );
                s.teacher_id = Some(TeacherId(format!("T{i:03}")));
                s
            });
        }
    }

    let students: Vec<Student> = (0..student_count)
        .map(|i| Student::new(StudentId(format!("U{i:05}")), 10))
        .collect();

    let preferences: Vec<StudentPreference> = students
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut pref = StudentPreference::new(s.id.clone());
            pref.preferred_courses = (0..5)
                .map(|offset| CourseId(COURSES[(i + offset) % COURSES.len()].to_string()))
                .collect();
            pref.required_courses = pref.preferred_courses[..2].to_vec();
            pref
        })
        .collect();

    Catalog {
        periods,
        teachers,
        students,
        sections,
        preferences,
        policy: PolicyConfig::default(),
    }
}

fn bench_greedy(c: &mut Criterion) {
    let small = synthetic_catalog(200);
    c.bench_function("greedy_build_schedule_200_students", |b| {
        b.iter(|| build_schedule(&small))
    });

    let large = synthetic_catalog(2000);
    c.bench_function("greedy_build_schedule_2000_students", |b| {
        b.iter(|| build_schedule(&large))
    });
}

criterion_group!(benches, bench_greedy);
criterion_main!(benches);
