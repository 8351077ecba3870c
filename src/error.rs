use thiserror::Error;

/// Domain-specific errors for the scheduler.
#[derive(Error, Debug)]
pub enum SchedulerError {
    // Input errors — abort the run, no optimization attempted.
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{file}': {message}")]
    JsonParse { file: String, message: String },

    #[error("Student '{student_id}' references unknown course '{course_id}'")]
    UnknownCourse {
        student_id: String,
        course_id: String,
    },

    #[error("Section '{section_id}' references unknown teacher '{teacher_id}'")]
    UnknownTeacher {
        section_id: String,
        teacher_id: String,
    },

    #[error("Duplicate ID found: {id_type} '{id}'")]
    DuplicateId { id_type: String, id: String },

    #[error("Unknown period name '{name}' in course-period restriction table")]
    UnknownPeriodName { name: String },

    #[error("Section '{section_id}' has invalid capacity {capacity} (must be >= 1)")]
    InvalidCapacity { section_id: String, capacity: u32 },

    // Solver errors — caught; driver falls back to the warm-start greedy.
    #[error("MILP solver failed: {0}")]
    SolverFailed(String),

    #[error("No feasible MILP solution found")]
    Infeasible,

    #[error("Solver timeout after {seconds} seconds")]
    SolverTimeout { seconds: u64 },

    // Oracle errors — treated as "propose nothing", non-fatal.
    #[error("Oracle call failed: {0}")]
    OracleFailed(String),

    // Action errors — refused by §4.5 invariants; logged, other actions proceed.
    #[error("Action refused: {0}")]
    ActionRefused(String),

    // Validation errors
    #[error("Schedule violates hard constraint: {0}")]
    HardConstraintViolation(String),
}

/// `anyhow::Result` at application boundaries; `SchedulerError` variants
/// convert into it via `thiserror`'s `std::error::Error` impl.
pub type Result<T> = anyhow::Result<T>;
