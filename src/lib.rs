//! School Scheduler - master scheduling for a secondary school.
//!
//! # Pipeline
//!
//! 1. **Greedy constructor** (`scheduler::greedy`): a priority-driven heuristic
//!    that builds a full section→period and student→section assignment under
//!    every hard constraint, used standalone or as a MILP warm start.
//! 2. **MILP model** (`scheduler::milp`): the same problem as a mixed-integer
//!    linear program, solved with `good_lp` over the `highs` backend.
//! 3. **Utilization analysis** (`utilization`) and the **action applier**
//!    (`actions`): detect underutilized sections and apply SPLIT/ADD/REMOVE/
//!    MERGE mutations proposed by an `oracle::Oracle`.
//! 4. **Iteration driver** (`driver`): the fixed-point loop tying the above
//!    together across iterations, writing artifacts as it goes.
//!
//! # Example
//!
//! ```no_run
//! use school_scheduler::parser::load_catalog_from_dir;
//! use school_scheduler::scheduler::greedy::build_schedule;
//! use std::path::Path;
//!
//! let catalog = load_catalog_from_dir(Path::new("./data/demo")).unwrap();
//! let schedule = build_schedule(&catalog);
//! println!("assignments: {}", schedule.total_assignments());
//! ```

pub mod actions;
pub mod driver;
pub mod error;
pub mod oracle;
pub mod parser;
pub mod reporter;
pub mod scheduler;
pub mod types;
pub mod utilization;
pub mod validator;

pub use error::{Result, SchedulerError};
