mod csv_io;
pub mod demo;
mod validation;

pub use csv_io::{load_catalog_from_dir, write_reports, Catalog};
pub use validation::{validate_catalog, ValidationResult};
