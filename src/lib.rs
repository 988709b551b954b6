// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod context;
pub mod model;

pub use config::ParseOptions;
pub use model::{ParsedAssignment, SyllabusParser, parse_syllabus};
