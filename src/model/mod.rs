// File: ./src/model/mod.rs
pub mod block;
pub mod classify;
pub mod dates;
pub mod extract;
pub mod item;
pub mod parser;

pub use block::{Block, Line};
pub use dates::{CandidateDate, DateResolver, EnglishDateResolver};
pub use item::{AssignmentType, Difficulty, DueDate, ParsedAssignment, REVIEW_THRESHOLD};
pub use parser::{SyllabusParser, parse_syllabus};
