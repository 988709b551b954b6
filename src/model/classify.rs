// File: src/model/classify.rs
// Keyword based type classification and the confidence heuristic.
use crate::model::block::starts_with_bullet;
use crate::model::item::{AssignmentType, DueDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Checked top to bottom, first match wins. "Quiz on project 2" is a quiz.
pub const TYPE_KEYWORDS: &[(AssignmentType, &[&str])] = &[
    (AssignmentType::Quiz, &["quiz", "quizzes", "pop quiz"]),
    (
        AssignmentType::Project,
        &["project", "projects", "proposal", "presentation", "capstone"],
    ),
    (
        AssignmentType::Exam,
        &["exam", "exams", "midterm", "midterms", "final", "test", "tests"],
    ),
    (
        AssignmentType::Homework,
        &[
            "homework",
            "hw",
            "assignment",
            "assignments",
            "problem set",
            "pset",
            "worksheet",
            "essay",
            "lab",
            "labs",
            "reading",
            "exercise",
            "exercises",
        ],
    ),
];

static TYPE_MATCHERS: Lazy<Vec<(AssignmentType, Regex)>> = Lazy::new(|| {
    TYPE_KEYWORDS
        .iter()
        .map(|(kind, words)| {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&format!(r"\b(?:{})\b", alternation)).unwrap();
            (*kind, re)
        })
        .collect()
});

static COURSEWORK_TERMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:chapter|lab|assign(?:ment)?|unit)\b").unwrap());
static TYPE_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:quiz|exam|project|hw)\b").unwrap());
static CHAPTER_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bchapter").unwrap());

/// Returns the first type whose keywords appear in the text, if any.
pub fn classify(text: &str) -> Option<AssignmentType> {
    let lower = text.to_lowercase();
    TYPE_MATCHERS
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(kind, _)| *kind)
}

pub fn mentions_chapter(text: &str) -> bool {
    CHAPTER_REF.is_match(text)
}

/// Additive heuristic in [0, 1].
pub fn score(text: &str, detected: Option<AssignmentType>, due: &DueDate) -> f64 {
    let mut s = 0.0;
    if detected.is_some() {
        s += 0.5;
    }
    if !due.is_tbd() {
        s += 0.3;
    }
    if COURSEWORK_TERMS.is_match(text) {
        s += 0.1;
    }
    if starts_with_bullet(text) {
        s += 0.05;
    }
    if TYPE_WORDS.is_match(text) {
        s += 0.05;
    }
    f64::clamp(s, 0.0, 1.0)
}
