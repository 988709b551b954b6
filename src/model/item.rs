// File: src/model/item.rs
// Output records produced by the syllabus parser.
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::EnumIter;

/// Records scoring below this are expected to get a human look before anything is created.
pub const REVIEW_THRESHOLD: f64 = 0.5;

const DUE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TBD: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    #[default]
    Homework,
    Quiz,
    Project,
    Exam,
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentType::Homework => write!(f, "homework"),
            AssignmentType::Quiz => write!(f, "quiz"),
            AssignmentType::Project => write!(f, "project"),
            AssignmentType::Exam => write!(f, "exam"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Moderate,
    Crushing,
    Brutal,
}

impl Difficulty {
    /// Placeholder difficulty for a freshly parsed record. Reviewers are expected to edit it.
    pub fn default_for(kind: AssignmentType) -> Self {
        match kind {
            AssignmentType::Exam => Difficulty::Crushing,
            AssignmentType::Project => Difficulty::Brutal,
            AssignmentType::Homework | AssignmentType::Quiz => Difficulty::Moderate,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Moderate => write!(f, "moderate"),
            Difficulty::Crushing => write!(f, "crushing"),
            Difficulty::Brutal => write!(f, "brutal"),
        }
    }
}

/// Due date of a parsed assignment: a local wall-clock minute, or "TBD".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DueDate {
    #[default]
    Tbd,
    At(NaiveDateTime),
}

impl DueDate {
    pub fn is_tbd(&self) -> bool {
        matches!(self, DueDate::Tbd)
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            DueDate::Tbd => None,
            DueDate::At(dt) => Some(*dt),
        }
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Tbd => write!(f, "{}", TBD),
            DueDate::At(dt) => write!(f, "{}", dt.format(DUE_FORMAT)),
        }
    }
}

impl FromStr for DueDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == TBD {
            return Ok(DueDate::Tbd);
        }
        NaiveDateTime::parse_from_str(s, DUE_FORMAT)
            .map(DueDate::At)
            .map_err(|e| format!("Invalid due date '{}': {}", s, e))
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAssignment {
    pub title: String,
    pub due_date: DueDate,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub difficulty: Difficulty,
    pub confidence: f64,
    pub source_lines: Vec<usize>,
}

impl ParsedAssignment {
    pub fn needs_review(&self) -> bool {
        self.confidence < REVIEW_THRESHOLD
    }

    /// Identity used when collapsing duplicates: lowercase title plus due date.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.title.to_lowercase(), self.due_date)
    }
}
