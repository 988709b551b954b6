// File: src/model/extract.rs
// Due date policy on top of a DateResolver, and title cleanup.
use crate::config::ResolvedOptions;
use crate::model::dates::{CandidateDate, DateResolver};
use crate::model::item::DueDate;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const TITLE_FALLBACK_CHARS: usize = 140;

static DUE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:due|by):?\s*([^.;]+)").unwrap());
static DUE_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:due|by|deadline)(?::|\s)").unwrap());
static TRAILING_DATED_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^()]*\d[^()]*\)\s*$").unwrap());
static LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|[A-Za-z]\)|\d+[.)])\s*").unwrap());
static DANGLING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s(\-:,;]+$").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Per-call snapshot of everything the date policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateContext {
    pub anchor: NaiveDateTime,
    pub now: NaiveDateTime,
    pub academic_year: i32,
    pub semester_start_month: u32,
    pub default_due_time: NaiveTime,
    pub accept_past_dates: bool,
}

impl DateContext {
    /// Fixes the anchor and "now" in the configured timezone at `now`.
    pub fn new(options: &ResolvedOptions, now: DateTime<Utc>) -> Self {
        let anchor = options.anchor(now);
        Self {
            anchor,
            now: now.with_timezone(&options.timezone).naive_local(),
            academic_year: options.academic_year(anchor),
            semester_start_month: options.semester_start_month,
            default_due_time: options.default_due_time,
            accept_past_dates: options.accept_past_dates,
        }
    }

    /// Months before the semester start belong to the following calendar year.
    /// `None` when the day does not exist in that year (Feb 29).
    fn infer_year(&self, date: NaiveDate) -> Option<NaiveDate> {
        let year = if date.month() < self.semester_start_month {
            self.academic_year + 1
        } else {
            self.academic_year
        };
        NaiveDate::from_ymd_opt(year, date.month(), date.day())
    }

    fn finalize(&self, candidate: &CandidateDate) -> Option<NaiveDateTime> {
        let date = if candidate.year_certain {
            candidate.date
        } else {
            self.infer_year(candidate.date)?
        };
        let due = date.and_time(candidate.time.unwrap_or(self.default_due_time));
        if !self.accept_past_dates && due < self.now {
            log::trace!("Discarding past due date {}", due);
            return None;
        }
        Some(due)
    }
}

/// Text following the first `due`/`by` marker, up to the next period or semicolon.
fn due_marker_tail(text: &str) -> Option<&str> {
    DUE_MARKER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The last date mentioned in the block wins ("opens Sept 1, due Sept 8").
pub fn extract_due<R: DateResolver + ?Sized>(text: &str, ctx: &DateContext, resolver: &R) -> DueDate {
    let mut candidates = resolver.resolve(text, ctx.anchor, true);
    if candidates.is_empty()
        && let Some(tail) = due_marker_tail(text)
    {
        candidates = resolver.resolve(tail, ctx.anchor, true);
    }

    candidates
        .last()
        .and_then(|c| ctx.finalize(c))
        .map_or(DueDate::Tbd, DueDate::At)
}

/// Whether the text announces a deadline ("due", "by", "deadline").
pub fn has_due_phrase(text: &str) -> bool {
    DUE_PHRASE.is_match(text)
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn clean_title(raw: &str) -> String {
    let mut title = LEADING_MARKER.replace(raw, "").into_owned();
    if let Some(m) = DUE_PHRASE.find(&title) {
        title.truncate(m.start());
    }
    title = TRAILING_DATED_PAREN.replace(&title, "").into_owned();
    title = DANGLING.replace(&title, "").into_owned();
    title = MULTI_SPACE.replace_all(title.trim(), " ").into_owned();

    if title.is_empty() {
        let fallback: String = raw.chars().take(TITLE_FALLBACK_CHARS).collect();
        return fallback.trim_end().to_string();
    }
    capitalize_first(&title)
}
