// File: src/model/parser.rs
// Syllabus text -> deduplicated assignment records.
//
// Stages, in order:
//   normalize -> split lines -> drop header noise -> segment into blocks
//   per block: classify type, extract due date, clean title, score
//   keep blocks that look like assignments (typed, a dated deadline, or a
//   chapter reference), then drop duplicate (title, due) pairs.
//
// Everything here is pure: the only clock read is the single `Utc::now()`
// taken at the start of `parse`, which anchors relative dates when no
// reference date is configured.

use crate::config::{ParseOptions, ResolvedOptions};
use crate::model::block::{Block, blocks_from_text};
use crate::model::classify::{classify, mentions_chapter, score};
use crate::model::dates::{DateResolver, EnglishDateResolver};
use crate::model::extract::{DateContext, clean_title, extract_due, has_due_phrase};
use crate::model::item::{Difficulty, ParsedAssignment};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct SyllabusParser<R = EnglishDateResolver> {
    options: ResolvedOptions,
    resolver: R,
}

impl SyllabusParser<EnglishDateResolver> {
    pub fn new(options: &ParseOptions) -> Result<Self> {
        Self::with_resolver(options, EnglishDateResolver)
    }
}

impl<R: DateResolver> SyllabusParser<R> {
    /// Same pipeline, different date resolver.
    pub fn with_resolver(options: &ParseOptions, resolver: R) -> Result<Self> {
        Ok(Self {
            options: options.resolve()?,
            resolver,
        })
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn parse(&self, raw_text: &str) -> Vec<ParsedAssignment> {
        self.parse_at(raw_text, Utc::now())
    }

    /// `parse` with an explicit wall-clock, for callers that need repeatable "now".
    pub fn parse_at(&self, raw_text: &str, now: DateTime<Utc>) -> Vec<ParsedAssignment> {
        let text = self.cap_input(raw_text);
        let ctx = DateContext::new(&self.options, now);

        let assembled: Vec<ParsedAssignment> = blocks_from_text(text)
            .into_iter()
            .filter_map(|block| self.assemble(block, &ctx))
            .collect();
        log::debug!("Assembled {} candidate assignments", assembled.len());

        dedup(assembled)
    }

    fn cap_input<'a>(&self, raw_text: &'a str) -> &'a str {
        match raw_text.char_indices().nth(self.options.max_input_chars) {
            Some((cut, _)) => {
                log::warn!(
                    "Syllabus text exceeds {} characters, ignoring the rest",
                    self.options.max_input_chars
                );
                &raw_text[..cut]
            }
            None => raw_text,
        }
    }

    fn assemble(&self, block: Block, ctx: &DateContext) -> Option<ParsedAssignment> {
        let detected = classify(&block.text);
        let due_date = extract_due(&block.text, ctx, &self.resolver);

        // A bare date ("Guest speaker Sept 20") is not enough; it has to be a deadline.
        let dated_deadline = !due_date.is_tbd() && has_due_phrase(&block.text);
        if detected.is_none() && !dated_deadline && !mentions_chapter(&block.text) {
            log::trace!("Dropping block {:?}", block.text);
            return None;
        }

        let kind = detected.unwrap_or_default();
        Some(ParsedAssignment {
            title: clean_title(&block.text),
            confidence: score(&block.text, detected, &due_date),
            due_date,
            kind,
            difficulty: Difficulty::default_for(kind),
            source_lines: block.source_line_indices,
        })
    }
}

/// Keeps the first record for each (lowercase title, due date) pair, in order.
pub fn dedup(records: Vec<ParsedAssignment>) -> Vec<ParsedAssignment> {
    let mut seen = HashSet::new();
    let before = records.len();
    let unique: Vec<ParsedAssignment> = records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect();
    if unique.len() < before {
        log::debug!("Dropped {} duplicate assignments", before - unique.len());
    }
    unique
}

/// Parses pasted syllabus text into assignment records ready for review.
///
/// Fails only when `options` is invalid; unreadable text degrades to fewer
/// records or `"TBD"` due dates.
pub fn parse_syllabus(raw_text: &str, options: &ParseOptions) -> Result<Vec<ParsedAssignment>> {
    Ok(SyllabusParser::new(options)?.parse(raw_text))
}
