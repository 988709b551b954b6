// File: src/model/block.rs
// Text preparation: normalization, line splitting, header filtering and block segmentation.
use once_cell::sync::Lazy;
use regex::Regex;

/// Lines containing any of these (lowercased) are syllabus furniture, not assignments.
pub const STOP_HEADERS: &[&str] = &[
    "grading",
    "late work",
    "rubric",
    "policies",
    "due date calendar",
    "assignment opens",
    "alert:",
    "academic integrity",
    "accommodations",
    "office hours",
];

const TAB_WIDTH: usize = 4;

/// Starts of lines that always open a new block: bullets, `a)`, `(tag)`, `1.`.
static ITEM_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|[A-Za-z]\)|\(\w+\)|\d+[.)])").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub original_index: usize,
    /// Leading whitespace width before trimming.
    pub indent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub text: String,
    pub source_line_indices: Vec<usize>,
}

impl Block {
    fn open(line: Line) -> Self {
        Self {
            text: line.text,
            source_line_indices: vec![line.original_index],
        }
    }

    fn absorb(&mut self, line: Line) {
        self.text.push(' ');
        self.text.push_str(&line.text);
        self.source_line_indices.push(line.original_index);
    }
}

pub fn starts_with_bullet(text: &str) -> bool {
    text.starts_with(['-', '*', '•'])
}

/// Canonicalizes line endings, dashes and non-breaking spaces, and trims line ends.
pub fn normalize(raw: &str) -> String {
    let unified = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{00A0}', " ");

    unified
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Splits normalized text into trimmed, non-empty lines tagged with their index.
pub fn split_lines(normalized: &str) -> Vec<Line> {
    normalized
        .split('\n')
        .enumerate()
        .filter_map(|(idx, raw)| {
            let text = raw.trim();
            if text.is_empty() {
                return None;
            }
            Some(Line {
                text: text.to_string(),
                original_index: idx,
                indent: indent_width(raw),
            })
        })
        .collect()
}

pub fn is_noise(line: &Line) -> bool {
    let lower = line.text.to_lowercase();
    STOP_HEADERS.iter().any(|h| lower.contains(h))
}

pub fn filter_noise(lines: Vec<Line>) -> Vec<Line> {
    let before = lines.len();
    let kept: Vec<Line> = lines.into_iter().filter(|l| !is_noise(l)).collect();
    log::debug!(
        "Noise filter dropped {} of {} lines",
        before - kept.len(),
        before
    );
    kept
}

fn starts_new_item(line: &Line) -> bool {
    ITEM_START.is_match(&line.text)
}

fn continues(previous_text: &str, line: &Line) -> bool {
    previous_text.ends_with([',', ';', '-'])
        || line.indent >= 2
        || line.text.starts_with(['(', ':'])
}

/// Groups lines into blocks. The open block is always the last one in the accumulator.
pub fn segment(lines: Vec<Line>) -> Vec<Block> {
    lines.into_iter().fold(Vec::new(), |mut blocks: Vec<Block>, line| {
        match blocks.last_mut() {
            Some(open) if !starts_new_item(&line) && continues(&open.text, &line) => {
                open.absorb(line)
            }
            _ => blocks.push(Block::open(line)),
        }
        blocks
    })
}

/// Normalizer, splitter, noise filter and segmenter in sequence.
pub fn blocks_from_text(raw: &str) -> Vec<Block> {
    let lines = filter_noise(split_lines(&normalize(raw)));
    let blocks = segment(lines);
    log::debug!("Segmented into {} blocks", blocks.len());
    blocks
}
