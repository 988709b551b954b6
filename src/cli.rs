// File: ./src/cli.rs
//! Shared command-line interface logic: argument handling, help and output rendering.
use crate::config::{Config, OutputFormat};
use crate::model::ParsedAssignment;
use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE_COLUMNS: usize = 48;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// `None` reads stdin, as does a literal `-`.
    pub input: Option<PathBuf>,
    pub json: bool,
    pub reference: Option<NaiveDate>,
    pub year: Option<i32>,
    pub timezone: Option<String>,
    pub due_time: Option<String>,
    pub no_past: bool,
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parses everything after the binary name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut out = CliArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))
            };
            match arg.as_str() {
                "-h" | "--help" | "help" => out.help = true,
                "--json" => out.json = true,
                "--no-past" => out.no_past = true,
                "-v" | "--verbose" => out.verbose = true,
                "--reference" => {
                    let raw = value(arg.as_str())?;
                    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("Invalid --reference '{}', expected YYYY-MM-DD", raw))?;
                    out.reference = Some(date);
                }
                "--year" => {
                    let raw = value(arg.as_str())?;
                    out.year = Some(
                        raw.parse()
                            .with_context(|| format!("Invalid --year '{}'", raw))?,
                    );
                }
                "--tz" => out.timezone = Some(value(arg.as_str())?),
                "--due-time" => out.due_time = Some(value(arg.as_str())?),
                "-r" | "--root" => out.root = Some(PathBuf::from(value(arg.as_str())?)),
                "-" => out.input = None,
                other if other.starts_with('-') => {
                    return Err(anyhow::anyhow!("Unknown option '{}'", other));
                }
                path => out.input = Some(PathBuf::from(path)),
            }
        }
        Ok(out)
    }

    /// Layers the command-line flags over the options loaded from the config file.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        let options = &mut config.options;
        if let Some(tz) = &self.timezone {
            options.timezone = tz.clone();
        }
        if let Some(t) = &self.due_time {
            options.default_due_time = t.clone();
        }
        if let Some(y) = self.year {
            options.assume_academic_year = Some(y);
        }
        if self.no_past {
            options.accept_past_dates = false;
        }
        if let Some(day) = self.reference {
            let tz: Tz = options
                .timezone
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", options.timezone, e))?;
            let midnight = day
                .and_hms_opt(0, 0, 0)
                .and_then(|dt| tz.from_local_datetime(&dt).earliest())
                .ok_or_else(|| anyhow::anyhow!("Reference date {} does not exist in {}", day, tz))?;
            options.reference_date = Some(midnight.with_timezone(&Utc));
        }
        if self.json {
            config.format = OutputFormat::Json;
        }
        Ok(())
    }
}

fn fit_columns(s: &str, width: usize) -> String {
    if s.width() <= width {
        let pad = width - s.width();
        return format!("{}{}", s, " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// One line per record; records under `review_threshold` are flagged with `!`.
pub fn render_text(records: &[ParsedAssignment], review_threshold: f64) -> String {
    if records.is_empty() {
        return "No assignments found.\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let flag = if r.confidence < review_threshold { '!' } else { ' ' };
        out.push_str(&format!(
            "{} {} {:<16} {:<8} {:<8} {:.2}  lines {:?}\n",
            flag,
            fit_columns(&r.title, TITLE_COLUMNS),
            r.due_date.to_string(),
            r.kind.to_string(),
            r.difficulty.to_string(),
            r.confidence,
            r.source_lines
        ));
    }
    let flagged = records
        .iter()
        .filter(|r| r.confidence < review_threshold)
        .count();
    if flagged > 0 {
        out.push_str(&format!(
            "\n{} of {} records need review before import (marked '!').\n",
            flagged,
            records.len()
        ));
    }
    out
}

pub fn render_json(records: &[ParsedAssignment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn print_help(binary_name: &str) {
    println!(
        "Syllabus v{} - Turn pasted syllabus text into assignment records",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [FILE|-] [OPTIONS]", binary_name);
    println!("    cat syllabus.txt | {} --json", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    <FILE>                 Read syllabus text from FILE (default: stdin).");
    println!("    --json                 Print records as JSON instead of a review table.");
    println!("    --reference <DATE>     Anchor for relative dates, YYYY-MM-DD (default: today).");
    println!("    --year <YEAR>          Academic year the semester starts in.");
    println!("    --tz <ZONE>            IANA timezone (default: America/New_York).");
    println!("    --due-time <HH:MM>     Time used when only a date is given (default: 23:59).");
    println!("    --no-past              Treat dates before now as TBD.");
    println!("    -r, --root <path>      Use a different directory for the config file.");
    println!("    -v, --verbose          Log pipeline details to stderr.");
    println!("    -h, --help             Show this help message.");
    println!();
    let formats: Vec<String> = OutputFormat::iter().map(|f| f.to_string()).collect();
    println!("CONFIG:");
    println!("    Defaults are read from config.toml in the config directory, e.g.");
    println!("        format = \"json\"        # one of: {}", formats.join(", "));
    println!("        review_threshold = 0.5");
    println!("        [options]");
    println!("        timezone = \"America/Chicago\"");
    println!("        semester_start_month = 1");
    println!();
    println!("EXAMPLES:");
    println!("    {} fall.txt --reference 2024-08-20", binary_name);
    println!("    {} spring.txt --year 2025 --no-past --json", binary_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let parsed = CliArgs::parse(&args(&[
            "notes.txt",
            "--json",
            "--reference",
            "2024-08-20",
            "--year",
            "2024",
            "--no-past",
        ]))
        .unwrap();
        assert_eq!(parsed.input, Some(PathBuf::from("notes.txt")));
        assert!(parsed.json);
        assert!(parsed.no_past);
        assert_eq!(parsed.year, Some(2024));
        assert_eq!(parsed.reference, NaiveDate::from_ymd_opt(2024, 8, 20));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(CliArgs::parse(&args(&["--reference", "Aug 20"])).is_err());
        assert!(CliArgs::parse(&args(&["--year"])).is_err());
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_apply_overrides_config() {
        let mut config = Config::default();
        let parsed = CliArgs::parse(&args(&["--reference", "2024-08-20", "--due-time", "17:00"]))
            .unwrap();
        parsed.apply(&mut config).unwrap();
        assert_eq!(config.options.default_due_time, "17:00");
        // Midnight in New York is 04:00 UTC during daylight time.
        assert_eq!(
            config.options.reference_date.unwrap().to_rfc3339(),
            "2024-08-20T04:00:00+00:00"
        );
    }

    #[test]
    fn test_fit_columns_truncates_wide_text() {
        assert_eq!(fit_columns("abc", 5), "abc  ");
        let cut = fit_columns("abcdefgh", 5);
        assert_eq!(cut, "abcd…");
        assert_eq!(cut.width(), 5);
    }
}
