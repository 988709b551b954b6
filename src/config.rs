// File: ./src/config.rs
// Parser options, their validation, and the on-disk configuration file.
use crate::context::AppContext;
use crate::model::item::REVIEW_THRESHOLD;
use anyhow::{Context, Error, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use strum::EnumIter;

fn default_timezone() -> String {
    "America/New_York".to_string()
}
fn default_due_time() -> String {
    "23:59".to_string()
}
fn default_semester_start_month() -> u32 {
    8
}
fn default_true() -> bool {
    true
}
fn default_max_input_chars() -> usize {
    100_000
}
fn default_review_threshold() -> f64 {
    REVIEW_THRESHOLD
}

/// Knobs for a single parse. Every field has a default, so partial tables deserialize.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ParseOptions {
    /// IANA zone used to read the reference instant and the current time.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Anchor for relative dates ("next Wed"). `None` means the time of the call.
    #[serde(default)]
    pub reference_date: Option<DateTime<Utc>>,
    #[serde(default = "default_due_time")]
    pub default_due_time: String, // Format "HH:MM"
    #[serde(default = "default_semester_start_month")]
    pub semester_start_month: u32,
    /// `None` derives the academic year from the reference date.
    #[serde(default)]
    pub assume_academic_year: Option<i32>,
    #[serde(default = "default_true")]
    pub accept_past_dates: bool,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            reference_date: None,
            default_due_time: default_due_time(),
            semester_start_month: default_semester_start_month(),
            assume_academic_year: None,
            accept_past_dates: true,
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl ParseOptions {
    /// Validates every field up front so a bad option never turns into a wrong date.
    pub fn resolve(&self) -> Result<ResolvedOptions> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.timezone, e))?;

        let default_due_time = NaiveTime::parse_from_str(self.default_due_time.trim(), "%H:%M")
            .with_context(|| {
                format!(
                    "Invalid default_due_time '{}', expected HH:MM",
                    self.default_due_time
                )
            })?;

        if !(1..=12).contains(&self.semester_start_month) {
            return Err(anyhow::anyhow!(
                "Invalid semester_start_month {}, expected 1-12",
                self.semester_start_month
            ));
        }

        if self.max_input_chars == 0 {
            return Err(anyhow::anyhow!("max_input_chars must be greater than zero"));
        }

        Ok(ResolvedOptions {
            timezone,
            reference_date: self.reference_date,
            default_due_time,
            semester_start_month: self.semester_start_month,
            assume_academic_year: self.assume_academic_year,
            accept_past_dates: self.accept_past_dates,
            max_input_chars: self.max_input_chars,
        })
    }
}

/// Options after validation, in their typed form.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    pub timezone: Tz,
    pub reference_date: Option<DateTime<Utc>>,
    pub default_due_time: NaiveTime,
    pub semester_start_month: u32,
    pub assume_academic_year: Option<i32>,
    pub accept_past_dates: bool,
    pub max_input_chars: usize,
}

impl ResolvedOptions {
    /// Local wall-clock anchor: the reference date, or `now`, in the configured zone.
    pub fn anchor(&self, now: DateTime<Utc>) -> NaiveDateTime {
        self.reference_date
            .unwrap_or(now)
            .with_timezone(&self.timezone)
            .naive_local()
    }

    /// The year the current academic year started in.
    pub fn academic_year(&self, anchor: NaiveDateTime) -> i32 {
        self.assume_academic_year.unwrap_or_else(|| {
            if anchor.month() < self.semester_start_month {
                anchor.year() - 1
            } else {
                anchor.year()
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub options: ParseOptions,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_review_threshold")]
    pub review_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: ParseOptions::default(),
            format: OutputFormat::default(),
            // Match the serde defaults
            review_threshold: REVIEW_THRESHOLD,
        }
    }
}

impl Config {
    /// Reads and parses `config.toml`. A missing file is an error here;
    /// see `load_or_default`.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
            loaded => loaded,
        }
    }

    /// True when `load` failed only because the file does not exist.
    pub fn is_missing_config_error(err: &Error) -> bool {
        err.chain()
            .filter_map(|cause| cause.downcast_ref::<io::Error>())
            .any(|io_err| io_err.kind() == io::ErrorKind::NotFound)
    }

    /// Save configuration using an explicit context (temp file, then rename).
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        let toml_str = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, toml_str)
            .with_context(|| format!("Failed to write config file '{}'", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace config file '{}'", path.display()))?;
        Ok(())
    }

    /// Get the path string using an explicit context.
    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }
}
