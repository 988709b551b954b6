// File: src/model/dates.rs
// Natural language date resolution.
//
// `DateResolver` is the seam between the extraction policy and whatever finds
// dates in prose. `EnglishDateResolver` is the built-in implementation; all of
// its patterns run on the `regex` crate, so matching stays linear in the input.
//
// Recognized forms:
//   2024-09-15            ISO date (year certain), also 2024-09-15T17:00
//   9/15, 9/15/24         numeric US order
//   Sept 15, Sept. 15th, 2024
//   15 Sept, 15th of September
//   Wed, this Friday, next Monday
//   today, tonight, tomorrow
//   in 3 days, in two weeks
// optionally followed or preceded by a time (11:59pm, 5 p.m., 14:00, noon).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const TIME: &str =
    r"\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b\.?|\b(\d{1,2}):(\d{2})\b|\b(noon|midnight)\b";

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:T|\b)").unwrap());
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?",
        MONTH
    ))
    .unwrap()
});
static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap());
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({})\b\.?(?:,?\s+(\d{{4}})\b)?",
        MONTH
    ))
    .unwrap()
});
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(next|this)\s+)?(mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)\b",
    )
    .unwrap()
});
static RELATIVE_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(today|tonight|tomorrow)\b").unwrap());
static IN_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bin\s+(\d{1,3}|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(days?|weeks?)\b",
    )
    .unwrap()
});
static TIME_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*,?\s*(?:(?:at|@|by|-)\s*)?(?:{})",
        TIME
    ))
    .unwrap()
});
static TIME_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:{})\s*(?:,|@|\bon\b)?\s*$", TIME)).unwrap()
});

/// One date expression found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDate {
    /// Byte span of the date expression (time excluded).
    pub start: usize,
    pub end: usize,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    /// False when the year was guessed rather than written or implied by the anchor.
    pub year_certain: bool,
}

impl CandidateDate {
    fn overlaps(&self, other: &CandidateDate) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub trait DateResolver {
    /// All date expressions in `text`, ordered by position.
    ///
    /// `anchor` is the local wall-clock that relative expressions are measured
    /// from. With `forward` set, ambiguous dates resolve on or after the anchor.
    fn resolve(&self, text: &str, anchor: NaiveDateTime, forward: bool) -> Vec<CandidateDate>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishDateResolver;

impl DateResolver for EnglishDateResolver {
    fn resolve(&self, text: &str, anchor: NaiveDateTime, forward: bool) -> Vec<CandidateDate> {
        let today = anchor.date();
        let mut found = Vec::new();

        // Pattern order decides which reading wins when spans overlap.
        scan(&mut found, &ISO_DATE, text, |c| {
            let date = ymd(num(c, 1)? as i32, num(c, 2)?, num(c, 3)?)?;
            Some((date, true))
        });
        scan(&mut found, &MONTH_DAY, text, |c| {
            let token = c.get(1)?.as_str();
            // "Essay may 3 pages": lowercase "may" is the verb here too.
            if token == "may" {
                return None;
            }
            let month = parse_month(token)?;
            let day = num(c, 2)?;
            match c.get(3) {
                Some(y) => Some((ymd(y.as_str().parse().ok()?, month, day)?, true)),
                None => Some((yearless(today, month, day, forward)?, false)),
            }
        });
        scan(&mut found, &NUMERIC_DATE, text, |c| {
            let (month, day) = (num(c, 1)?, num(c, 2)?);
            match c.get(3) {
                Some(y) => {
                    let raw: i32 = y.as_str().parse().ok()?;
                    let year = if raw < 100 { 2000 + raw } else { raw };
                    Some((ymd(year, month, day)?, true))
                }
                None => Some((yearless(today, month, day, forward)?, false)),
            }
        });
        scan(&mut found, &DAY_MONTH, text, |c| {
            let day = num(c, 1)?;
            let token = c.get(2)?.as_str();
            // "2 may be late": lowercase "may" after a number is the verb.
            if token == "may" {
                return None;
            }
            let month = parse_month(token)?;
            match c.get(3) {
                Some(y) => Some((ymd(y.as_str().parse().ok()?, month, day)?, true)),
                None => Some((yearless(today, month, day, forward)?, false)),
            }
        });
        scan(&mut found, &WEEKDAY, text, |c| {
            let target = parse_weekday(c.get(2)?.as_str())?;
            let strictly_next = c
                .get(1)
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case("next"));
            Some((weekday_from(today, target, strictly_next, forward), true))
        });
        scan(&mut found, &RELATIVE_DAY, text, |c| {
            let date = match c.get(1)?.as_str().to_lowercase().as_str() {
                "tomorrow" => today + Duration::days(1),
                _ => today,
            };
            Some((date, true))
        });
        scan(&mut found, &IN_AMOUNT, text, |c| {
            let amount = parse_english_number(c.get(1)?.as_str())? as i64;
            let unit = c.get(2)?.as_str().to_lowercase();
            let days = if unit.starts_with('w') {
                amount * 7
            } else {
                amount
            };
            Some((today + Duration::days(days), true))
        });

        attach_times(text, &mut found);
        found
    }
}

/// Adds the matches of `re` that do not overlap anything already in `found`.
///
/// `found` stays sorted by start and non-overlapping, so only the neighbours
/// on either side of a new match can clash with it, and each pattern costs
/// one merge pass.
fn scan<F>(found: &mut Vec<CandidateDate>, re: &Regex, text: &str, read: F)
where
    F: Fn(&Captures) -> Option<(NaiveDate, bool)>,
{
    let fresh: Vec<CandidateDate> = re
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (date, year_certain) = read(&caps)?;
            Some(CandidateDate {
                start: whole.start(),
                end: whole.end(),
                date,
                time: None,
                year_certain,
            })
        })
        .collect();
    if fresh.is_empty() {
        return;
    }

    let mut merged: Vec<CandidateDate> = Vec::with_capacity(found.len() + fresh.len());
    let mut claimed = std::mem::take(found).into_iter().peekable();
    for candidate in fresh {
        while let Some(earlier) = claimed.next_if(|c| c.start < candidate.start) {
            merged.push(earlier);
        }
        let clashes = merged.last().is_some_and(|p| p.overlaps(&candidate))
            || claimed.peek().is_some_and(|n| n.overlaps(&candidate));
        if !clashes {
            merged.push(candidate);
        }
    }
    merged.extend(claimed);
    *found = merged;
}

fn attach_times(text: &str, found: &mut [CandidateDate]) {
    let mut free_from = 0;
    for i in 0..found.len() {
        let next_start = found.get(i + 1).map_or(text.len(), |n| n.start);
        let (start, end) = (found[i].start, found[i].end);

        if let Some(caps) = TIME_AFTER.captures(&text[end..next_start])
            && let Some(t) = time_from_caps(&caps)
        {
            found[i].time = Some(t);
            free_from = end + caps.get(0).map_or(0, |m| m.end());
            continue;
        }
        if free_from <= start
            && let Some(caps) = TIME_BEFORE.captures(&text[free_from..start])
        {
            found[i].time = time_from_caps(&caps);
        }
        free_from = end;
    }
}

fn num(c: &Captures, idx: usize) -> Option<u32> {
    c.get(idx)?.as_str().parse().ok()
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month/day with no year: the anchor's year, or a later one when biased forward.
fn yearless(today: NaiveDate, month: u32, day: u32, forward: bool) -> Option<NaiveDate> {
    let year = today.year();
    if !forward {
        return ymd(year, month, day);
    }
    // Feb 29 may need up to a leap cycle.
    (0..=4)
        .filter_map(|offset| ymd(year + offset, month, day))
        .find(|d| *d >= today)
}

fn weekday_from(today: NaiveDate, target: Weekday, strictly_next: bool, forward: bool) -> NaiveDate {
    let from = today.weekday().num_days_from_monday() as i64;
    let to = target.num_days_from_monday() as i64;
    if forward || strictly_next {
        let mut ahead = (to - from).rem_euclid(7);
        if strictly_next && ahead == 0 {
            ahead = 7;
        }
        today + Duration::days(ahead)
    } else {
        today - Duration::days((from - to).rem_euclid(7))
    }
}

fn parse_month(s: &str) -> Option<u32> {
    let lower = s.to_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    let lower = s.to_lowercase();
    let day = match lower.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn parse_english_number(s: &str) -> Option<u32> {
    match s.to_lowercase().as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => s.parse::<u32>().ok(),
    }
}

/// Reads the shared TIME group layout: 1-3 for 12h, 4-5 for 24h, 6 for words.
fn time_from_caps(c: &Captures) -> Option<NaiveTime> {
    if let Some(meridiem) = c.get(3) {
        let h = num(c, 1)?;
        let m = c.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&h) || m > 59 {
            return None;
        }
        let is_pm = meridiem.as_str().eq_ignore_ascii_case("p");
        let h_24 = if h == 12 {
            if is_pm { 12 } else { 0 }
        } else if is_pm {
            h + 12
        } else {
            h
        };
        return NaiveTime::from_hms_opt(h_24, m, 0);
    }
    if c.get(4).is_some() {
        return NaiveTime::from_hms_opt(num(c, 4)?, num(c, 5)?, 0);
    }
    match c.get(6)?.as_str().to_lowercase().as_str() {
        "noon" => NaiveTime::from_hms_opt(12, 0, 0),
        // Due at midnight means the end of that day.
        _ => NaiveTime::from_hms_opt(23, 59, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolve(text: &str) -> Vec<CandidateDate> {
        EnglishDateResolver.resolve(text, anchor(2024, 8, 20), true)
    }

    #[test]
    fn test_month_day_with_time() {
        let found = resolve("Quiz 1 - Sept 2 at 11:59pm");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, date(2024, 9, 2));
        assert_eq!(found[0].time, NaiveTime::from_hms_opt(23, 59, 0));
        assert!(!found[0].year_certain);
    }

    #[test]
    fn test_explicit_year_is_certain() {
        let found = resolve("Paper due September 2nd, 2025");
        assert_eq!(found[0].date, date(2025, 9, 2));
        assert!(found[0].year_certain);

        let found = resolve("Submit by 2024-12-01");
        assert_eq!(found[0].date, date(2024, 12, 1));
        assert!(found[0].year_certain);
    }

    #[test]
    fn test_yearless_date_rolls_forward() {
        let found = resolve("Final on Jan 15");
        assert_eq!(found[0].date, date(2025, 1, 15));

        let backward = EnglishDateResolver.resolve("Jan 15", anchor(2024, 8, 20), false);
        assert_eq!(backward[0].date, date(2024, 1, 15));
    }

    #[test]
    fn test_weekday_forward_bias() {
        // 2024-08-20 is a Tuesday.
        assert_eq!(resolve("due Wed")[0].date, date(2024, 8, 21));
        assert_eq!(resolve("due next Wed")[0].date, date(2024, 8, 21));
        assert_eq!(resolve("due Tuesday")[0].date, date(2024, 8, 20));
        assert_eq!(resolve("due next Tuesday")[0].date, date(2024, 8, 27));

        let backward = EnglishDateResolver.resolve("Monday", anchor(2024, 8, 20), false);
        assert_eq!(backward[0].date, date(2024, 8, 19));
    }

    #[test]
    fn test_relative_days_and_amounts() {
        assert_eq!(resolve("due tomorrow")[0].date, date(2024, 8, 21));
        assert_eq!(resolve("due in two weeks")[0].date, date(2024, 9, 3));
        assert_eq!(resolve("due in 3 days")[0].date, date(2024, 8, 23));
    }

    #[test]
    fn test_numeric_and_day_month() {
        assert_eq!(resolve("due 9/15")[0].date, date(2024, 9, 15));
        assert_eq!(resolve("due 9/15/25")[0].date, date(2025, 9, 15));
        assert_eq!(resolve("due 15th of October")[0].date, date(2024, 10, 15));
        assert!(resolve("due 13/45").is_empty());
        assert!(resolve("Homework 2 may be late").is_empty());
    }

    #[test]
    fn test_lowercase_may_is_not_a_month() {
        assert!(resolve("Essay may 3 pages long").is_empty());
        assert_eq!(resolve("Essay due May 3")[0].date, date(2025, 5, 3));
        assert_eq!(resolve("Essay due MAY 3")[0].date, date(2025, 5, 3));
    }

    #[test]
    fn test_iso_datetime_keeps_its_time() {
        let found = resolve("Presentation due 2024-12-05T17:00");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, date(2024, 12, 5));
        assert_eq!(found[0].time, NaiveTime::from_hms_opt(17, 0, 0));
        assert!(found[0].year_certain);
    }

    #[test]
    fn test_many_tokens_stay_ordered_and_disjoint() {
        let text = format!("Quiz {}2024-09-01 Sept 3", "Mon ".repeat(20_000));
        let found = resolve(&text);
        assert_eq!(found.len(), 20_002);
        assert!(found.windows(2).all(|w| w[0].end <= w[1].start));
        assert_eq!(found[20_000].date, date(2024, 9, 1));
        assert_eq!(found[20_001].date, date(2024, 9, 3));
    }

    #[test]
    fn test_later_pattern_fills_gaps_between_claimed_spans() {
        // ISO claims first, then month-day and weekdays slot in around it.
        let found = resolve("Fri 2024-09-06 Sept 9 Mon");
        let dates: Vec<NaiveDate> = found.iter().map(|c| c.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 8, 23), date(2024, 9, 6), date(2024, 9, 9), date(2024, 8, 26)]
        );
    }

    #[test]
    fn test_month_day_wins_over_day_month() {
        let found = resolve("Homework 1 Sept 5");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, date(2024, 9, 5));
    }

    #[test]
    fn test_multiple_candidates_in_order() {
        let found = resolve("Opens Sept 1, due Sept 8 5pm");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].date, date(2024, 9, 1));
        assert_eq!(found[0].time, None);
        assert_eq!(found[1].date, date(2024, 9, 8));
        assert_eq!(found[1].time, NaiveTime::from_hms_opt(17, 0, 0));
    }

    #[test]
    fn test_time_before_date() {
        let found = resolve("Turn in by 5 p.m. on Friday");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, date(2024, 8, 23));
        assert_eq!(found[0].time, NaiveTime::from_hms_opt(17, 0, 0));
    }

    #[test]
    fn test_24h_and_noon() {
        assert_eq!(
            resolve("Aug 30, 14:30")[0].time,
            NaiveTime::from_hms_opt(14, 30, 0)
        );
        assert_eq!(
            resolve("Aug 30 at noon")[0].time,
            NaiveTime::from_hms_opt(12, 0, 0)
        );
    }

    #[test]
    fn test_no_dates() {
        assert!(resolve("Week 1 introduction").is_empty());
        assert!(resolve("").is_empty());
    }
}
