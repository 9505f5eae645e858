//! Defines the [`Date`] type, the typed value behind the `posted` and
//! `created` header fields.

use chrono::{Datelike, NaiveDate, Utc};
use gtmpl_value::Value;
use std::collections::HashMap;

/// A calendar date attached to a post. Alongside the parsed value it
/// carries the strings templates need: the canonical ISO form for
/// `<time datetime=...>` markup, a human-readable display form, and a
/// timestamp for feed `updated`/`published` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Date {
    /// The parsed calendar value. Ordering posts happens on this field.
    pub date: NaiveDate,

    /// Canonical `YYYY-MM-DD` form of the date.
    pub iso: String,

    /// Human-readable form, e.g. `Jan 5, 2020`. The year is elided when it
    /// matches the current year at build time, so `Jan 5` on a build run
    /// in 2020.
    pub display: String,

    /// ISO 8601 timestamp at midnight UTC, e.g. `2020-01-05T00:00:00Z`.
    pub isotime: String,
}

impl Date {
    /// Parses a `YYYY-MM-DD` string into a [`Date`]. Any other shape is an
    /// error; callers decide how to report it.
    pub fn parse(value: &str) -> Result<Date, chrono::ParseError> {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
        let iso = date.format("%Y-%m-%d").to_string();
        Ok(Date {
            display: display_for_year(&date, Utc::now().year()),
            isotime: format!("{}T00:00:00Z", iso),
            iso,
            date,
        })
    }
}

/// Formats a date for reading, relative to `current_year`. Split out from
/// [`Date::parse`] so tests don't depend on when they run.
fn display_for_year(date: &NaiveDate, current_year: i32) -> String {
    if date.year() == current_year {
        format!("{} {}", date.format("%b"), date.day())
    } else {
        format!("{} {}, {}", date.format("%b"), date.day(), date.year())
    }
}

impl From<&Date> for Value {
    /// Converts a [`Date`] into a template [`Value`] with the `datetime`,
    /// `display`, and `isotime` fields the page and feed templates use.
    fn from(date: &Date) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("datetime".to_owned(), Value::String(date.iso.clone()));
        m.insert("display".to_owned(), Value::String(date.display.clone()));
        m.insert("isotime".to_owned(), Value::String(date.isotime.clone()));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let date = Date::parse("2020-01-05").unwrap();
        assert_eq!(date.iso, "2020-01-05");
        assert_eq!(date.isotime, "2020-01-05T00:00:00Z");
        assert_eq!(date.date, NaiveDate::from_ymd(2020, 1, 5));
    }

    #[test]
    fn test_display_elides_current_year() {
        let date = NaiveDate::from_ymd(2020, 1, 5);
        assert_eq!(display_for_year(&date, 2019), "Jan 5, 2020");
        assert_eq!(display_for_year(&date, 2020), "Jan 5");
    }

    #[test]
    fn test_display_unpadded_day() {
        let date = NaiveDate::from_ymd(2012, 9, 10);
        assert_eq!(display_for_year(&date, 2013), "Sep 10, 2012");
        let date = NaiveDate::from_ymd(2012, 12, 1);
        assert_eq!(display_for_year(&date, 2013), "Dec 1, 2012");
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(Date::parse("05-01-2020").is_err());
        assert!(Date::parse("2020/01/05").is_err());
        assert!(Date::parse("2020-13-01").is_err());
        assert!(Date::parse("2020-01-05T00:00:00").is_err());
        assert!(Date::parse("yesterday").is_err());
    }
}
