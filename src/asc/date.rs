use chrono::NaiveDateTime;

use crate::{Error, Result};

/// Header layouts seen in ASC files, most common first.
const DATE_FORMATS: [&str; 4] = [
    "%a %b %d %I:%M:%S%.f %p %Y",
    "%a %b %d %I:%M:%S %p %Y",
    "%a %b %d %H:%M:%S%.f %Y",
    "%a %b %d %H:%M:%S %Y",
];

/// Returns the text after the `date` keyword, with whitespace normalized,
/// or `None` if the line is not a date header.
pub(crate) fn date_text(line: &str) -> Option<String> {
    let mut parts = line.split_ascii_whitespace();
    if parts.next()? != "date" {
        return None;
    }
    Some(parts.collect::<Vec<_>>().join(" "))
}

/// Parse the text of a `date` header, e.g. `Mon Mar 10 12:34:56.789 pm 2025`.
pub(crate) fn parse_date(text: &str) -> Result<NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| Error::InvalidDate(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    #[test]
    fn parses_lowercase_pm() {
        let text = date_text("date Mon Mar 10 12:34:56.789 pm 2025").unwrap();
        assert_eq!(text, "Mon Mar 10 12:34:56.789 pm 2025");
        assert_eq!(parse_date(&text).unwrap(), at(12, 34, 56, 789));
    }

    #[test]
    fn parses_12_am_as_midnight() {
        assert_eq!(
            parse_date("Mon Mar 10 12:00:00.000 am 2025").unwrap(),
            at(0, 0, 0, 0)
        );
    }

    #[test]
    fn parses_24_hour_clock_without_millis() {
        assert_eq!(
            parse_date("Mon Mar 10 18:05:01 2025").unwrap(),
            at(18, 5, 1, 0)
        );
    }

    #[test]
    fn normalizes_spacing() {
        let text = date_text("date   Mon Mar  10 01:02:03.004 PM   2025").unwrap();
        assert_eq!(parse_date(&text).unwrap(), at(13, 2, 3, 4));
    }

    #[test]
    fn rejects_other_lines() {
        assert!(date_text("DATE Mon Mar 10 12:00:00.000 pm 2025").is_none());
        assert!(date_text("base hex  timestamps absolute").is_none());
        assert!(matches!(
            parse_date("Mo Mär 10 12:00:00 2025"),
            Err(Error::InvalidDate(_))
        ));
    }
}
