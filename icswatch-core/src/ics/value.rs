//! Property value decoding: date/time values and escaped text.

use icalendar::{CalendarDateTime, DatePerhapsTime, parser};

use crate::event::EventTime;

/// Properties whose values are decoded as dates when the tree is built.
pub(crate) const DATE_PROPERTIES: &[&str] = &["DTSTART", "DTEND", "DUE", "RECURRENCE-ID"];

/// Decode a DTSTART/DTEND style property, keeping its source form.
///
/// Handles `VALUE=DATE`, a `TZID` parameter, UTC (`Z` suffix) and floating
/// values. Anything else is `None`.
pub fn event_time(prop: &parser::Property<'_>) -> Option<EventTime> {
    DatePerhapsTime::try_from(prop).ok().map(to_event_time)
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => EventTime::DateTimeZoned {
                datetime: date_time,
                tzid: tzid.trim_matches('"').trim_start_matches('/').to_string(),
            },
        },
    }
}

/// Undo TEXT escaping (`\\`, `\;`, `\,`, `\n`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::parse_document;
    use chrono::{NaiveDate, NaiveDateTime};

    /// DTSTART of a one-event calendar.
    fn dtstart(line: &str) -> Option<EventTime> {
        let ics = format!(
            "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:x\r\n{line}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
        );
        let doc = parse_document(&ics).unwrap();
        let record = doc.events().next().unwrap();
        record.start
    }

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_date_value() {
        assert_eq!(
            dtstart("DTSTART;VALUE=DATE:20250601"),
            Some(EventTime::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()))
        );
    }

    #[test]
    fn test_utc_value() {
        assert_eq!(
            dtstart("DTSTART:20250602T010000Z"),
            Some(EventTime::DateTimeUtc(naive(2025, 6, 2, 1, 0, 0).and_utc()))
        );
    }

    #[test]
    fn test_zoned_value() {
        assert_eq!(
            dtstart("DTSTART;TZID=Asia/Manila:20250602T090000"),
            Some(EventTime::DateTimeZoned {
                datetime: naive(2025, 6, 2, 9, 0, 0),
                tzid: "Asia/Manila".to_string(),
            })
        );
    }

    #[test]
    fn test_floating_value() {
        assert_eq!(
            dtstart("DTSTART:20250602T093000"),
            Some(EventTime::DateTimeFloating(naive(2025, 6, 2, 9, 30, 0)))
        );
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(dtstart("DTSTART:next tuesday"), None);
        assert_eq!(dtstart("DTSTART;VALUE=DATE:2025-06-01"), None);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(
            unescape_text(r"Lunch\, then talks\; bring\nlaptop"),
            "Lunch, then talks; bring\nlaptop"
        );
        assert_eq!(unescape_text(r"C:\\path"), r"C:\path");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }
}
