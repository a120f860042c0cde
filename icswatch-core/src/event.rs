//! Event records extracted from a calendar feed.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// A DTSTART/DTEND value in the form the feed gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// All-day value (`VALUE=DATE`)
    Date(NaiveDate),
    /// UTC value (`...Z`)
    DateTimeUtc(DateTime<Utc>),
    /// Local time with no zone
    DateTimeFloating(NaiveDateTime),
    /// Local time in a named zone (`TZID=...`)
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTimeUtc(dt) => dt.date_naive(),
            EventTime::DateTimeFloating(dt) => dt.date(),
            EventTime::DateTimeZoned { datetime, .. } => datetime.date(),
        }
    }

    /// Resolve to an instant with a fixed UTC offset.
    ///
    /// Returns `None` for dates, floating times, unknown TZIDs, and local
    /// times that fall into a DST gap.
    pub fn resolve_offset(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            EventTime::Date(_) | EventTime::DateTimeFloating(_) => None,
            EventTime::DateTimeUtc(dt) => Some(dt.fixed_offset()),
            EventTime::DateTimeZoned { datetime, tzid } => {
                let tz: chrono_tz::Tz = tzid.parse().ok()?;
                tz.from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.fixed_offset())
            }
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            EventTime::DateTimeZoned { datetime, tzid } => match self.resolve_offset() {
                Some(resolved) => write!(f, "{}", resolved.format("%Y-%m-%d %H:%M:%S%:z")),
                None => write!(f, "{} ({})", datetime.format("%Y-%m-%d %H:%M:%S"), tzid),
            },
        }
    }
}

/// One VEVENT reduced to title, start and end.
///
/// Each field is `None` when the event lacks the property or its value could
/// not be read. A record is produced either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub title: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
}

impl EventRecord {
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.start.is_some() && self.end.is_some()
    }
}
