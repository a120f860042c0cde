//! Calendar payload parsing.
//!
//! The block structure is checked first so that malformed nesting is reported
//! with the physical line it occurs on. Components and properties are then
//! read with the icalendar crate's parser.

use icalendar::parser::{read_calendar, unfold};

use crate::error::ParseError;
use crate::event::EventRecord;
use crate::ics::document::{CalendarDocument, Component};

/// Outer block wrapped around the checked feed before handing it to
/// `read_calendar`, which would otherwise unwrap a lone VCALENDAR and drop
/// its own properties.
const FEED_BLOCK: &str = "X-ICSWATCH-FEED";

/// Parse a raw feed payload into a calendar document.
pub fn extract(payload: &[u8]) -> Result<CalendarDocument, ParseError> {
    let text = String::from_utf8_lossy(payload);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    parse_document(text)
}

/// Parse a payload and collect its events in document order.
pub fn extract_events(payload: &[u8]) -> Result<Vec<EventRecord>, ParseError> {
    Ok(extract(payload)?.events().collect())
}

/// Parse calendar text (folded or not) into a document.
pub fn parse_document(content: &str) -> Result<CalendarDocument, ParseError> {
    let feed = check_structure(content)?;
    let parsed = read_calendar(&feed).map_err(|e| ParseError::Syntax(e.to_string()))?;

    let calendars: Vec<Component> = parsed
        .components
        .iter()
        .flat_map(|c| {
            if c.name == FEED_BLOCK {
                c.components.iter().collect()
            } else {
                vec![c]
            }
        })
        .filter(|c| c.name == "VCALENDAR")
        .map(Component::from)
        .collect();

    if calendars.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(CalendarDocument { calendars })
}

/// Validate BEGIN/END nesting and return the calendar blocks, normalized and
/// wrapped in [`FEED_BLOCK`].
///
/// Blank lines, lines without a colon, and anything after the last
/// `END:VCALENDAR` are dropped.
fn check_structure(content: &str) -> Result<String, ParseError> {
    let physical = physical_line_numbers(content);
    let unfolded = unfold(content);

    let mut feed = format!("BEGIN:{FEED_BLOCK}\r\n");
    let mut open: Vec<String> = Vec::new();
    let mut seen_any = false;

    for (index, raw) in unfolded.lines().enumerate() {
        let line_no = physical.get(index).copied().unwrap_or(index + 1);
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            if !seen_any {
                return Err(ParseError::MissingCalendar(line.to_string()));
            }
            tracing::debug!(line = line_no, "Skipping unreadable ICS line");
            continue;
        };
        let name = name.trim();

        if name.eq_ignore_ascii_case("BEGIN") {
            let kind = value.trim().to_ascii_uppercase();
            if open.is_empty() && kind != "VCALENDAR" {
                return Err(ParseError::MissingCalendar(line.to_string()));
            }
            seen_any = true;
            feed.push_str(&format!("BEGIN:{kind}\r\n"));
            open.push(kind);
            continue;
        }

        if name.eq_ignore_ascii_case("END") {
            let kind = value.trim().to_ascii_uppercase();
            let Some(current) = open.pop() else {
                if seen_any {
                    return Err(ParseError::UnexpectedEnd {
                        found: kind,
                        line: line_no,
                    });
                }
                return Err(ParseError::MissingCalendar(line.to_string()));
            };
            if current != kind {
                return Err(ParseError::MismatchedEnd {
                    expected: current,
                    found: kind,
                    line: line_no,
                });
            }
            feed.push_str(&format!("END:{kind}\r\n"));
            continue;
        }

        if open.is_empty() {
            if !seen_any {
                return Err(ParseError::MissingCalendar(line.to_string()));
            }
            tracing::debug!(line = line_no, "Ignoring content after END:VCALENDAR");
            continue;
        }

        feed.push_str(line);
        feed.push_str("\r\n");
    }

    if let Some(unclosed) = open.pop() {
        return Err(ParseError::Unterminated(unclosed));
    }

    if !seen_any {
        return Err(ParseError::Empty);
    }

    feed.push_str(&format!("END:{FEED_BLOCK}\r\n"));
    Ok(feed)
}

/// 1-based physical line number on which each unfolded line starts.
fn physical_line_numbers(content: &str) -> Vec<usize> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with([' ', '\t']))
        .map(|(index, _)| index + 1)
        .collect()
}
