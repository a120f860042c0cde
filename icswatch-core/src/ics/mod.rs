//! ICS feed parsing and event extraction.
//!
//! This module reads calendar payloads according to RFC 5545's block and
//! line-folding rules, and reduces every VEVENT to an [`EventRecord`].
//!
//! [`EventRecord`]: crate::event::EventRecord

mod document;
mod parse;
mod value;

pub use document::{CalendarDocument, Component, Param, Property, Walk};
pub use parse::{extract, extract_events, parse_document};
pub use value::{event_time, unescape_text};
