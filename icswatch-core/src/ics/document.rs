//! Owned component tree of a parsed calendar.

use icalendar::parser;

use crate::event::{EventRecord, EventTime};
use crate::ics::value::{DATE_PROPERTIES, event_time, unescape_text};

/// A parameter on a property line, e.g. `TZID=Asia/Manila`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// One unfolded `NAME;PARAMS:VALUE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub params: Vec<Param>,
    /// Raw value, still TEXT-escaped
    pub value: String,
    /// Decoded value of DTSTART, DTEND and the other date properties
    pub time: Option<EventTime>,
}

impl From<&parser::Property<'_>> for Property {
    fn from(prop: &parser::Property<'_>) -> Self {
        let name = prop.name.to_string().to_ascii_uppercase();
        let time = if DATE_PROPERTIES.contains(&name.as_str()) {
            event_time(prop)
        } else {
            None
        };

        let params = prop
            .params
            .iter()
            .map(|p| Param {
                key: p.key.to_string().to_ascii_uppercase(),
                value: p
                    .val
                    .as_ref()
                    .map(|v| v.to_string().trim_matches('"').to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Property {
            name,
            params,
            value: prop.val.to_string(),
            time,
        }
    }
}

impl Property {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .map(|p| p.value.as_str())
    }
}

/// A `BEGIN:<NAME>` ... `END:<NAME>` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    pub name: String,
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
}

impl From<&parser::Component<'_>> for Component {
    fn from(component: &parser::Component<'_>) -> Self {
        Component {
            name: component.name.to_string().to_ascii_uppercase(),
            properties: component.properties.iter().map(Property::from).collect(),
            components: component.components.iter().map(Component::from).collect(),
        }
    }
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Component {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First property with this name.
    pub fn find_prop(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn to_event_record(&self) -> EventRecord {
        let title = self
            .find_prop("SUMMARY")
            .map(|p| unescape_text(&p.value));
        let start = self.find_prop("DTSTART").and_then(|p| p.time.clone());
        let end = self.find_prop("DTEND").and_then(|p| p.time.clone());

        if title.is_none() || start.is_none() || end.is_none() {
            tracing::debug!(
                uid = ?self.find_prop("UID").map(|p| p.value.as_str()),
                "VEVENT is missing SUMMARY, DTSTART or DTEND"
            );
        }

        EventRecord { title, start, end }
    }
}

/// A parsed calendar feed: one or more top-level `VCALENDAR` blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    pub calendars: Vec<Component>,
}

impl CalendarDocument {
    /// Display name of the first calendar (`X-WR-CALNAME`), if any.
    pub fn name(&self) -> Option<String> {
        self.calendars
            .iter()
            .find_map(|c| c.find_prop("X-WR-CALNAME"))
            .map(|p| unescape_text(&p.value))
    }

    /// Every component, depth-first in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self.calendars.iter()],
        }
    }

    /// One record per VEVENT, in document order.
    ///
    /// Lazy and restartable: each call walks the tree again from the top.
    pub fn events(&self) -> impl Iterator<Item = EventRecord> + '_ {
        self.walk()
            .filter(|c| c.is("VEVENT"))
            .map(Component::to_event_record)
    }

    pub fn event_count(&self) -> usize {
        self.walk().filter(|c| c.is("VEVENT")).count()
    }
}

/// Pre-order iterator over a component tree.
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, Component>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Component;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(component) => {
                    self.stack.push(component.components.iter());
                    return Some(component);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
