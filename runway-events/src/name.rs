//! Event name parsing.
//!
//! Two layers of structure live in an event string:
//! - a space-separated list of individual names (`"add change"`)
//! - colon-separated segments within one name (`"change:id"`)
//!
//! Dispatch walks the segments from most to least specific, so a handler
//! registered on `change` also sees `change:id`.

use crate::{EventError, EventResult};
use std::fmt;

/// Name under which handlers receive every triggered event.
pub const WILDCARD: &str = "*";

/// Segment separator within a hierarchical name.
const SEPARATOR: char = ':';

/// Splits a space-separated name list into individual names.
///
/// Empty entries (leading, trailing or repeated whitespace) are skipped.
pub fn split_names(names: &str) -> impl Iterator<Item = &str> {
    names.split_whitespace()
}

/// Yields `name` followed by each of its proper prefixes, most specific first.
///
/// `levels("a:b:c")` yields `"a:b:c"`, `"a:b"`, `"a"`.
pub fn levels(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(name), |&current| {
        current.rfind(SEPARATOR).map(|idx| &current[..idx])
    })
    .filter(|level| !level.is_empty())
}

/// A single validated event name.
///
/// The bus accepts raw strings; this type is for callers that build names
/// from data (field keys, element tags) and want to reject values that would
/// be split apart by the whitespace-separated list syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName(String);

impl EventName {
    /// Parses a single event name.
    pub fn parse(name: &str) -> EventResult<Self> {
        if name.is_empty() {
            return Err(EventError::EmptyName);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(EventError::Whitespace(name.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    /// Builds `prefix:key`, e.g. `change:id`.
    pub fn scoped(prefix: &str, key: &str) -> EventResult<Self> {
        Self::parse(&format!("{prefix}{SEPARATOR}{key}"))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The colon-separated segments of this name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// This name and its proper prefixes, most specific first.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        levels(&self.0)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_most_specific_first() {
        let got: Vec<_> = levels("a:b:c").collect();
        assert_eq!(got, vec!["a:b:c", "a:b", "a"]);
    }

    #[test]
    fn levels_of_flat_name() {
        let got: Vec<_> = levels("change").collect();
        assert_eq!(got, vec!["change"]);
    }

    #[test]
    fn levels_trailing_separator() {
        let got: Vec<_> = levels("change:").collect();
        assert_eq!(got, vec!["change:", "change"]);
    }

    #[test]
    fn split_skips_empty_entries() {
        let got: Vec<_> = split_names("  add   change ").collect();
        assert_eq!(got, vec!["add", "change"]);
    }

    #[test]
    fn scoped_rejects_whitespace_key() {
        assert_eq!(
            EventName::scoped("change", "first name"),
            Err(EventError::Whitespace("change:first name".into()))
        );
    }
}
