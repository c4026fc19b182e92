#![forbid(unsafe_code)]

//! Action descriptors: `<event>-><class>#<method>`.
//!
//! The event name is everything before the first `->`. The remaining pieces
//! are concatenated, and the class name is what precedes the first `#` in
//! that remainder; the method name is every later piece concatenated. An
//! attribute value may carry several descriptors separated by whitespace.

use std::fmt;

/// One parsed event-to-method binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionDescriptor {
    pub event: String,
    pub controller: String,
    /// May be empty; empty methods are never bound.
    pub method: String,
}

impl ActionDescriptor {
    /// Parse a single descriptor.
    ///
    /// Returns `None` when there is no `->`, or when the event or class name
    /// is empty: such a descriptor can never match a registered class.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut halves = raw.split("->");
        let event = halves.next()?;
        let remainder: String = halves.collect();
        if !raw.contains("->") || event.is_empty() {
            return None;
        }

        let mut pieces = remainder.split('#');
        let controller = pieces.next().unwrap_or_default();
        if controller.is_empty() {
            return None;
        }
        let method: String = pieces.collect();
        Some(Self {
            event: event.to_owned(),
            controller: controller.to_owned(),
            method,
        })
    }

    /// Parse every whitespace-separated descriptor in an attribute value,
    /// dropping the ones that do not parse.
    pub fn parse_list(value: &str) -> impl Iterator<Item = Self> + '_ {
        value.split_whitespace().filter_map(Self::parse)
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}#{}", self.event, self.controller, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(event: &str, controller: &str, method: &str) -> ActionDescriptor {
        ActionDescriptor {
            event: event.into(),
            controller: controller.into(),
            method: method.into(),
        }
    }

    #[test]
    fn parses_canonical_form() {
        assert_eq!(
            ActionDescriptor::parse("click->counter#increment"),
            Some(descriptor("click", "counter", "increment"))
        );
    }

    #[test]
    fn missing_method_parses_as_empty() {
        assert_eq!(
            ActionDescriptor::parse("click->counter"),
            Some(descriptor("click", "counter", ""))
        );
        assert_eq!(
            ActionDescriptor::parse("click->counter#"),
            Some(descriptor("click", "counter", ""))
        );
    }

    #[test]
    fn extra_separators_concatenate() {
        assert_eq!(
            ActionDescriptor::parse("click->a->b#c"),
            Some(descriptor("click", "ab", "c"))
        );
        assert_eq!(
            ActionDescriptor::parse("click->a#b#c"),
            Some(descriptor("click", "a", "bc"))
        );
    }

    #[test]
    fn rejects_unmatchable_descriptors() {
        assert_eq!(ActionDescriptor::parse("click"), None);
        assert_eq!(ActionDescriptor::parse("->counter#go"), None);
        assert_eq!(ActionDescriptor::parse("click->#go"), None);
        assert_eq!(ActionDescriptor::parse(""), None);
    }

    #[test]
    fn lists_split_on_whitespace() {
        let parsed: Vec<_> =
            ActionDescriptor::parse_list(" click->a#x  junk\ninput->b#y ").collect();
        assert_eq!(
            parsed,
            vec![descriptor("click", "a", "x"), descriptor("input", "b", "y")]
        );
    }

    #[test]
    fn displays_canonical_form() {
        assert_eq!(
            descriptor("keyup", "search", "query").to_string(),
            "keyup->search#query"
        );
    }
}
