use std::fmt;

use super::PropertyValue;
use crate::error::PropertyError;

/// An opaque text value.
///
/// Header values are trimmed on both sides and fit on one line: line breaks
/// collapse into single spaces. Body text uses [`Text::block`], which keeps
/// leading indentation and only drops trailing whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Text(String);

impl Text {
    /// Creates a trimmed single-line text value.
    pub fn new(value: impl AsRef<str>) -> Self {
        let lines: Vec<&str> = value
            .as_ref()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self(lines.join(" "))
    }

    /// Creates a block of free text with trailing whitespace removed.
    pub fn block(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim_end().to_string())
    }

    /// Returns the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PropertyValue for Text {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        Ok(Self::new(raw))
    }

    fn to_canonical_string(&self) -> String {
        self.0.clone()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
