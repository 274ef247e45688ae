use std::ops::Deref;

use super::{PropertyValue, Scalar};
use crate::error::PropertyError;

/// Separates the two ends of a range token.
pub const RANGE_DELIMITER: char = '-';

/// Prefix distinguishing an exception from a regular date on the Day line.
pub const EXCEPTION_MARKER: char = '!';

/// A single scalar or a `first-last` span.
///
/// Accepted spellings are `a` (first and last both `a`), `a-b`, `a-`, `-b`
/// and the empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct Range<T> {
    first: Option<T>,
    last: Option<T>,
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Self {
            first: None,
            last: None,
        }
    }
}

impl<T: Scalar> Range<T> {
    /// Creates a range holding one value.
    pub fn single(value: T) -> Self {
        Self {
            first: Some(value.clone()),
            last: Some(value),
        }
    }

    /// Creates a span, ordering the ends if the scalar requires it.
    pub fn span(first: T, last: T) -> Self {
        if !T::ORDERED || first <= last {
            Self {
                first: Some(first),
                last: Some(last),
            }
        } else {
            Self {
                first: Some(last),
                last: Some(first),
            }
        }
    }

    /// Returns the explicitly written start.
    pub fn first(&self) -> Option<&T> {
        self.first.as_ref()
    }

    /// Returns the explicitly written end.
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Returns the start, falling back to the end for `-b` spellings.
    pub fn start(&self) -> Option<&T> {
        self.first.as_ref().or(self.last.as_ref())
    }

    /// Returns the end, falling back to the start for `a-` spellings.
    pub fn end(&self) -> Option<&T> {
        self.last.as_ref().or(self.first.as_ref())
    }

    /// Checks whether a value lies within the range; missing ends are open.
    pub fn contains(&self, value: &T) -> bool {
        if self.first.is_none() && self.last.is_none() {
            return false;
        }
        let after_start = self.first.as_ref().is_none_or(|first| first <= value);
        let before_end = self.last.as_ref().is_none_or(|last| value <= last);
        after_start && before_end
    }

    fn parse_end(token: &str) -> Result<Option<T>, PropertyError> {
        let token = token.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            T::parse_token(token).map(Some)
        }
    }
}

impl<T: Scalar> PropertyValue for Range<T> {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        let raw = raw.trim();
        let range = match raw.split_once(RANGE_DELIMITER) {
            Some((first, last)) => Self {
                first: Self::parse_end(first)?,
                last: Self::parse_end(last)?,
            },
            None => match Self::parse_end(raw)? {
                Some(value) => Self::single(value),
                None => Self::default(),
            },
        };

        if let (Some(first), Some(last)) = (&range.first, &range.last)
            && T::ORDERED
            && first > last
        {
            return Err(PropertyError::InvalidRange(raw.to_string()));
        }
        Ok(range)
    }

    fn to_canonical_string(&self) -> String {
        match (&self.first, &self.last) {
            (None, None) => String::new(),
            (Some(first), Some(last)) if first == last => first.to_token(),
            (first, last) => format!(
                "{}{}{}",
                first.as_ref().map(Scalar::to_token).unwrap_or_default(),
                RANGE_DELIMITER,
                last.as_ref().map(Scalar::to_token).unwrap_or_default(),
            ),
        }
    }

    fn is_empty(&self) -> bool {
        self.first.is_none() && self.last.is_none()
    }
}

/// A value carrying the [`EXCEPTION_MARKER`] prefix.
///
/// The marker is optional on parse and always written on serialize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marked<V>(V);

impl<V> Marked<V> {
    /// Wraps a value.
    pub fn new(inner: V) -> Self {
        Self(inner)
    }

    /// Returns the unmarked value.
    pub fn inner(&self) -> &V {
        &self.0
    }

    /// Unwraps the unmarked value.
    pub fn into_inner(self) -> V {
        self.0
    }
}

impl<V> Deref for Marked<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.0
    }
}

impl<V: PropertyValue> PropertyValue for Marked<V> {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        let raw = raw.trim();
        let unmarked = raw.strip_prefix(EXCEPTION_MARKER).unwrap_or(raw);
        V::parse_value(unmarked).map(Self)
    }

    fn to_canonical_string(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("{}{}", EXCEPTION_MARKER, self.0.to_canonical_string())
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
