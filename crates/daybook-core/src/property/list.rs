use super::PropertyValue;
use crate::error::PropertyError;

/// An ordered list of values parsed from whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct List<T>(Vec<T>);

impl<T> List<T> {
    /// Returns an iterator over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Returns the items as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Appends an item.
    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }
}

impl<T: PartialEq> List<T> {
    /// Returns true if the list holds an equal item.
    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: PropertyValue> PropertyValue for List<T> {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        let mut items = Vec::new();
        for token in raw.split_whitespace() {
            let item = T::parse_value(token)?;
            if !item.is_empty() {
                items.push(item);
            }
        }
        Ok(Self(items))
    }

    fn to_canonical_string(&self) -> String {
        self.0
            .iter()
            .map(PropertyValue::to_canonical_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{DateList, Text};

    #[test]
    fn tokens_are_parsed_independently() {
        let list = List::<Text>::parse_value("Business  Travel\tPrivate").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.to_canonical_string(), "Business Travel Private");
        assert!(list.contains(&Text::new("Travel")));
    }

    #[test]
    fn one_bad_token_fails_the_list() {
        assert!(DateList::parse_value("20230101 2023-01-02x").is_err());
    }

    #[test]
    fn empty_input() {
        let list = DateList::parse_value("   ").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.to_canonical_string(), "");
    }
}
