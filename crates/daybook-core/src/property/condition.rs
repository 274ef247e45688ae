use super::PropertyValue;
use crate::error::PropertyError;

/// Opaque recurrence rule text.
///
/// The tokens are kept as written; interpreting them is the job of the
/// expansion engine (see [`crate::expand::ConditionRule`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceCondition {
    tokens: Vec<String>,
}

impl RecurrenceCondition {
    /// Returns the rule tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl PropertyValue for RecurrenceCondition {
    fn parse_value(raw: &str) -> Result<Self, PropertyError> {
        Ok(Self {
            tokens: raw.split_whitespace().map(str::to_string).collect(),
        })
    }

    fn to_canonical_string(&self) -> String {
        self.tokens.join(" ")
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
