//! Header block splitting.
//!
//! A record header is a sequence of RFC822-style lines. Lines of the form
//! `X-<Prefix>-<Key>: <value>` become field entries keyed by the lower-cased
//! key; indented lines following such an entry are folded into it. Every
//! other line is kept verbatim in a passthrough bucket.
//!
//! Splitting never fails: anything that does not look like a prefixed field
//! is passthrough.

use std::sync::LazyLock;

use regex::Regex;

/// Matches `X-<Prefix>-<Key>: <value>`.
static FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[Xx]-([A-Za-z0-9]+)-([^:\s][^:]*):(.*)$").expect("Invalid header field regex")
});

/// The result of splitting a header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitHeader {
    /// Prefixed fields in first-seen order, keyed by lower-cased key.
    pub fields: Vec<(String, String)>,
    /// Every non-prefixed line, each terminated by `\n`.
    pub passthrough: String,
}

impl SplitHeader {
    /// Returns the accumulated value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn entry(&mut self, key: String) -> usize {
        match self.fields.iter().position(|(k, _)| *k == key) {
            Some(index) => {
                self.fields[index].1.clear();
                index
            }
            None => {
                self.fields.push((key, String::new()));
                self.fields.len() - 1
            }
        }
    }
}

/// Splits a header block into prefixed fields and passthrough text.
///
/// The prefix is compared case-insensitively. A repeated key overwrites the
/// earlier value but keeps its position.
pub fn split_header(header: &str, prefix: &str) -> SplitHeader {
    let mut split = SplitHeader::default();
    let mut active: Option<usize> = None;

    for line in header.lines() {
        if let Some(caps) = FIELD_REGEX.captures(line)
            && caps[1].eq_ignore_ascii_case(prefix)
        {
            let index = split.entry(caps[2].trim().to_ascii_lowercase());
            split.fields[index].1.push_str(caps[3].trim());
            active = Some(index);
        } else if let Some(index) = active
            && line.starts_with([' ', '\t'])
        {
            let continuation = line.trim();
            if !continuation.is_empty() {
                let value = &mut split.fields[index].1;
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(continuation);
            }
        } else {
            active = None;
            split.passthrough.push_str(line);
            split.passthrough.push('\n');
        }
    }

    split
}
