//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Whether `c` belongs to the English-only character class used on
/// certificates: uppercase ASCII letters, digits, whitespace and `. , # / -`.
pub fn is_english_char(c: char) -> bool {
    c.is_ascii_uppercase()
        || c.is_ascii_digit()
        || c.is_whitespace()
        || matches!(c, '.' | ',' | '#' | '/' | '-')
}

/// Whether every character of `s` is in the English-only class.
///
/// The empty string qualifies.
pub fn is_english_text(s: &str) -> bool {
    s.chars().all(is_english_char)
}

/// Input filter for English-only fields: uppercase, then silently drop
/// anything outside the allowed class.
pub fn filter_english(input: &str) -> String {
    input
        .to_uppercase()
        .chars()
        .filter(|c| is_english_char(*c))
        .collect()
}

/// Free text restricted to the English-only class, stored uppercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnglishText(String);

impl ValueObject for EnglishText {}

impl EnglishText {
    /// Build from raw user input using the filter-on-input policy.
    pub fn filtered(input: &str) -> Self {
        Self(filter_english(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Re-check the stored value. Deserialized records bypass the
    /// constructors, so callers scan with this before submission.
    pub fn is_valid(&self) -> bool {
        is_english_text(&self.0)
    }
}

impl core::fmt::Display for EnglishText {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
