//! [`LikePattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// `ILIKE` pattern matching any text containing the given input.
///
/// Relies on the default `\` escape character of `LIKE` expressions.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] matching any text containing the given
    /// `input` literally.
    #[must_use]
    pub fn containing(input: &str) -> Self {
        let mut pattern = String::with_capacity(input.len() + 2);
        pattern.push('%');
        for c in input.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}

#[cfg(test)]
mod spec {
    use super::LikePattern;

    #[test]
    fn wraps_plain_input() {
        assert_eq!(LikePattern::containing("atomic").to_string(), "%atomic%");
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(
            LikePattern::containing(r"100%_off\").to_string(),
            r"%100\%\_off\\%",
        );
    }
}
