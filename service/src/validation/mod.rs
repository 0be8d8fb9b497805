//! Validation of user-submitted forms.
//!
//! Every form is validated as a whole, and at most one error is reported per
//! field: the first failing rule wins and the rest of the field's rules are
//! skipped.

use std::{collections::BTreeMap, fmt, ops::RangeInclusive, str::FromStr};

use regex::Regex;
use rust_decimal::Decimal;

/// Validated form.
pub trait Validate {
    /// Validates this form, returning all the found [`Errors`].
    ///
    /// Empty [`Errors`] mean this form is valid.
    fn validate(&self) -> Errors;
}

/// Errors of a form validation, keyed by the field names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Errors(BTreeMap<&'static str, String>);

impl Errors {
    /// Creates new empty [`Errors`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates whether there are no errors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of invalid fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the error message of the provided `field`, if it's invalid.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterates over the invalid fields and their error messages in the
    /// alphabetical order of the fields.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Records the error `message` of the provided `field`, unless the
    /// `field` already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        _ = self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Starts checking the `value` of the provided `field` against a chain
    /// of [`Field`] rules.
    pub fn field<'e, 'v>(
        &'e mut self,
        name: &'static str,
        value: &'v str,
    ) -> Field<'e, 'v> {
        let done = self.0.contains_key(name);
        Field {
            errors: self,
            name,
            value: value.trim(),
            done,
        }
    }

    /// Converts these [`Errors`] into a [`Result`], being [`Ok`] only if
    /// there are no errors.
    ///
    /// # Errors
    ///
    /// If these [`Errors`] are not empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

impl<'a> IntoIterator for &'a Errors {
    type Item = (&'static str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Chain of rules checking a single field value.
///
/// The value is checked with surrounding whitespace trimmed. Once a rule
/// fails (or [`Field::optional()`] meets an empty value), the following
/// rules are skipped.
#[derive(Debug)]
#[must_use = "rules are applied only by chaining them"]
pub struct Field<'e, 'v> {
    /// [`Errors`] to record the failure into.
    errors: &'e mut Errors,

    /// Name of the checked field.
    name: &'static str,

    /// Checked value.
    value: &'v str,

    /// Indicator whether the following rules should be skipped.
    done: bool,
}

impl Field<'_, '_> {
    /// Fails with the `message` if the value is empty.
    pub fn required(self, message: &str) -> Self {
        let empty = self.value.is_empty();
        self.fail_if(empty, message)
    }

    /// Skips the following rules if the value is empty.
    pub fn optional(mut self) -> Self {
        self.done |= self.value.is_empty();
        self
    }

    /// Same as [`Field::optional()`] if the `condition` holds, or as
    /// [`Field::required()`] otherwise.
    pub fn required_unless(self, condition: bool, message: &str) -> Self {
        if condition {
            self.optional()
        } else {
            self.required(message)
        }
    }

    /// Fails with the `message` if the value is shorter than `min`
    /// characters.
    pub fn min_chars(self, min: usize, message: &str) -> Self {
        let short = self.value.chars().count() < min;
        self.fail_if(short, message)
    }

    /// Fails with the `message` if the value is longer than `max` characters.
    pub fn max_chars(self, max: usize, message: &str) -> Self {
        let long = self.value.chars().count() > max;
        self.fail_if(long, message)
    }

    /// Fails with the `message` unless the value is a non-negative decimal
    /// number.
    pub fn non_negative_decimal(self, message: &str) -> Self {
        let valid = Decimal::from_str(self.value)
            .is_ok_and(|d| !d.is_sign_negative());
        self.fail_if(!valid, message)
    }

    /// Fails with the `message` unless the value is a decimal number below
    /// the `limit`.
    ///
    /// Unparsable values are left to other rules.
    pub fn decimal_below(self, limit: Decimal, message: &str) -> Self {
        let above =
            Decimal::from_str(self.value).is_ok_and(|d| d >= limit);
        self.fail_if(above, message)
    }

    /// Fails with the `message` unless the value is an integer in the
    /// provided `range`.
    pub fn integer_in(
        self,
        range: RangeInclusive<i64>,
        message: &str,
    ) -> Self {
        let valid = i64::from_str(self.value).is_ok_and(|n| range.contains(&n));
        self.fail_if(!valid, message)
    }

    /// Fails with the `message` unless the value matches the `format`.
    pub fn matches(self, format: &Regex, message: &str) -> Self {
        let valid = format.is_match(self.value);
        self.fail_if(!valid, message)
    }

    /// Fails with the `message` unless the value is one of the `allowed`
    /// ones, ignoring ASCII case.
    pub fn one_of(self, allowed: &[&str], message: &str) -> Self {
        let valid = allowed.iter().any(|a| a.eq_ignore_ascii_case(self.value));
        self.fail_if(!valid, message)
    }

    /// Fails with the `message` unless the value satisfies the `predicate`.
    pub fn check(
        self,
        predicate: impl FnOnce(&str) -> bool,
        message: &str,
    ) -> Self {
        if self.done {
            return self;
        }
        let valid = predicate(self.value);
        self.fail_if(!valid, message)
    }

    /// Records the `message` and skips the following rules if `failed`.
    fn fail_if(mut self, failed: bool, message: &str) -> Self {
        if !self.done && failed {
            self.errors.add(self.name, message);
            self.done = true;
        }
        self
    }
}
