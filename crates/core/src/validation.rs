//! Field checks and the message accumulator used by every `validate`.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};
use crate::money::is_percentage;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\+\.\*/\-]+$").expect("code pattern is valid"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Whether `value` is a record code of 1 to `max` allowed characters.
pub fn is_valid_code(value: &str, max: usize) -> bool {
    let len = value.chars().count();
    len >= 1 && len <= max && CODE_RE.is_match(value)
}

/// Whether `value` looks like an e-mail address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Trim a free-text field.
pub fn clean(value: &str) -> String {
    value.trim().to_string()
}

/// Accumulates human-readable messages while a record is checked.
///
/// Every check runs; `finish` reports all failures at once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    messages: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `msg` unless `ok`.
    pub fn check(&mut self, ok: bool, msg: impl Into<String>) -> &mut Self {
        if !ok {
            self.messages.push(msg.into());
        }
        self
    }

    pub fn error(&mut self, msg: impl Into<String>) -> &mut Self {
        self.messages.push(msg.into());
        self
    }

    pub fn code(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        self.check(
            is_valid_code(value, max),
            format!("{field} '{value}' is not valid: use 1 to {max} letters, digits or _+.*/-"),
        )
    }

    /// Empty optional codes are accepted.
    pub fn optional_code(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        match value {
            Some(v) => self.code(field, v, max),
            None => self,
        }
    }

    /// Length check counted in characters.
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if min > 0 && len == 0 {
            return self.error(format!("{field} must not be empty"));
        }
        self.check(
            len >= min && len <= max,
            format!("{field} must be between {min} and {max} characters"),
        )
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        self.text(field, value, 0, max)
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        self.check(
            value.is_empty() || is_valid_email(value),
            format!("{field} '{value}' is not a valid e-mail address"),
        )
    }

    pub fn percentage(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(
            is_percentage(value),
            format!("{field} must be a percentage between 0 and 100"),
        )
    }

    pub fn non_negative(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(value >= Decimal::ZERO, format!("{field} must not be negative"))
    }

    pub fn positive(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(value > Decimal::ZERO, format!("{field} must be greater than zero"))
    }

    /// Fold the outcome of a nested check into this validator.
    pub fn merge(&mut self, result: DomainResult<()>) -> &mut Self {
        if let Err(err) = result {
            self.messages.extend(err.messages());
        }
        self
    }

    /// Prefix every message of a nested check, e.g. with a line number.
    pub fn merge_prefixed(&mut self, prefix: &str, result: DomainResult<()>) -> &mut Self {
        if let Err(err) = result {
            self.messages
                .extend(err.messages().into_iter().map(|m| format!("{prefix}: {m}")));
        }
        self
    }

    pub fn is_ok(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn finish(self) -> DomainResult<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Invalid(self.messages))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn codes_respect_charset_and_length() {
        assert!(is_valid_code("000001", 6));
        assert!(is_valid_code("A-1/2", 6));
        assert!(!is_valid_code("", 6));
        assert!(!is_valid_code("1234567", 6));
        assert!(!is_valid_code("AB CD", 6));
        assert!(!is_valid_code("ÑO'", 6));
    }

    #[test]
    fn emails_are_loosely_checked() {
        assert!(is_valid_email("ana@example.es"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example@x.es"));
    }

    #[test]
    fn validator_collects_every_failure() {
        let mut v = Validator::new();
        v.code("codcliente", "", 6)
            .text("nombre", "   ", 1, 100)
            .email("email", "nope")
            .percentage("porcomision", dec!(120));
        let err = v.finish().unwrap_err();
        assert_eq!(err.messages().len(), 4);
    }

    #[test]
    fn optional_values_may_be_empty() {
        let mut v = Validator::new();
        v.optional_code("codagente", None, 10).email("email", "");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn merge_prefixed_keeps_origin() {
        let mut v = Validator::new();
        v.merge_prefixed("line 2", Err(DomainError::validation("bad total")));
        assert_eq!(v.messages(), ["line 2: validation failed: bad total"]);
    }
}
