//! Validator core
//!
//! A validator is a pure function from a value (and an optional custom message)
//! to a [`Validation`]. A field's validators run left to right and stop at the
//! first failure.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::result::Validation;

/// Default error tokens of the built-in validators.
pub mod messages {
    pub const NOT_STRING_TYPE: &str = "Not a string type";
    pub const NOT_NUMBER_TYPE: &str = "Not a number type";
    pub const NOT_BOOLEAN_TYPE: &str = "Not an boolean type";
    pub const CANNOT_BE_EMPTY: &str = "Cannot be empty";
    pub const SHOULD_BE_EMPTY: &str = "Should be empty";
    pub const NOT_ALLOWED: &str = "Value not allowed";
    pub const NOT_VALID_EMAIL: &str = "Not a valid email";
    pub const MIN_LEN_STRING: &str = "Value is too short";
    pub const NO_UPPERCASE_PRESENT: &str = "No uppercase character present";
    pub const NO_LOWERCASE_PRESENT: &str = "No lowercase character present";
    pub const NO_DIGIT_PRESENT: &str = "No digit character present";
    pub const NOT_HEX_COLOR: &str = "Invalid hex color";
}

type CheckFn<E> = dyn Fn(Value, Option<&str>) -> Validation<Value, E> + Send + Sync;

/// A single validation rule.
pub struct Validator<E = String> {
    check: Arc<CheckFn<E>>,
    message: Option<String>,
}

impl<E> Clone for Validator<E> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            message: self.message.clone(),
        }
    }
}

impl<E> fmt::Debug for Validator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl<E> Validator<E> {
    pub fn new(
        check: impl Fn(Value, Option<&str>) -> Validation<Value, E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            check: Arc::new(check),
            message: None,
        }
    }

    /// Replace the rule's default error token.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn check(&self, value: Value) -> Validation<Value, E> {
        (self.check)(value, self.message.as_deref())
    }
}

/// Ordered validators of one field.
pub type Validators<E = String> = Vec<Validator<E>>;

/// Fold `validators` over `value`, stopping at the first failure.
///
/// The failure is returned as produced by the failing validator, carrying that
/// validator's input value. An empty list always succeeds with `value`.
pub fn run_validators<E>(validators: &[Validator<E>], value: Value) -> Validation<Value, E> {
    let mut outcome = Validation::Valid(value);
    for validator in validators {
        outcome = match outcome {
            Validation::Valid(value) => validator.check(value),
            invalid => return invalid,
        };
    }
    outcome
}

/// Undefined/null, the empty string, `{}` and `[]` count as empty.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Plain text of a scalar value; strings are not quoted, null is empty.
pub(crate) fn text_of(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

static AZ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\-_]*$").expect("AZ pattern failed"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+@.+\..+$").expect("EMAIL pattern failed"));
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(#[0-9a-f]{3}|#[0-9a-f]{6})$").expect("HEX_COLOR pattern failed")
});

fn rule(
    default_message: &'static str,
    accept: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> Validator<String> {
    Validator::new(move |value, message| {
        if accept(&value) {
            Validation::Valid(value)
        } else {
            Validation::invalid(message.unwrap_or(default_message).to_string(), value)
        }
    })
}

pub fn string() -> Validator {
    rule(messages::NOT_STRING_TYPE, Value::is_string)
}

pub fn not_empty() -> Validator {
    rule(messages::CANNOT_BE_EMPTY, |v| !is_empty(v))
}

pub fn empty() -> Validator {
    rule(messages::SHOULD_BE_EMPTY, is_empty)
}

/// Letters, `-` and `_` only.
pub fn az() -> Validator {
    rule(messages::NOT_ALLOWED, |v| AZ.is_match(&text_of(v)))
}

pub fn email() -> Validator {
    rule(messages::NOT_VALID_EMAIL, |v| {
        v.as_str().is_some_and(|s| EMAIL.is_match(s))
    })
}

pub fn number() -> Validator {
    rule(messages::NOT_NUMBER_TYPE, Value::is_number)
}

pub fn boolean() -> Validator {
    rule(messages::NOT_BOOLEAN_TYPE, Value::is_boolean)
}

pub fn hex_color() -> Validator {
    rule(messages::NOT_HEX_COLOR, |v| HEX_COLOR.is_match(&text_of(v)))
}

pub fn uppercase_present() -> Validator {
    rule(messages::NO_UPPERCASE_PRESENT, |v| {
        text_of(v).chars().any(char::is_uppercase)
    })
}

pub fn lowercase_present() -> Validator {
    rule(messages::NO_LOWERCASE_PRESENT, |v| {
        text_of(v).chars().any(char::is_lowercase)
    })
}

pub fn digit_present() -> Validator {
    rule(messages::NO_DIGIT_PRESENT, |v| {
        text_of(v).chars().any(|c| c.is_ascii_digit())
    })
}

/// At least `min` characters (or items, for arrays).
pub fn min_length(min: usize) -> Validator {
    Validator::new(move |value, message| {
        let len = match &value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            _ => 0,
        };
        if len >= min {
            Validation::Valid(value)
        } else {
            let error = match message {
                Some(message) => message.to_string(),
                None => format!("{} ({})", messages::MIN_LEN_STRING, min),
            };
            Validation::invalid(error, value)
        }
    })
}

pub fn member_of(allowed: Vec<Value>) -> Validator {
    rule(messages::NOT_ALLOWED, move |v| allowed.contains(v))
}

pub fn valid_string() -> Validators {
    vec![string(), not_empty()]
}

pub fn valid_number() -> Validators {
    vec![number(), not_empty()]
}

pub fn valid_password() -> Validators {
    vec![
        string(),
        not_empty(),
        min_length(8),
        uppercase_present(),
        digit_present(),
    ]
}
