//! Registration fields and their validation rules.

use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::config::{PASSWORD_SYMBOLS, PasswordPolicy, ValidationConfig};
use crate::types::Email;

/// A registration form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Age,
}

impl Field {
    /// Every field, in display order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
        Self::Age,
    ];

    /// Element id of the input.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Age => "age",
        }
    }

    /// Element id of the inline error slot.
    #[must_use]
    pub const fn error_id(self) -> &'static str {
        match self {
            Self::Name => "nameError",
            Self::Email => "emailError",
            Self::Password => "passwordError",
            Self::ConfirmPassword => "confirmPasswordError",
            Self::Age => "ageError",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm password",
            Self::Age => "Age",
        }
    }

    /// HTML input type.
    #[must_use]
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Name => "text",
            Self::Email => "email",
            Self::Password | Self::ConfirmPassword => "password",
            Self::Age => "number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a string is not a field id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field: {0}")]
pub struct ParseFieldError(String);

impl FromStr for Field {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| ParseFieldError(s.to_owned()))
    }
}

/// Why a field value was rejected. The display text is the inline message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name must be at least {min} characters.")]
    TooShort { min: usize },

    #[error("Invalid email format.")]
    InvalidEmail,

    #[error("Password must be at least {min} characters.")]
    PasswordTooShort { min: usize },

    #[error("Password must be at least {min} characters and include a number and a special character.")]
    PasswordTooWeak { min: usize },

    #[error("Please confirm your password.")]
    ConfirmationMissing,

    #[error("Passwords do not match.")]
    Mismatch,

    #[error("Age must be a number.")]
    NotANumber,

    #[error("Please enter a realistic age.")]
    AgeOutOfRange,

    #[error("You must be at least {min} years old.")]
    Underage { min: u32 },

    #[error("{0}")]
    Rejected(String),
}

/// Raw values of every field, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<Field, String>,
}

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `field`, empty if never set.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// A validation rule for one field.
///
/// Rules see the whole form so cross-field checks (confirmation) read the
/// sibling's current value at validation time.
pub trait Predicate: Send + Sync {
    /// # Errors
    ///
    /// The [`FieldError`] describing why `value` is not acceptable.
    fn check(&self, value: &str, form: &FormValues) -> Result<(), FieldError>;
}

impl<F> Predicate for F
where
    F: Fn(&str, &FormValues) -> Result<(), FieldError> + Send + Sync,
{
    fn check(&self, value: &str, form: &FormValues) -> Result<(), FieldError> {
        self(value, form)
    }
}

/// At least `min` characters.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    pub min: usize,
}

impl Predicate for MinLength {
    fn check(&self, value: &str, _form: &FormValues) -> Result<(), FieldError> {
        if value.chars().count() < self.min {
            return Err(FieldError::TooShort { min: self.min });
        }
        Ok(())
    }
}

/// Parses as an [`Email`].
#[derive(Debug, Clone, Copy)]
pub struct EmailFormat;

impl Predicate for EmailFormat {
    fn check(&self, value: &str, _form: &FormValues) -> Result<(), FieldError> {
        Email::parse(value)
            .map(|_| ())
            .map_err(|_| FieldError::InvalidEmail)
    }
}

/// Satisfies a [`PasswordPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct PasswordRule {
    pub policy: PasswordPolicy,
}

impl Predicate for PasswordRule {
    fn check(&self, value: &str, _form: &FormValues) -> Result<(), FieldError> {
        let length = value.chars().count();
        match self.policy {
            PasswordPolicy::Length { min_length } if length < min_length => {
                Err(FieldError::PasswordTooShort { min: min_length })
            }
            PasswordPolicy::Strong { min_length }
                if length < min_length
                    || !value.chars().any(|c| c.is_ascii_digit())
                    || !value.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) =>
            {
                Err(FieldError::PasswordTooWeak { min: min_length })
            }
            PasswordPolicy::Length { .. } | PasswordPolicy::Strong { .. } => Ok(()),
        }
    }
}

/// Equal to another field's current value, and not empty.
#[derive(Debug, Clone, Copy)]
pub struct MatchesField {
    pub other: Field,
}

impl Predicate for MatchesField {
    fn check(&self, value: &str, form: &FormValues) -> Result<(), FieldError> {
        if value.is_empty() {
            return Err(FieldError::ConfirmationMissing);
        }
        if value != form.get(self.other) {
            return Err(FieldError::Mismatch);
        }
        Ok(())
    }
}

/// Parse an age as typed: any decimal number, surrounding whitespace ignored.
///
/// # Errors
///
/// [`FieldError::NotANumber`] for anything that is not a number, and
/// [`FieldError::AgeOutOfRange`] for a number too large to hold.
pub fn parse_age(value: &str) -> Result<Decimal, FieldError> {
    let value = value.trim();
    value.parse::<Decimal>().map_err(|_| {
        if is_numeric(value) {
            FieldError::AgeOutOfRange
        } else {
            FieldError::NotANumber
        }
    })
}

/// Optional sign, digits, at most one decimal point.
fn is_numeric(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    !(whole.is_empty() && fraction.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
}

/// A number, at least `min`.
#[derive(Debug, Clone, Copy)]
pub struct MinAge {
    pub min: u32,
}

impl Predicate for MinAge {
    fn check(&self, value: &str, _form: &FormValues) -> Result<(), FieldError> {
        if parse_age(value)? < Decimal::from(self.min) {
            return Err(FieldError::Underage { min: self.min });
        }
        Ok(())
    }
}

/// The rule applied to each field.
///
/// Built from a [`ValidationConfig`]; any rule can be swapped out with
/// [`RuleSet::with_rule`].
#[derive(Clone)]
pub struct RuleSet {
    rules: BTreeMap<Field, Arc<dyn Predicate>>,
}

impl RuleSet {
    #[must_use]
    pub fn from_config(config: &ValidationConfig) -> Self {
        let mut rules: BTreeMap<Field, Arc<dyn Predicate>> = BTreeMap::new();
        rules.insert(
            Field::Name,
            Arc::new(MinLength {
                min: config.min_name_length,
            }),
        );
        rules.insert(Field::Email, Arc::new(EmailFormat));
        rules.insert(
            Field::Password,
            Arc::new(PasswordRule {
                policy: config.password,
            }),
        );
        rules.insert(
            Field::ConfirmPassword,
            Arc::new(MatchesField {
                other: Field::Password,
            }),
        );
        rules.insert(Field::Age, Arc::new(MinAge { min: config.min_age }));
        Self { rules }
    }

    /// Six character passwords, nothing else required.
    #[must_use]
    pub fn simple() -> Self {
        Self::from_config(&ValidationConfig::simple())
    }

    /// Eight character passwords with a digit and a symbol.
    #[must_use]
    pub fn strict() -> Self {
        Self::from_config(&ValidationConfig::strict())
    }

    /// Replace the rule for `field`.
    #[must_use]
    pub fn with_rule(mut self, field: Field, rule: impl Predicate + 'static) -> Self {
        self.rules.insert(field, Arc::new(rule));
        self
    }

    /// Check `field`'s current value.
    ///
    /// # Errors
    ///
    /// The [`FieldError`] from the field's rule.
    pub fn check(&self, field: Field, form: &FormValues) -> Result<(), FieldError> {
        self.rules
            .get(&field)
            .map_or(Ok(()), |rule| rule.check(form.get(field), form))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::strict())
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("fields", &self.rules.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
