//! Registration form validator.
//!
//! Every field event re-runs validation synchronously and recomputes the
//! submit gate. The gate is the conjunction of all five rules. Fields the
//! user has not touched yet count as failing for the gate but keep their
//! pristine look until they are touched or the whole form is validated
//! (on submit).

pub mod rules;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

pub use rules::{
    EmailFormat, Field, FieldError, FormValues, MatchesField, MinAge, MinLength, ParseFieldError,
    PasswordRule, Predicate, RuleSet, parse_age,
};

use crate::notice::{Notice, Notifier};
use crate::surface::{Binding, EventKind, MountError, Surface, require_elements};
use crate::types::Email;

/// Element ids the form needs on its surface.
pub const FORM_ELEMENTS: [&str; 12] = [
    "registrationForm",
    "submitButton",
    "name",
    "nameError",
    "email",
    "emailError",
    "password",
    "passwordError",
    "confirmPassword",
    "confirmPasswordError",
    "age",
    "ageError",
];

/// Optional reset button; without it the reset feature is not wired.
pub const RESET_BUTTON: &str = "resetButton";

/// Shown when submit is attempted with invalid fields.
pub const CORRECT_ERRORS_MESSAGE: &str = "Please correct the errors in the form.";

/// Shown when a registration is accepted.
pub const SUBMITTED_MESSAGE: &str = "Form submitted successfully!";

/// Visible validation state of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Not validated since load or the last reset.
    #[default]
    Pristine,
    Valid,
    Invalid,
}

impl ValidationState {
    /// CSS class for the input (`valid`, `invalid`, or empty).
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Pristine => "",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FieldStatus {
    state: ValidationState,
    error: Option<FieldError>,
}

/// Submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{CORRECT_ERRORS_MESSAGE}")]
    Gated { invalid: Vec<Field> },

    /// Every rule passed but `field` does not convert to its typed value.
    /// Only reachable with rules swapped in through [`RuleSet::with_rule`].
    #[error("{field} cannot be accepted")]
    Unconvertible { field: Field },
}

/// An accepted registration.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub age: Decimal,
}

/// One rendered field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub field: Field,
    pub id: &'static str,
    pub error_id: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub state: ValidationState,
    pub error: Option<String>,
}

impl FieldView {
    /// Whether the inline error slot is shown.
    #[must_use]
    pub const fn shows_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything the form region displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub submit_enabled: bool,
    pub reset_enabled: bool,
}

impl FormView {
    #[must_use]
    pub fn field(&self, field: Field) -> Option<&FieldView> {
        self.fields.iter().find(|view| view.field == field)
    }
}

/// Registration form bound to a surface and a notifier.
pub struct FormValidator<S, N> {
    rules: RuleSet,
    values: FormValues,
    status: BTreeMap<Field, FieldStatus>,
    submit_enabled: bool,
    reset_enabled: bool,
    surface: S,
    notifier: N,
}

impl<S, N> FormValidator<S, N>
where
    S: Surface<FormView>,
    N: Notifier,
{
    /// Mount the form onto `surface` with every field empty and pristine.
    ///
    /// # Errors
    ///
    /// [`MountError`] if any of [`FORM_ELEMENTS`] is missing.
    pub fn mount(mut surface: S, notifier: N, rules: RuleSet) -> Result<Self, MountError> {
        require_elements::<FormView, _>(&surface, "registration form", &FORM_ELEMENTS)?;

        for field in Field::ALL {
            surface.subscribe(Binding::new(field.id(), EventKind::Input));
            surface.subscribe(Binding::new(field.id(), EventKind::Blur));
        }
        surface.subscribe(Binding::new("registrationForm", EventKind::Submit));
        surface.subscribe(Binding::new("submitButton", EventKind::Click));

        let reset_enabled = surface.contains(RESET_BUTTON);
        if reset_enabled {
            surface.subscribe(Binding::new(RESET_BUTTON, EventKind::Click));
        }

        let mut validator = Self {
            rules,
            values: FormValues::new(),
            status: BTreeMap::new(),
            submit_enabled: false,
            reset_enabled,
            surface,
            notifier,
        };
        validator.render();
        Ok(validator)
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    #[must_use]
    pub const fn reset_enabled(&self) -> bool {
        self.reset_enabled
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    #[must_use]
    pub fn state(&self, field: Field) -> ValidationState {
        self.status.get(&field).map_or_else(ValidationState::default, |s| s.state)
    }

    #[must_use]
    pub fn error_message(&self, field: Field) -> Option<String> {
        self.status
            .get(&field)
            .and_then(|s| s.error.as_ref())
            .map(ToString::to_string)
    }

    /// The value of `field` changed. Returns whether submit is now enabled.
    pub fn input(&mut self, field: Field, value: impl Into<String>) -> bool {
        self.values.set(field, value);
        self.evaluate(field);
        self.update_submit_gate()
    }

    /// `field` lost focus. Returns whether submit is now enabled.
    pub fn blur(&mut self, field: Field) -> bool {
        self.evaluate(field);
        self.update_submit_gate()
    }

    /// Validate one field and show the result. Returns its validity.
    pub fn validate_field(&mut self, field: Field) -> bool {
        let valid = self.evaluate(field);
        self.render();
        valid
    }

    /// Validate and show every field, without short-circuiting. Returns
    /// whether all of them passed.
    pub fn validate_form(&mut self) -> bool {
        let all_valid = Field::ALL
            .into_iter()
            .map(|field| self.evaluate(field))
            .fold(true, |all, valid| all && valid);
        self.submit_enabled = all_valid;
        self.render();
        all_valid
    }

    /// Re-validate every touched field and recompute the gate from all
    /// rules. Returns the gate.
    pub fn update_submit_gate(&mut self) -> bool {
        for field in Field::ALL {
            if self.state(field) != ValidationState::Pristine {
                self.evaluate(field);
            }
        }
        self.submit_enabled = Field::ALL
            .into_iter()
            .all(|field| self.rules.check(field, &self.values).is_ok());
        self.render();
        self.submit_enabled
    }

    /// Accept the registration if every field is valid, then reset.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Gated`] listing the invalid fields, or
    /// [`SubmitError::Unconvertible`] naming the field that passed its rule
    /// but has no typed value (that field is then shown as invalid). Either
    /// way nothing is accepted and an error notice is shown.
    pub fn submit(&mut self) -> Result<Registration, SubmitError> {
        if !self.validate_form() {
            self.notifier.notify(Notice::error(CORRECT_ERRORS_MESSAGE));
            return Err(SubmitError::Gated {
                invalid: self.invalid_fields(),
            });
        }

        match self.registration() {
            Ok(registration) => {
                self.notifier.notify(Notice::success(SUBMITTED_MESSAGE));
                self.reset();
                Ok(registration)
            }
            Err((field, error)) => {
                self.status.insert(
                    field,
                    FieldStatus {
                        state: ValidationState::Invalid,
                        error: Some(error),
                    },
                );
                self.submit_enabled = false;
                self.render();
                self.notifier.notify(Notice::error(CORRECT_ERRORS_MESSAGE));
                Err(SubmitError::Unconvertible { field })
            }
        }
    }

    /// Clear every field back to empty and pristine and disable submit.
    pub fn reset(&mut self) {
        self.values.clear();
        self.status.clear();
        self.submit_enabled = false;
        self.render();
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        FormView {
            fields: Field::ALL
                .into_iter()
                .map(|field| FieldView {
                    field,
                    id: field.id(),
                    error_id: field.error_id(),
                    label: field.label(),
                    input_type: field.input_type(),
                    value: self.values.get(field).to_owned(),
                    state: self.state(field),
                    error: self.error_message(field),
                })
                .collect(),
            submit_enabled: self.submit_enabled,
            reset_enabled: self.reset_enabled,
        }
    }

    fn evaluate(&mut self, field: Field) -> bool {
        let status = match self.rules.check(field, &self.values) {
            Ok(()) => FieldStatus {
                state: ValidationState::Valid,
                error: None,
            },
            Err(err) => FieldStatus {
                state: ValidationState::Invalid,
                error: Some(err),
            },
        };
        let valid = status.state == ValidationState::Valid;
        self.status.insert(field, status);
        valid
    }

    fn invalid_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.state(*field) == ValidationState::Invalid)
            .collect()
    }

    /// Typed registration from the current values.
    ///
    /// The default rules accept exactly what converts here; replaced rules
    /// may accept more.
    fn registration(&self) -> Result<Registration, (Field, FieldError)> {
        let email = Email::parse(self.values.get(Field::Email))
            .map_err(|_| (Field::Email, FieldError::InvalidEmail))?;
        let age = parse_age(self.values.get(Field::Age)).map_err(|err| (Field::Age, err))?;

        Ok(Registration {
            name: self.values.get(Field::Name).to_owned(),
            email,
            password: SecretString::from(self.values.get(Field::Password).to_owned()),
            age,
        })
    }

    fn render(&mut self) {
        let view = self.view();
        self.surface.render(&view);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::ExposeSecret;

    use super::*;
    use crate::notice::{NoticeQueue, Severity};
    use crate::surface::MemorySurface;

    type TestValidator = FormValidator<MemorySurface<FormView>, Arc<NoticeQueue>>;

    fn surface() -> MemorySurface<FormView> {
        MemorySurface::with_elements(FORM_ELEMENTS.iter().copied().chain([RESET_BUTTON]))
    }

    fn mount(rules: RuleSet) -> (TestValidator, Arc<NoticeQueue>) {
        let notices = Arc::new(NoticeQueue::new());
        let validator = FormValidator::mount(surface(), Arc::clone(&notices), rules).unwrap();
        (validator, notices)
    }

    fn fill_valid(validator: &mut TestValidator) -> bool {
        validator.input(Field::Name, "Ana");
        validator.input(Field::Email, "a@b.co");
        validator.input(Field::Password, "abc123!X");
        validator.input(Field::ConfirmPassword, "abc123!X");
        validator.input(Field::Age, "20")
    }

    fn error_visibility(view: &FormView) -> Vec<(Field, bool)> {
        view.fields
            .iter()
            .map(|field| (field.field, field.shows_error()))
            .collect()
    }

    #[test]
    fn test_mount_requires_elements() {
        let surface = surface().without("ageError");
        let result = FormValidator::mount(surface, NoticeQueue::new(), RuleSet::strict());
        assert!(matches!(
            result,
            Err(MountError::MissingElement {
                element: "ageError",
                ..
            })
        ));
    }

    #[test]
    fn test_mount_starts_pristine_and_gated() {
        let (validator, _) = mount(RuleSet::strict());
        let view = validator.surface().last().unwrap();
        assert!(!view.submit_enabled);
        assert!(view.reset_enabled);
        assert!(
            view.fields
                .iter()
                .all(|field| field.state == ValidationState::Pristine && field.error.is_none())
        );
        assert!(validator.surface().is_subscribed("age", EventKind::Blur));
        assert!(validator.surface().is_subscribed("email", EventKind::Input));
    }

    #[test]
    fn test_reset_button_is_optional() {
        let validator = FormValidator::mount(
            surface().without(RESET_BUTTON),
            NoticeQueue::new(),
            RuleSet::strict(),
        )
        .unwrap();
        assert!(!validator.reset_enabled());
        assert!(!validator.surface().is_subscribed(RESET_BUTTON, EventKind::Click));
    }

    #[test]
    fn test_gate_conjunction() {
        let (mut validator, _) = mount(RuleSet::strict());
        assert!(fill_valid(&mut validator));
        assert!(validator.surface().last().unwrap().submit_enabled);

        let before = error_visibility(validator.surface().last().unwrap());
        assert!(!validator.input(Field::Age, "17"));

        let view = validator.surface().last().unwrap();
        assert!(!view.submit_enabled);
        let age = view.field(Field::Age).unwrap();
        assert_eq!(age.state, ValidationState::Invalid);
        assert_eq!(age.error.as_deref(), Some("You must be at least 18 years old."));

        for ((field, was), (_, now)) in before.into_iter().zip(error_visibility(view)) {
            if field != Field::Age {
                assert_eq!(was, now, "{field} changed visibility");
            }
        }
    }

    #[test]
    fn test_untouched_fields_stay_pristine() {
        let (mut validator, _) = mount(RuleSet::strict());
        assert!(!validator.input(Field::Age, "17"));

        assert_eq!(validator.state(Field::Age), ValidationState::Invalid);
        assert_eq!(validator.state(Field::Name), ValidationState::Pristine);
        assert!(validator.error_message(Field::Email).is_none());
    }

    #[test]
    fn test_changing_age_leaves_name_and_email_alone() {
        let (mut validator, _) = mount(RuleSet::strict());
        validator.input(Field::Name, "Al");
        validator.input(Field::Email, "a@b.co");

        for age in ["12", "30", "abc", ""] {
            validator.input(Field::Age, age);
            assert!(validator.error_message(Field::Name).is_some());
            assert!(validator.error_message(Field::Email).is_none());
        }

        validator.input(Field::Name, "Alan");
        assert!(validator.error_message(Field::Age).is_some());
    }

    #[test]
    fn test_blur_reveals_empty_field() {
        let (mut validator, _) = mount(RuleSet::strict());
        assert!(!validator.blur(Field::Name));
        assert_eq!(
            validator.error_message(Field::Name).as_deref(),
            Some("Name must be at least 3 characters.")
        );
    }

    #[test]
    fn test_confirmation_tracks_password_changes() {
        let (mut validator, _) = mount(RuleSet::strict());
        fill_valid(&mut validator);

        validator.input(Field::Password, "xyz789!Q");
        assert_eq!(validator.state(Field::ConfirmPassword), ValidationState::Invalid);
        assert!(!validator.is_submit_enabled());

        validator.input(Field::ConfirmPassword, "xyz789!Q");
        assert!(validator.is_submit_enabled());
    }

    #[test]
    fn test_simple_profile_password() {
        let (mut validator, _) = mount(RuleSet::simple());
        validator.input(Field::Name, "Ana");
        validator.input(Field::Email, "a@b.co");
        validator.input(Field::Password, "abcdef");
        validator.input(Field::ConfirmPassword, "abcdef");
        assert!(validator.input(Field::Age, "18"));
    }

    #[test]
    fn test_validate_field_returns_validity() {
        let (mut validator, _) = mount(RuleSet::strict());
        validator.input(Field::Email, "nope");
        assert!(!validator.validate_field(Field::Email));
        validator.input(Field::Email, "a@b.co");
        assert!(validator.validate_field(Field::Email));
    }

    #[test]
    fn test_validate_form_evaluates_every_field() {
        let (mut validator, _) = mount(RuleSet::strict());
        validator.input(Field::Name, "Ana");

        assert!(!validator.validate_form());
        let view = validator.surface().last().unwrap();
        assert_eq!(view.field(Field::Name).unwrap().state, ValidationState::Valid);
        for field in [Field::Email, Field::Password, Field::ConfirmPassword, Field::Age] {
            assert_eq!(view.field(field).unwrap().state, ValidationState::Invalid);
        }
    }

    #[test]
    fn test_submit_while_gated() {
        let (mut validator, notices) = mount(RuleSet::strict());
        validator.input(Field::Name, "Ana");

        let err = validator.submit().unwrap_err();
        assert_eq!(
            err,
            SubmitError::Gated {
                invalid: vec![Field::Email, Field::Password, Field::ConfirmPassword, Field::Age]
            }
        );
        let drained = notices.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].severity, Severity::Error);
        assert_eq!(drained[0].message, CORRECT_ERRORS_MESSAGE);
        // Nothing was cleared.
        assert_eq!(validator.value(Field::Name), "Ana");
    }

    #[test]
    fn test_submit_accepts_and_resets() {
        let (mut validator, notices) = mount(RuleSet::strict());
        fill_valid(&mut validator);

        let registration = validator.submit().unwrap();
        assert_eq!(registration.name, "Ana");
        assert_eq!(registration.email.as_str(), "a@b.co");
        assert_eq!(registration.password.expose_secret(), "abc123!X");
        assert_eq!(registration.age, Decimal::from(20));

        assert_eq!(notices.drain()[0].severity, Severity::Success);
        let view = validator.surface().last().unwrap();
        assert!(!view.submit_enabled);
        assert!(
            view.fields
                .iter()
                .all(|field| field.value.is_empty() && field.state == ValidationState::Pristine)
        );
    }

    #[test]
    fn test_age_beyond_u32_submits() {
        let (mut validator, notices) = mount(RuleSet::strict());
        fill_valid(&mut validator);
        assert!(validator.input(Field::Age, "5000000000"));

        let registration = validator.submit().unwrap();
        assert_eq!(registration.age, Decimal::from(5_000_000_000_u64));
        assert_eq!(notices.drain()[0].message, SUBMITTED_MESSAGE);
    }

    #[test]
    fn test_decimal_age_submits() {
        let (mut validator, _) = mount(RuleSet::strict());
        fill_valid(&mut validator);
        assert!(validator.input(Field::Age, "20.5"));

        assert_eq!(validator.submit().unwrap().age, Decimal::new(205, 1));
    }

    #[test]
    fn test_oversized_age_closes_the_gate_with_a_message() {
        let (mut validator, _) = mount(RuleSet::strict());
        fill_valid(&mut validator);

        assert!(!validator.input(Field::Age, "9".repeat(40)));
        assert_eq!(validator.state(Field::Age), ValidationState::Invalid);
        assert_eq!(
            validator.error_message(Field::Age).as_deref(),
            Some("Please enter a realistic age.")
        );
    }

    #[test]
    fn test_open_gate_always_submits_with_default_rules() {
        for age in ["18", "18.5", "120", "5000000000", " 42 "] {
            let (mut validator, _) = mount(RuleSet::strict());
            fill_valid(&mut validator);
            assert!(validator.input(Field::Age, age), "{age:?} should open the gate");
            assert!(validator.submit().is_ok(), "{age:?} should submit");
        }
    }

    #[test]
    fn test_unconvertible_value_is_reported_on_its_field() {
        let lenient_email = RuleSet::strict()
            .with_rule(Field::Email, |_: &str, _: &FormValues| Ok::<(), FieldError>(()));
        let (mut validator, notices) = mount(lenient_email);
        fill_valid(&mut validator);
        assert!(validator.input(Field::Email, "not-an-email"));

        let err = validator.submit().unwrap_err();
        assert_eq!(err, SubmitError::Unconvertible { field: Field::Email });
        assert_eq!(validator.state(Field::Email), ValidationState::Invalid);
        assert_eq!(
            validator.error_message(Field::Email).as_deref(),
            Some("Invalid email format.")
        );
        assert!(!validator.is_submit_enabled());
        assert_eq!(notices.drain()[0].message, CORRECT_ERRORS_MESSAGE);
        assert_eq!(validator.value(Field::Name), "Ana");
    }

    #[test]
    fn test_reset_then_validate_form() {
        let (mut validator, _) = mount(RuleSet::strict());
        fill_valid(&mut validator);
        validator.reset();

        assert!(!validator.validate_form());
        assert!(!validator.is_submit_enabled());
        for field in Field::ALL {
            assert_ne!(validator.state(field), ValidationState::Valid, "{field}");
        }
    }

    #[test]
    fn test_custom_rule_flows_through() {
        let rules = RuleSet::strict().with_rule(Field::Age, MinAge { min: 21 });
        let (mut validator, _) = mount(rules);
        validator.input(Field::Age, "20");
        assert_eq!(
            validator.error_message(Field::Age).as_deref(),
            Some("You must be at least 21 years old.")
        );
    }
}
