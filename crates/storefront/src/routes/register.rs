//! Registration form route handlers.
//!
//! Field events answer with out-of-band updates for every error slot, status
//! marker and the submit button, leaving the inputs the user is typing in
//! untouched. Submit and reset re-render the whole section.

use std::collections::HashMap;

use askama::Template;
use axum::{Form, extract::Path, response::Response};
use caprichos_core::EventKind;
use caprichos_core::form::{Field, FormView, ParseFieldError, RESET_BUTTON};
use tracing::instrument;

use super::fragment;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::pages::CurrentPage;

/// Whole registration section.
#[derive(Template)]
#[template(path = "partials/registration.html")]
pub struct RegistrationTemplate {
    pub form: FormView,
}

/// Out-of-band validation state for every field plus the submit button.
#[derive(Template)]
#[template(path = "partials/form_state.html")]
pub struct FormStateTemplate {
    pub form: FormView,
}

/// A field changed or lost focus (HTMX).
///
/// The new value is read from `value`, or from the field's own input name.
/// A request carrying neither counts as a blur.
#[instrument(skip_all, fields(page_id = %page.id, field = %field))]
pub async fn field(
    page: CurrentPage,
    Path(field): Path<String>,
    Form(mut values): Form<HashMap<String, String>>,
) -> Result<Response> {
    let field: Field = field
        .parse()
        .map_err(|err: ParseFieldError| AppError::NotFound(err.to_string()))?;
    let value = values.remove("value").or_else(|| values.remove(field.id()));

    page.with(|page| {
        let form = page.form_mut()?;
        let submit_enabled = match value {
            Some(value) => form.input(field, value),
            None => form.blur(field),
        };
        tracing::debug!(state = ?form.state(field), submit_enabled, "Field validated");

        let template = FormStateTemplate { form: form.view() };
        fragment(Some(&template), &page.drain_notices())
    })
}

/// Submit the registration (HTMX).
#[instrument(skip_all, fields(page_id = %page.id))]
pub async fn submit(page: CurrentPage) -> Result<Response> {
    page.with(|page| {
        let form = page.form_mut()?;

        match form.submit() {
            Ok(registration) => {
                tracing::info!(
                    email_domain = registration.email.domain(),
                    age = %registration.age,
                    "Registration accepted"
                );
                add_breadcrumb("registration", "Registration accepted", None);
            }
            Err(err) => tracing::debug!(error = %err, "Registration refused"),
        }

        let template = RegistrationTemplate { form: form.view() };
        fragment(Some(&template), &page.drain_notices())
    })
}

/// Clear the form (HTMX). Only wired when the page has a reset button.
#[instrument(skip_all, fields(page_id = %page.id))]
pub async fn reset(page: CurrentPage) -> Result<Response> {
    page.with(|page| {
        let form = page.form_mut()?;
        if !form.surface().is_subscribed(RESET_BUTTON, EventKind::Click) {
            return Err(AppError::NotFound("reset button".to_string()));
        }

        form.reset();
        tracing::debug!("Form reset");

        let template = RegistrationTemplate { form: form.view() };
        fragment(Some(&template), &page.drain_notices())
    })
}
