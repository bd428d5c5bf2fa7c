//! Registration validation, submit and reset.

use axum::http::StatusCode;
use caprichos_integration_tests::{TestApp, TestPage};
use caprichos_storefront::config::StorefrontConfig;

const VALID: [(&str, &str); 5] = [
    ("name", "Ana"),
    ("email", "ana@example.com"),
    ("password", "abc123!X"),
    ("confirmPassword", "abc123!X"),
    ("age", "30"),
];

async fn fill(page: &TestPage, values: &[(&str, &str)]) -> caprichos_integration_tests::TestResponse {
    let mut last = None;
    for (field, value) in values {
        last = Some(
            page.post(&format!("/register/fields/{field}"), &[("value", *value)])
                .await,
        );
    }
    last.expect("at least one field")
}

#[tokio::test]
async fn short_name_is_marked_invalid() {
    let page = TestApp::new().page().await;
    let response = page.post("/register/fields/name", &[("value", "Al")]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"id="nameStatus" class="field-status invalid""#));
    assert!(response.body.contains("Name must be at least 3 characters."));
    assert!(response.body.contains(r#"id="submitButton" type="submit" disabled"#));
}

#[tokio::test]
async fn field_response_leaves_inputs_alone() {
    let page = TestApp::new().page().await;
    let response = page.post("/register/fields/name", &[("value", "Ana")]).await;

    assert!(!response.body.contains("<input"));
    assert!(response.body.contains(r#"id="nameStatus" class="field-status valid""#));
    assert_eq!(response.count(r#"hx-swap-oob="true""#), 11);
}

#[tokio::test]
async fn field_value_can_come_from_its_input_name() {
    let page = TestApp::new().page().await;
    let response = page.post("/register/fields/email", &[("email", "ana@")]).await;

    assert!(response.body.contains("Invalid email format."));
}

#[tokio::test]
async fn blur_on_untouched_field_shows_its_error() {
    let page = TestApp::new().page().await;
    let response = page.post("/register/fields/age", &[]).await;

    assert!(response.body.contains(r#"id="ageStatus" class="field-status invalid""#));
    assert!(response.body.contains("Age must be a number."));
    assert!(response.body.contains(r#"id="nameStatus" class="field-status ""#));
}

#[tokio::test]
async fn unknown_field_is_not_found() {
    let page = TestApp::new().page().await;
    let response = page.post("/register/fields/nickname", &[("value", "x")]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn weak_password_fails_strict_profile() {
    let page = TestApp::new().page().await;
    let response = page
        .post("/register/fields/password", &[("value", "abcdefgh")])
        .await;

    assert!(response.body.contains("include a number and a special character"));
}

#[tokio::test]
async fn mismatched_confirmation_is_reported() {
    let page = TestApp::new().page().await;
    fill(&page, &[("password", "abc123!X")]).await;
    let response = page
        .post("/register/fields/confirmPassword", &[("value", "abc123!Y")])
        .await;

    assert!(response.body.contains("Passwords do not match."));
}

#[tokio::test]
async fn all_valid_fields_open_the_gate() {
    let page = TestApp::new().page().await;
    let response = fill(&page, &VALID).await;

    assert!(response.body.contains(r#"id="submitButton" type="submit" hx-swap-oob="true""#));
    assert_eq!(response.count("field-status valid"), 5);
}

#[tokio::test]
async fn underage_keeps_the_gate_closed() {
    let page = TestApp::new().page().await;
    fill(&page, &VALID).await;
    let response = page.post("/register/fields/age", &[("value", "17")]).await;

    assert!(response.body.contains("You must be at least 18 years old."));
    assert!(response.body.contains(r#"id="submitButton" type="submit" disabled"#));
}

#[tokio::test]
async fn incomplete_submit_is_refused() {
    let page = TestApp::new().page().await;
    fill(&page, &[("name", "Ana")]).await;
    let response = page.post("/register/submit", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"id="registration-widget""#));
    assert!(response.body.contains("notice notice-error"));
    assert!(response.body.contains("Please correct the errors in the form."));
    assert!(response.body.contains("Invalid email format."));
    assert!(response.body.contains(r#"value="Ana""#));
}

#[tokio::test]
async fn valid_submit_succeeds_and_clears_the_form() {
    let page = TestApp::new().page().await;
    fill(&page, &VALID).await;
    let response = page.post("/register/submit", &[]).await;

    assert!(response.body.contains("notice notice-success"));
    assert!(response.body.contains("Form submitted successfully!"));
    assert!(!response.body.contains("ana@example.com"));
    assert_eq!(response.count("field-status valid"), 0);
    assert!(response.body.contains(r#"id="submitButton" type="submit" disabled"#));
}

#[tokio::test]
async fn reset_clears_values_and_errors() {
    let page = TestApp::new().page().await;
    fill(&page, &[("name", "Al"), ("email", "ana@example.com")]).await;
    let response = page.post("/register/reset", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains("ana@example.com"));
    assert!(!response.body.contains("Name must be at least"));
    assert_eq!(response.count("field-status invalid"), 0);
}

#[tokio::test]
async fn reset_is_missing_without_a_reset_button() {
    let app = TestApp::with_config(StorefrontConfig {
        reset_button: false,
        ..StorefrontConfig::default()
    });
    let (id, response) = app.open_page().await;
    assert!(!response.body.contains(r#"id="resetButton""#));

    let response = app.post("/register/reset", Some(&id), &[]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn decimal_age_is_accepted() {
    let page = TestApp::new().page().await;
    fill(&page, &VALID).await;
    let response = page.post("/register/fields/age", &[("value", "20.5")]).await;

    assert!(response.body.contains(r#"id="ageStatus" class="field-status valid""#));
    assert!(response.body.contains(r#"id="submitButton" type="submit" hx-swap-oob="true""#));
}

#[tokio::test]
async fn large_age_that_opens_the_gate_submits() {
    let page = TestApp::new().page().await;
    fill(&page, &VALID).await;
    let response = page
        .post("/register/fields/age", &[("value", "5000000000")])
        .await;
    assert!(response.body.contains(r#"id="submitButton" type="submit" hx-swap-oob="true""#));

    let response = page.post("/register/submit", &[]).await;

    assert!(response.body.contains("Form submitted successfully!"));
    assert!(!response.body.contains("Please correct the errors in the form."));
}

#[tokio::test]
async fn long_email_matching_the_pattern_is_valid() {
    let page = TestApp::new().page().await;
    let email = format!("{}@example.com", "a".repeat(250));
    let response = page
        .post("/register/fields/email", &[("value", email.as_str())])
        .await;

    assert!(response.body.contains(r#"id="emailStatus" class="field-status valid""#));
}
