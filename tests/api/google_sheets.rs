use base64::Engine;
use inquiry_relay::configuration::RecordBackend;
use secrecy::SecretString;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{any, header, method, path, path_regex},
};

use crate::helpers::{spawn_app_with, valid_submission};

const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");

fn encoded_credential(record_server: &MockServer) -> SecretString {
    let credential = serde_json::json!({
        "type": "service_account",
        "private_key_id": "test-key-id",
        "private_key": TEST_PRIVATE_KEY,
        "client_email": "relay@inquiry-relay-test.iam.gserviceaccount.com",
        "token_uri": format!("{}/token", record_server.uri())
    });
    SecretString::from(base64::engine::general_purpose::STANDARD.encode(credential.to_string()))
}

#[tokio::test]
async fn a_submission_is_appended_to_the_sheet() {
    let app = spawn_app_with(|config, record_server| {
        config.record_store.backend = RecordBackend::GoogleSheets;
        let sheets = &mut config.record_store.google_sheets;
        sheets.base_url = record_server.uri();
        sheets.spreadsheet_id = Some("sheet-123".into());
        sheets.credentials_base64 = Some(encoded_credential(record_server));
    })
    .await;
    app.email_provider_answers(200).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&app.record_server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+:append$"))
        .and(header("Authorization", "Bearer ya29.test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "spreadsheetId": "sheet-123"
        })))
        .expect(1)
        .mount(&app.record_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "message": "Success! Data saved and email sent.",
            "email": true,
            "sheet": true
        })
    );
}

#[tokio::test]
async fn an_unconfigured_sheet_rejects_the_submission_before_dispatch() {
    let app = spawn_app_with(|config, _| {
        config.record_store.backend = RecordBackend::GoogleSheets;
        config.record_store.google_sheets.spreadsheet_id = None;
    })
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.record_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"error": "Google Sheets not configured"})
    );
}

#[tokio::test]
async fn a_rejected_append_is_reported_as_a_failed_save() {
    let app = spawn_app_with(|config, record_server| {
        config.record_store.backend = RecordBackend::GoogleSheets;
        let sheets = &mut config.record_store.google_sheets;
        sheets.base_url = record_server.uri();
        sheets.spreadsheet_id = Some("sheet-123".into());
        sheets.credentials_base64 = Some(encoded_credential(record_server));
    })
    .await;
    app.email_provider_answers(200).await;

    Mock::given(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.test-token",
            "token_type": "Bearer"
        })))
        .mount(&app.record_server)
        .await;
    Mock::given(path_regex(r":append$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.record_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "message": "Email sent but failed to save to sheet.",
            "email": true,
            "sheet": false
        })
    );
}
