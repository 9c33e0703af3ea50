//! End-to-end: real Salesforce adapters and JSON token store against a mock CRM.

use sms_forwarder::adapters::persistence::JsonTokenStore;
use sms_forwarder::adapters::salesforce::{PasswordGrantAuthAdapter, SalesforceCrmGateway};
use sms_forwarder::adapters::source::parse_batch;
use sms_forwarder::domain::{
    BatchOutcome, Classifier, ExternalIdMode, FailureReason, ForwardingOutcome, PayloadBuilder,
};
use sms_forwarder::ports::{ForwardingPort, TokenStorePort};
use sms_forwarder::shared::config::PasswordGrant;
use sms_forwarder::usecases::{AuthService, Dispatcher, ForwardingPipeline};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/services/oauth2/token";
const RESOURCE: &str = "/services/data/v62.0/sobjects/FinPlan__SMS_Message__c";

const BATCH: &str = r#"[
    {"sender": "VM-HDFCBK", "content": "Rs 1,250.00 debited from\nA/c XX9560", "received_at": "2024-01-02 10:20:30.123"},
    {"sender": "+15550100", "content": "running late, 10 min", "received_at": "2024-01-02 10:21:00.000"},
    {"sender": "AX-ICICI", "content": "Available Bal: 40,000", "received_at": "2024-01-02 10:22:00.000"}
]"#;

fn grant(server: &MockServer) -> PasswordGrant {
    PasswordGrant {
        login_url: format!("{}{}", server.uri(), TOKEN_PATH),
        client_id: "cid".into(),
        client_secret: "csecret".into(),
        username: "ops@example.com".into(),
        password: "hunter2".into(),
    }
}

async fn spawn(server: &MockServer, token_file: &Path, mode: ExternalIdMode) -> Dispatcher {
    let store = JsonTokenStore::new(token_file);
    store.load().await.unwrap();
    let pipeline = ForwardingPipeline {
        auth: AuthService::new(
            Arc::new(PasswordGrantAuthAdapter::new(grant(server))),
            Arc::new(store),
        ),
        gateway: Arc::new(SalesforceCrmGateway::new(RESOURCE)),
        classifier: Classifier::new(mode),
        payloads: PayloadBuilder::new("pixel-7"),
    };
    Dispatcher::spawn(pipeline).0
}

#[tokio::test]
async fn forwards_transactional_messages_after_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "00D!live",
            "instance_url": server.uri(),
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESOURCE))
        .and(header("authorization", "Bearer 00D!live"))
        .and(body_partial_json(serde_json::json!({
            "FinPlan__Created_From__c": "SMS",
            "FinPlan__Device__c": "pixel-7"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "a01xx0000001",
            "success": true,
            "errors": []
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    let dispatcher = spawn(&server, &token_file, ExternalIdMode::Legacy).await;

    let report = dispatcher
        .submit_batch(parse_batch(BATCH).unwrap())
        .report()
        .await
        .unwrap();
    assert_eq!(
        report.outcome,
        BatchOutcome::Completed(vec![
            ForwardingOutcome::Sent,
            ForwardingOutcome::DroppedNotTransactional,
            ForwardingOutcome::Sent,
        ])
    );

    // Login result survives a restart.
    let reopened = JsonTokenStore::new(&token_file);
    reopened.load().await.unwrap();
    let cred = reopened.get().await.unwrap().unwrap();
    assert_eq!(cred.access_token, "00D!live");
    assert_eq!(cred.instance_url, server.uri());

    let received = server.received_requests().await.unwrap();
    let first_record: serde_json::Value = received
        .iter()
        .find(|r| r.url.path() == RESOURCE)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .unwrap();
    assert_eq!(
        first_record["FinPlan__Content__c"],
        "Rs 1,250.00 debited from A/c XX9560"
    );
    assert_eq!(
        first_record["FinPlan__Original_Content__c"],
        "Rs 1,250.00 debited from\nA/c XX9560"
    );
    assert_eq!(first_record["FinPlan__External_Id__c"], "");
}

#[tokio::test]
async fn cached_token_is_used_without_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESOURCE))
        .and(header("authorization", "Bearer cached-token"))
        .and(body_partial_json(serde_json::json!({
            "FinPlan__External_Id__c": "20240102102030123"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    std::fs::write(
        &token_file,
        serde_json::json!({
            "salesforce_credential": {
                "access_token": "cached-token",
                "instance_url": server.uri()
            }
        })
        .to_string(),
    )
    .unwrap();

    let dispatcher = spawn(&server, &token_file, ExternalIdMode::Literal).await;
    let batch = parse_batch(BATCH).unwrap().into_iter().take(1).collect();
    let report = dispatcher.submit_batch(batch).report().await.unwrap();
    assert_eq!(
        report.outcome,
        BatchOutcome::Completed(vec![ForwardingOutcome::Sent])
    );
}

#[tokio::test]
async fn failed_login_posts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "authentication failure"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dispatcher = spawn(&server, &dir.path().join("token.json"), ExternalIdMode::Legacy).await;
    let report = dispatcher
        .submit_batch(parse_batch(BATCH).unwrap())
        .report()
        .await
        .unwrap();
    assert_eq!(
        report.outcome,
        BatchOutcome::AuthenticationFailed(
            "Authentication failed: invalid_grant: authentication failure".into()
        )
    );
}

#[tokio::test]
async fn rejected_record_does_not_stop_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RESOURCE))
        .and(body_partial_json(serde_json::json!({"FinPlan__Sender__c": "VM-HDFCBK"})))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"[{"message":"duplicate value found","errorCode":"DUPLICATE_VALUE"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESOURCE))
        .and(body_partial_json(serde_json::json!({"FinPlan__Sender__c": "AX-ICICI"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    std::fs::write(
        &token_file,
        serde_json::json!({
            "salesforce_credential": {"access_token": "t", "instance_url": server.uri()}
        })
        .to_string(),
    )
    .unwrap();

    let dispatcher = spawn(&server, &token_file, ExternalIdMode::Legacy).await;
    let report = dispatcher
        .submit_batch(parse_batch(BATCH).unwrap())
        .report()
        .await
        .unwrap();
    assert_eq!(
        report.outcome,
        BatchOutcome::Completed(vec![
            ForwardingOutcome::Failed(FailureReason::HttpStatus(400)),
            ForwardingOutcome::DroppedNotTransactional,
            ForwardingOutcome::Sent,
        ])
    );
}
