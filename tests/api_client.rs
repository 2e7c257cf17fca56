//! Integration tests for the REST client against a mock server
//!
//! Covers header injection, response normalization and the full save
//! path of the sequence builder over HTTP.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outreach::api::{ApiClient, ApiError};
use outreach::sequence::save::load_into;
use outreach::sequence::{SaveError, SaveTarget, SequenceSaver, SequenceStore, StepPatch, StepType};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::with_base_url(server.uri(), Some("session-token".to_string())).unwrap()
}

/// Store with one email step that passes save validation
fn saveable_store() -> SequenceStore {
    let mut store = SequenceStore::new();
    let id = store.push_step(StepType::Email);
    store.update_step(
        &id,
        StepPatch::default()
            .subject("Quick question")
            .body("Hi {{firstName}}")
            .sender("s1")
            .templates(vec!["t1".to_string()]),
    );
    store
}

// ─── Headers ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/senders/"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s1", "name": "Ann", "email": "ann@example.com"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let senders = client(&server).list_senders().await.unwrap();
    assert_eq!(senders.len(), 1);
    assert_eq!(senders[0].id, "s1");
}

#[tokio::test]
async fn test_dev_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/senders/"))
        .and(header("X-API-Key", "dev-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::with_base_url(server.uri(), None)
        .unwrap()
        .with_dev_api_key("dev-key");
    assert!(api.list_senders().await.unwrap().is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

// ─── Response normalization ─────────────────────────────────────────────

#[tokio::test]
async fn test_missing_sequence_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let steps = client(&server).get_sequence("tpl-1").await.unwrap();
    assert!(steps.is_empty());
}

#[tokio::test]
async fn test_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"detail":"bad step"}"#))
        .mount(&server)
        .await;

    let err = client(&server).put_sequence("tpl-1", &[]).await.unwrap_err();
    assert_eq!(err, ApiError::http("api", 422, r#"{"detail":"bad step"}"#));
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn test_no_content_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/templates/tpl-1/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_template("tpl-1").await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/senders/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).list_senders().await.unwrap_err();
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_template_page_with_data_alias() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/templates/"))
        .and(query_param("page", "2"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "t1", "name": "Intro", "type": "email"},
                {"id": "t2", "name": "Onboarding", "type": "sequence"}
            ],
            "page": 2,
            "limit": 10,
            "total": 12
        })))
        .mount(&server)
        .await;

    let page = client(&server).list_templates(2, 10).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].template_type.as_deref(), Some("sequence"));
    assert_eq!(page.page_count(), 2);
}

// ─── Sequence load / save ───────────────────────────────────────────────

#[tokio::test]
async fn test_load_orders_steps_by_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "steps": [
                {"id": "b", "type": "wait", "position": 1, "waitDays": 2},
                {"id": "a", "type": "email", "position": 0, "subject": "Hi",
                 "body": "Hello", "senderIds": ["s1"], "templateIds": ["t1"]}
            ]
        })))
        .mount(&server)
        .await;

    let mut store = SequenceStore::new();
    let count = load_into(&mut store, &client(&server), "tpl-1").await.unwrap();

    assert_eq!(count, 2);
    let ids: Vec<_> = store.steps().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(store.steps().iter().all(|s| s.is_valid));
    assert!(!store.is_modified());
    assert!(!store.state().is_loading);
}

#[tokio::test]
async fn test_unmodelled_step_survives_load_and_save() {
    let server = MockServer::start().await;
    let branch = json!({
        "id": "b", "type": "branch", "position": 1,
        "condition": {"opened": true}, "yesStepId": "a", "noStepId": null
    });
    Mock::given(method("GET"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "steps": [
                {"id": "a", "type": "email", "position": 0, "subject": "Hi",
                 "body": "Hello", "senderIds": ["s1"], "templateIds": ["t1"]},
                branch.clone()
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut store = SequenceStore::new();
    load_into(&mut store, &api, "tpl-1").await.unwrap();
    assert_eq!(store.steps().len(), 2);
    assert_eq!(store.steps()[1].step_type(), StepType::Other);
    assert!(store.steps()[1].is_valid);

    let first = store.steps()[0].id.clone();
    store.update_step(&first, StepPatch::default().subject("Hi again"));
    SequenceSaver::new()
        .save(
            &mut store,
            &api,
            SaveTarget::Existing {
                template_id: "tpl-1".to_string(),
            },
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(payload["steps"][0]["subject"], "Hi again");
    assert_eq!(payload["steps"][1], branch);
}

#[tokio::test]
async fn test_save_new_sequence_creates_template_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/templates/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "tpl-1", "name": "Welcome", "type": "sequence"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut store = saveable_store();
    let mut saver = SequenceSaver::new();
    let outcome = saver
        .save(
            &mut store,
            &api,
            SaveTarget::New {
                name: "  Welcome ".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.template_id, "tpl-1");
    assert_eq!(outcome.step_count, 1);
    assert!(outcome.marked_saved);
    assert!(!store.is_modified());
    assert!(!saver.is_pending());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let create: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(create, json!({"name": "Welcome", "type": "sequence"}));

    let payload: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let step = &payload["steps"][0];
    assert_eq!(step["type"], "email");
    assert_eq!(step["position"], 0);
    assert_eq!(step["subject"], "Quick question");
    assert_eq!(step["senderIds"], json!(["s1"]));
    assert_eq!(step["templateIds"], json!(["t1"]));
    assert!(step.get("errors").is_none());
}

#[tokio::test]
async fn test_failed_save_keeps_changes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/templates/tpl-1/sequence/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = client(&server);
    let mut store = saveable_store();
    let mut saver = SequenceSaver::new();
    let err = saver
        .save(
            &mut store,
            &api,
            SaveTarget::Existing {
                template_id: "tpl-1".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SaveError::Persist { .. }));
    assert_eq!(err.api_error(), Some(&ApiError::http("api", 500, "boom")));
    assert!(store.is_modified());
    assert!(store.state().last_saved.is_none());
    assert!(!saver.is_pending());
}

#[tokio::test]
async fn test_invalid_sequence_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut store = SequenceStore::new();
    store.reset_to_empty();
    let err = SequenceSaver::new()
        .save(
            &mut store,
            &client(&server),
            SaveTarget::Existing {
                template_id: "tpl-1".to_string(),
            },
        )
        .await
        .unwrap_err();

    match err {
        SaveError::Invalid(messages) => {
            assert!(messages.contains(&"Step 1: At least one sender is required".to_string()));
            assert!(messages.contains(&"Step 1: At least one template is required".to_string()));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

// ─── Leads ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lead_import_sends_list_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/leads/import/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imported": 2, "skipped": 1, "list_id": "list-1"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("leads.csv");
    std::fs::write(&file, "email\nann@example.com\nbob@example.com\n").unwrap();

    let summary = client(&server)
        .import_leads(&file, Some(" Autumn batch "))
        .await
        .unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.list_id.as_deref(), Some("list-1"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"list_name\""));
    assert!(body.contains("Autumn batch"));
    assert!(body.contains("ann@example.com"));
}
