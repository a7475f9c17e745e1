//! HTTP document store and email relay against a mock server.

use mockito::Matcher;
use serde_json::json;

use focushub_core::error::{EmailError, StoreError};
use focushub_core::notify::{send_thank_you, EmailSender, HttpEmailSender};
use focushub_core::persistence::{DocumentStore, PersistenceBackend, RemoteBackend};
use focushub_core::{HttpDocumentStore, PersistenceRecord};

#[tokio::test]
async fn document_get_maps_404_to_absent() {
    let mut server = mockito::Server::new_async().await;
    let missing = server
        .mock("GET", "/api/users/nobody")
        .with_status(404)
        .create_async()
        .await;

    let store = HttpDocumentStore::new(&format!("{}/api", server.url())).unwrap();
    assert!(store.get("users/nobody").await.unwrap().is_none());
    missing.assert_async().await;
}

#[tokio::test]
async fn document_get_returns_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/users/u1")
        .match_header("authorization", "Bearer s3cret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"email":"a@b.c","focusHub":{"tasks":[]}}"#)
        .create_async()
        .await;

    let store = HttpDocumentStore::new(&format!("{}/api", server.url()))
        .unwrap()
        .with_token("s3cret");
    let doc = store.get("users/u1").await.unwrap().unwrap();
    assert_eq!(doc["email"], "a@b.c");
}

#[tokio::test]
async fn document_server_error_is_typed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/u1")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let store = HttpDocumentStore::new(&server.url()).unwrap();
    match store.get("users/u1").await {
        Err(StoreError::Remote { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn remote_backend_patches_focus_hub_section() {
    let mut server = mockito::Server::new_async().await;
    let patch = server
        .mock("PATCH", "/users/u7")
        .match_body(Matcher::PartialJson(json!({
            "focusHub": {
                "customizations": {
                    "selectedVibe": "simple",
                    "timerSettings": { "defaultDuration": 25, "breakDuration": 5, "autoStart": false }
                },
                "statistics": { "totalSessions": 3 }
            }
        })))
        .with_status(204)
        .create_async()
        .await;

    let store = std::sync::Arc::new(HttpDocumentStore::new(&server.url()).unwrap());
    let backend = RemoteBackend::new(store, "u7");
    let mut record = PersistenceRecord::default();
    record.statistics.total_sessions = 3;
    backend.save(&record).await.unwrap();
    patch.assert_async().await;
}

#[tokio::test]
async fn relay_receives_thank_you() {
    let mut server = mockito::Server::new_async().await;
    let relay = server
        .mock("POST", "/send")
        .match_header("authorization", "Bearer relay-key")
        .match_body(Matcher::PartialJson(json!({
            "from": "Focus Hub <hub@example.com>",
            "to": "reader@example.com",
            "subject": "Thank you!"
        })))
        .with_status(200)
        .create_async()
        .await;

    let sender =
        HttpEmailSender::new(&format!("{}/send", server.url()), "Focus Hub <hub@example.com>")
            .unwrap()
            .with_token("relay-key");
    send_thank_you(&sender, "reader@example.com", Some("Reader"))
        .await
        .unwrap();
    relay.assert_async().await;
}

#[tokio::test]
async fn relay_rejection_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/send")
        .with_status(502)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let sender = HttpEmailSender::new(&format!("{}/send", server.url()), "hub@example.com").unwrap();
    let message = focushub_core::notify::thank_you_message("reader@example.com", None);
    match sender.send(&message).await {
        Err(EmailError::Rejected { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
