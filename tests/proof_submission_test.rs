//! End-to-end proof submission against a mocked Bot API

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{build_app, jpeg_of_size, memory_local, signed_launch, web_user, RecordingView, ViewEvent, ADMIN_CHAT, TOKEN};
use dvtrusted::account::Session;
use dvtrusted::proof::{CaptureSource, ProofFile, ProofTask, ProofValidationError, SubmitOutcome};
use dvtrusted::storage::MemoryStore;
use dvtrusted::App;

fn photo_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": true,
        "result": {
            "message_id": 501,
            "date": 1700000000,
            "chat": {"id": ADMIN_CHAT, "type": "supergroup"},
            "photo": [
                {"file_id": "AgAC-small", "file_unique_id": "a", "width": 90, "height": 60},
                {"file_id": "AgAC-large", "file_unique_id": "b", "width": 1280, "height": 853}
            ]
        }
    }))
}

fn message_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": true,
        "result": {
            "message_id": 502,
            "date": 1700000001,
            "chat": {"id": ADMIN_CHAT, "type": "supergroup"},
            "text": "ok"
        }
    }))
}

async fn session_for(app: &App) -> Session {
    let mut view = RecordingView::default();
    app.bootstrap(&mut view, &signed_launch(&web_user(9001, "Rahim"), None))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_three_megabyte_jpeg_is_submitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendPhoto", TOKEN)))
        .and(body_string_contains("Task: yt_subscribe_3"))
        .and(body_string_contains("User: 9001"))
        .respond_with(photo_ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_partial_json(json!({"chat_id": ADMIN_CHAT, "parse_mode": "HTML"})))
        .and(body_string_contains("/approve_yt_subscribe_3"))
        .respond_with(message_ok())
        .expect(1)
        .mount(&server)
        .await;

    let app = build_app(&server.uri(), Arc::new(MemoryStore::new()), memory_local());
    let session = session_for(&app).await;

    let view = RecordingView::with_file(jpeg_of_size(3 * 1024 * 1024));
    let mut handler = app
        .proof_handler(&session, ProofTask::new("yt_subscribe_3", "Subscribe"), view)
        .with_completion_delay(Duration::ZERO);

    assert_eq!(handler.capture(CaptureSource::Camera).await, Ok(true));
    assert!(handler.view().events.contains(&ViewEvent::Preview));

    let outcome = handler.submit_proof().await;
    let SubmitOutcome::Submitted(receipt) = outcome else {
        panic!("expected a successful submission");
    };
    assert_eq!(receipt.upload.file_id, "AgAC-large");
    assert_eq!(receipt.upload.message_id, 501);
    assert_eq!(receipt.notification.map(|m| m.message_id), Some(502));

    let view = handler.into_view();
    assert_eq!(view.progress(), vec![30, 70, 100]);
    assert_eq!(
        view.alerts().last().copied(),
        Some("✅ Proof submitted successfully!\nAdmin will review and update your balance.")
    );
    assert_eq!(view.events.last(), Some(&ViewEvent::NavigatedBack));
}

#[tokio::test]
async fn test_six_megabyte_png_is_rejected_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(photo_ok())
        .expect(0)
        .mount(&server)
        .await;

    let app = build_app(&server.uri(), Arc::new(MemoryStore::new()), memory_local());
    let session = session_for(&app).await;

    let png = ProofFile::new("big.png", "image/png", vec![b'p'; 6 * 1024 * 1024]);
    let mut handler = app.proof_handler(&session, ProofTask::new("t1", "Task"), RecordingView::with_file(png));

    let result = handler.capture(CaptureSource::Gallery).await;
    assert!(matches!(result, Err(ProofValidationError::TooLarge { .. })));
    assert!(handler.selected().is_none());
    assert!(!handler.view().events.contains(&ViewEvent::Preview));
    assert_eq!(handler.view().alerts(), vec!["❌ File size too large! Max 5MB allowed."]);

    // Submitting now is the "pick a photo first" no-op
    assert!(matches!(handler.submit_proof().await, SubmitOutcome::NoFileSelected));
}

#[tokio::test]
async fn test_network_error_rolls_back_to_preview() {
    // Nothing listens on port 1
    let app = build_app("http://127.0.0.1:1", Arc::new(MemoryStore::new()), memory_local());
    let session = session_for(&app).await;

    let mut handler = app
        .proof_handler(&session, ProofTask::new("t2", "Task"), RecordingView::with_file(jpeg_of_size(1024)))
        .with_completion_delay(Duration::ZERO);
    handler.capture(CaptureSource::Gallery).await.unwrap();

    let outcome = handler.submit_proof().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));

    let view = handler.view();
    let last_alert = view.alerts().last().copied().unwrap_or_default();
    assert!(last_alert.starts_with("❌ Upload failed: "), "{}", last_alert);
    assert_eq!(view.visibility(), (Some(true), Some(false)));
    assert!(!view.events.contains(&ViewEvent::NavigatedBack));
    assert!(handler.selected().is_some(), "file stays selected for resubmission");
}

#[tokio::test]
async fn test_platform_rejection_skips_notification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendPhoto", TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: PHOTO_INVALID_DIMENSIONS"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(message_ok())
        .expect(0)
        .mount(&server)
        .await;

    let app = build_app(&server.uri(), Arc::new(MemoryStore::new()), memory_local());
    let session = session_for(&app).await;
    let mut handler = app.proof_handler(&session, ProofTask::new("t3", "Task"), RecordingView::with_file(jpeg_of_size(64)));
    handler.capture(CaptureSource::Gallery).await.unwrap();

    let outcome = handler.submit_proof().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e == "Bad Request: PHOTO_INVALID_DIMENSIONS"));
    assert_eq!(
        handler.view().alerts().last().copied(),
        Some("❌ Upload failed: Bad Request: PHOTO_INVALID_DIMENSIONS")
    );
}

#[tokio::test]
async fn test_failed_notification_does_not_undo_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendPhoto", TOKEN)))
        .respond_with(photo_ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot is not a member of the supergroup chat"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = build_app(&server.uri(), Arc::new(MemoryStore::new()), memory_local());
    let session = session_for(&app).await;
    let mut handler = app
        .proof_handler(&session, ProofTask::new("t4", "Task"), RecordingView::with_file(jpeg_of_size(64)))
        .with_completion_delay(Duration::ZERO);
    handler.capture(CaptureSource::Gallery).await.unwrap();

    let SubmitOutcome::Submitted(receipt) = handler.submit_proof().await else {
        panic!("upload succeeded, submission should complete");
    };
    assert!(receipt.notification.is_none());
    assert_eq!(handler.view().progress(), vec![30, 70, 100]);
}

#[tokio::test]
async fn test_photo_url_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getFile", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"file_id": "AgAC-large", "file_unique_id": "b", "file_path": "photos/file_3.jpg"}
        })))
        .mount(&server)
        .await;

    let app = build_app(&server.uri(), Arc::new(MemoryStore::new()), memory_local());
    let url = app.photo_url("AgAC-large").await.unwrap();
    assert_eq!(url, format!("{}/file/bot{}/photos/file_3.jpg", server.uri(), TOKEN));
}
