//! Mock API fixtures

use serde_json::{Value, json};
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::config::TEST_API_KEY;

/// Deck id used by the fixtures; its first eight characters name the default file
pub const DECK_ID: &str = "a1b2c3d4e5f6a7b8";

/// Export id returned by the start-export fixture
pub const EXPORT_ID: &str = "exp-42";

/// Bytes served as the exported file
pub const EXPORT_BYTES: &[u8] = b"%PDF-1.7\n% deck export\n";

/// Deck status body as served by `GET /v1/decks/:id` (no `id` field)
pub fn deck_body(status: &str, slides_count: u32, slides_complete: u32) -> Value {
    json!({
        "status": status,
        "slides_count": slides_count,
        "slides_complete": slides_complete
    })
}

/// Body of a freshly created deck
pub fn created_deck_body() -> Value {
    json!({
        "id": DECK_ID,
        "name": "Quarterly update",
        "status": "pending"
    })
}

/// Mount `POST /v1/decks`, expecting exactly one call
pub async fn mount_create_deck(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/decks"))
        .and(bearer_token(TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_deck_body()))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount deck polls: `in_progress` non-terminal responses, then `last` forever
pub async fn mount_deck_polls(server: &MockServer, in_progress: u64, last: Value) {
    let deck_path = format!("/v1/decks/{DECK_ID}");
    if in_progress > 0 {
        Mock::given(method("GET"))
            .and(path(deck_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(deck_body("generating", 6, 2)))
            .up_to_n_times(in_progress)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(deck_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(last))
        .mount(server)
        .await;
}

/// Mount the export start, progress polls, a finished poll and the file itself
pub async fn mount_export_flow(server: &MockServer) {
    let export_path = format!("/v1/decks/{DECK_ID}/export");

    Mock::given(method("POST"))
        .and(path(export_path.clone()))
        .and(bearer_token(TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "export_id": EXPORT_ID })))
        .expect(1)
        .mount(server)
        .await;

    for progress in [20, 80] {
        Mock::given(method("GET"))
            .and(path(export_path.clone()))
            .and(query_param("export_id", EXPORT_ID))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "processing", "progress": progress })),
            )
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(export_path))
        .and(query_param("export_id", EXPORT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": 100,
            "download_url": format!("{}/download/{EXPORT_ID}", server.uri())
        })))
        .mount(server)
        .await;

    // The download URL bounces once before serving the file
    Mock::given(method("GET"))
        .and(path(format!("/download/{EXPORT_ID}")))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("/files/{EXPORT_ID}.pdf")),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/files/{EXPORT_ID}.pdf")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(EXPORT_BYTES.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount an export start that must never be called
pub async fn forbid_export(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/decks/{DECK_ID}/export")))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
