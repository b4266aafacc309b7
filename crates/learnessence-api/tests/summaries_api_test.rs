//! Summary and stats routes.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use learnessence_core::{NoteSourceType, SummaryStyle};
use learnessence_inference::mock::MockGenerationBackend;

#[tokio::test]
async fn test_requires_text_or_note() {
    let store = InMemoryStore::new();
    store.add_session("alice");

    let (status, body) = send(
        plain_app(&store),
        post_json("/api/summaries", "alice", json!({"style": "FLASH"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing text or noteId");
}

#[tokio::test]
async fn test_unknown_style_is_bad_request() {
    let store = InMemoryStore::new();
    store.add_session("alice");

    let (status, body) = send(
        plain_app(&store),
        post_json(
            "/api/summaries",
            "alice",
            json!({"text": LECTURE, "style": "POEM"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("POEM"));
    assert!(store.notes().is_empty());
}

#[tokio::test]
async fn test_text_creates_note_and_heuristic_summary() {
    let store = InMemoryStore::new();
    let alice = store.add_session("alice");

    let (status, body) = send(
        plain_app(&store),
        post_json("/api/summaries", "alice", json!({"text": LECTURE})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["style"], "DETAILED");
    assert_eq!(
        body["content"],
        learnessence_core::text::naive_summary(LECTURE)
    );

    let notes = store.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].user_id, alice);
    assert_eq!(notes[0].source_type, NoteSourceType::Text);
    assert_eq!(notes[0].title, LECTURE.chars().take(60).collect::<String>());
    assert_eq!(notes[0].content, LECTURE);
    assert_eq!(body["noteId"], notes[0].id.to_string());
}

#[tokio::test]
async fn test_summarize_existing_note_with_agent() {
    let store = InMemoryStore::new();
    store.add_session("alice");
    let (_, note) = send(
        plain_app(&store),
        post_json(
            "/api/notes",
            "alice",
            json!({"title": "Respiration", "content": LECTURE}),
        ),
    )
    .await;
    let note_id = note["id"].as_str().unwrap();

    let mock =
        MockGenerationBackend::new().with_fixed_response(r#"{"content": "Cells turn glucose into ATP."}"#);
    let (status, body) = send(
        app_with_agents(&store, &mock),
        post_json(
            "/api/summaries",
            "alice",
            json!({"noteId": note_id, "style": "exam"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "Cells turn glucose into ATP.");
    assert_eq!(body["style"], "EXAM");
    assert_eq!(body["noteId"], note_id);

    // The note's content is the source when no text is given.
    let calls = mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.starts_with(SummaryStyle::Exam.instruction()));
    assert!(calls[0].prompt.ends_with(LECTURE));
    assert_eq!(store.notes().len(), 1);
}

#[tokio::test]
async fn test_empty_generated_summary_falls_back_to_source() {
    let store = InMemoryStore::new();
    store.add_session("alice");
    let mock = MockGenerationBackend::new().with_fixed_response(r#"{"content": ""}"#);

    let (status, body) = send(
        app_with_agents(&store, &mock),
        post_json("/api/summaries", "alice", json!({"text": LECTURE})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], LECTURE);
}

#[tokio::test]
async fn test_unowned_note_is_forbidden() {
    let store = InMemoryStore::new();
    store.add_session("alice");
    store.add_session("bob");
    let (_, note) = send(
        plain_app(&store),
        post_json("/api/notes", "alice", json!({"content": LECTURE})),
    )
    .await;

    let (status, _) = send(
        plain_app(&store),
        post_json("/api/summaries", "bob", json!({"noteId": note["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        plain_app(&store),
        post_json(
            "/api/summaries",
            "bob",
            json!({"noteId": uuid::Uuid::now_v7().to_string()}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        plain_app(&store),
        post_json("/api/summaries", "bob", json!({"noteId": "not-a-uuid"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(store.summaries().is_empty());
}

#[tokio::test]
async fn test_blocked_generation_leaves_no_note() {
    let store = InMemoryStore::new();
    store.add_session("alice");
    let mock = MockGenerationBackend::new();

    let (status, body) = send(
        app_with_agents(&store, &mock),
        post_json("/api/summaries", "alice", json!({"text": "hey"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content blocked");
    assert!(store.notes().is_empty());
    assert!(store.summaries().is_empty());
}

#[tokio::test]
async fn test_list_includes_note_reference() {
    let store = InMemoryStore::new();
    store.add_session("alice");
    store.add_session("bob");

    send(
        plain_app(&store),
        post_json("/api/summaries", "alice", json!({"text": "Short text."})),
    )
    .await;

    let (status, body) = send(plain_app(&store), get("/api/summaries", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["note"]["title"], "Short text.");
    assert_eq!(rows[0]["content"], "Short text.");

    let (_, body) = send(plain_app(&store), get("/api/summaries", "bob")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_stats_count_callers_records() {
    let store = InMemoryStore::new();
    store.add_session("alice");
    store.add_session("bob");

    send(
        plain_app(&store),
        post_json("/api/summaries", "alice", json!({"text": LECTURE})),
    )
    .await;
    send(
        plain_app(&store),
        post_json("/api/flashcards", "alice", json!({"text": "One. Two."})),
    )
    .await;
    send(
        plain_app(&store),
        post_json("/api/notes", "bob", json!({"content": "Bob's note"})),
    )
    .await;

    let (status, body) = send(plain_app(&store), get("/api/stats", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "notes": 1,
            "flashcardSets": 1,
            "flashcards": 2,
            "summaries": 1,
            "transcriptions": 0
        })
    );
}
