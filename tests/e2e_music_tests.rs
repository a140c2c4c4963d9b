//! End-to-end tests for the music generation API.
//!
//! The server talks to a stub vendor standing in for both the GLM chat
//! endpoint and the rendering gateway; only GLM is configured, so these
//! exercise the external-network single-provider path.

mod common;

use common::TestServer;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await;
    let response = server.get("/health").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_full_ai_creation_end_to_end() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/music/ai",
            json!({ "idea": "summer love song", "mode": "full_ai" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["status"], "processing");
    assert_eq!(body["provider_used"], "glm");
    assert_eq!(body["title"], "Summer Love");

    let job_id = body["job_id"].as_str().expect("job id missing");
    assert!(!job_id.is_empty());

    // Lyrics came back canonicalized: English markers only.
    let lyrics = body["lyrics"].as_str().unwrap();
    assert!(lyrics.contains("[Verse]"));
    assert!(lyrics.contains("[Chorus]"));
    assert!(!lyrics.contains("主歌"));
    assert!(!lyrics.contains("副歌"));

    // The render submission carried the lyrics, not a description prompt.
    assert_eq!(server.vendor.submission_count(), 1);
    {
        let submissions = server.vendor.submissions.lock().unwrap();
        assert!(submissions[0]["prompt"].as_str().unwrap().contains("[Chorus]"));
        assert!(submissions[0]["gpt_description_prompt"].is_null());
    }

    // First poll: still processing.
    let response = server.get(&format!("/v1/music/{}", job_id)).await;
    let status: Value = response.json().await.unwrap();
    assert_eq!(status["status"], "processing");

    // Second poll: the stub completes and the URLs arrive.
    let response = server.get(&format!("/v1/music/{}", job_id)).await;
    let status: Value = response.json().await.unwrap();
    assert_eq!(status["status"], "complete");
    assert!(status["audio_url"].as_str().unwrap().contains(job_id));
}

#[tokio::test]
async fn test_lyrics_only_submits_nothing() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/music/ai",
            json!({ "idea": "a quiet ballad", "mode": "lyrics_only" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["status"], "lyrics_only");
    assert!(body["job_id"].is_null());
    assert!(body["lyrics"].as_str().unwrap().contains("[Verse]"));
    assert_eq!(server.vendor.submission_count(), 0);
}

#[tokio::test]
async fn test_inspiration_mode_uses_enhanced_prompt() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/music/ai",
            json!({ "idea": "rainy city nights", "mode": "inspiration" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let submissions = server.vendor.submissions.lock().unwrap();
    let prompt = submissions[0]["gpt_description_prompt"].as_str().unwrap();
    assert!(prompt.starts_with("Enhanced:"));
    assert!(prompt.contains("rainy city nights"));
}

#[tokio::test]
async fn test_custom_generation_cleans_lyrics() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/music/custom",
            json!({
                "title": "My Song",
                "lyrics": "[主歌]\nmy words（轻声）\n[副歌]\nmy hook",
                "tags": ["citypop", "warm"]
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "processing");
    assert!(body["job_id"].as_str().is_some());

    let submissions = server.vendor.submissions.lock().unwrap();
    let sent = submissions[0]["prompt"].as_str().unwrap();
    assert!(sent.contains("[Verse]"));
    assert!(!sent.contains("主歌"));
    assert!(!sent.contains("轻声"));
    assert_eq!(submissions[0]["tags"], "citypop, warm");
}

#[tokio::test]
async fn test_custom_without_lyrics_rejected() {
    let server = TestServer::spawn().await;

    let response = server
        .post("/v1/music/custom", json!({ "title": "Empty" }))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_params");
    assert_eq!(server.vendor.submission_count(), 0);
}

#[tokio::test]
async fn test_extend_and_cover() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/music/extend",
            json!({ "source_job_id": "task-0", "continue_at": 60.0 }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = server
        .post(
            "/v1/music/cover",
            json!({ "source_job_id": "task-0", "tags": ["lofi"] }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let submissions = server.vendor.submissions.lock().unwrap();
    assert_eq!(submissions[0]["task_type"], "extend");
    assert_eq!(submissions[0]["continue_clip_id"], "task-0");
    assert_eq!(submissions[1]["task_type"], "cover");
    assert_eq!(submissions[1]["tags"], "lofi");
}

#[tokio::test]
async fn test_batch_query_limit() {
    let server = TestServer::spawn().await;

    let ids: Vec<String> = (0..51).map(|i| format!("task-{}", i)).collect();
    let response = server.post("/v1/music/batch", json!({ "ids": ids })).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_params");

    let ids: Vec<String> = (0..3).map(|i| format!("task-{}", i)).collect();
    let response = server.post("/v1/music/batch", json!({ "ids": ids })).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_wait_route_returns_completed_job() {
    let server = TestServer::spawn().await;

    let response = server
        .post(
            "/v1/music/ai",
            json!({ "idea": "waiting song", "mode": "music_only" }),
        )
        .await;
    let body: Value = response.json().await.unwrap();
    let job_id = body["job_id"].as_str().unwrap();

    // The stub completes on the second poll; the wait route polls every
    // 50ms, well inside the 5s test budget.
    let response = server
        .get(&format!("/v1/music/{}/wait?poll_ms=100", job_id))
        .await;
    assert_eq!(response.status(), 200);
    let status: Value = response.json().await.unwrap();
    assert_eq!(status["status"], "complete");
}

#[tokio::test]
async fn test_renderer_not_configured() {
    let server = TestServer::spawn_without_renderer().await;

    let response = server
        .post(
            "/v1/music/custom",
            json!({ "lyrics": "[Verse]\nwords" }),
        )
        .await;
    assert_eq!(response.status(), 503);

    // Orchestrated rendering modes fail the same way...
    let response = server
        .post(
            "/v1/music/ai",
            json!({ "idea": "a song", "mode": "full_ai" }),
        )
        .await;
    assert_eq!(response.status(), 503);

    // ...but lyrics_only still works without a gateway.
    let response = server
        .post(
            "/v1/music/ai",
            json!({ "idea": "a song", "mode": "lyrics_only" }),
        )
        .await;
    assert_eq!(response.status(), 200);
}
