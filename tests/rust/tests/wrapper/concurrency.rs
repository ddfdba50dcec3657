//! Concurrent requests sharing one logger

use axum::{routing::post, Router};
use futures::future::join_all;
use reqguard_core::LogChannel;
use tests::logs::channel_lines;
use tests::GuardedServerHarness;

fn routes() -> Router {
    Router::new().route(
        "/work/{id}",
        post(|body: String| async move {
            if body.starts_with("fail") {
                panic!("worker failed on {}", body);
            }
            body
        }),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failures_are_isolated() {
    let h = GuardedServerHarness::spawn(routes()).await;

    let requests = (0..40).map(|i| {
        let body = if i % 2 == 0 {
            format!("fail-{}", i)
        } else {
            format!("ok-{}", i)
        };
        let request = h.client.post(h.url(&format!("/work/{}", i))).body(body.clone());
        async move {
            let response = request.send().await.unwrap();
            (body, response.status(), response.text().await.unwrap())
        }
    });

    for (body, status, text) in join_all(requests).await {
        if body.starts_with("fail") {
            assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(text, format!("\"worker failed on {}\"", body));
        } else {
            assert_eq!(status, reqwest::StatusCode::OK);
            assert_eq!(text, body);
        }
    }

    // One failure line plus one body line per failed request, never torn
    let errors = channel_lines(&h.buffer, LogChannel::Error);
    assert_eq!(errors.len(), 40);
    for i in (0..40).step_by(2) {
        let body = format!("fail-{}", i);
        assert!(errors
            .iter()
            .any(|l| l == &format!("/work/{}: worker failed on {}", i, body)));
        assert!(errors.iter().any(|l| l == &body));
    }
}
