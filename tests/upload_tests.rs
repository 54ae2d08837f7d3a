#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{TestContext, BLOB_HOST};

fn token_request(pathname: &str) -> Value {
    json!({
        "type": "blob.generate-client-token",
        "payload": {
            "pathname": pathname,
            "callbackUrl": "https://portfolio.test/api/upload",
            "multipart": false
        }
    })
}

fn completed_body() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": "blob.upload-completed",
        "payload": {
            "blob": {
                "url": format!("https://store.{}/shot-abc123.png", BLOB_HOST),
                "pathname": "shot.png",
                "contentType": "image/png"
            },
            "tokenPayload": "{}"
        }
    }))
    .unwrap()
}

#[actix_rt::test]
async fn test_token_requires_admin() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .set_json(token_request("shot.png"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_token_is_scoped_to_images() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(ctx.bearer())
        .set_json(token_request("shot.png"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "blob.generate-client-token");
    assert_eq!(
        body["allowedContentTypes"],
        json!(["image/jpeg", "image/png", "image/gif", "image/webp"])
    );

    let token = body["clientToken"].as_str().unwrap();
    assert!(token.starts_with("vercel_blob_client_test_"));

    let signed = ctx.state.upload_handler.token_service.verify_client_token(token).unwrap();
    assert_eq!(signed.pathname, "shot.png");
    assert_eq!(signed.on_upload_completed.callback_url, "https://portfolio.test/api/upload");
    assert_eq!(signed.on_upload_completed.token_payload, "{}");
    assert_eq!(body["validUntil"], signed.valid_until);
}

#[actix_rt::test]
async fn test_token_rejects_escaping_pathname() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    for pathname in ["../secrets.png", "/abs.png", ""] {
        let req = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header(ctx.bearer())
            .set_json(token_request(pathname))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{:?}", pathname);
    }
}

#[actix_rt::test]
async fn test_completed_callback_with_valid_signature() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let body = completed_body();
    let signature = ctx.state.upload_handler.token_service.sign_body(&body).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("x-vercel-signature", signature))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let ack: Value = test::read_body_json(resp).await;
    assert_eq!(ack, json!({ "type": "blob.upload-completed", "response": "ok" }));
}

#[actix_rt::test]
async fn test_completed_callback_with_bad_signature() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let body = completed_body();
    let mut tampered = body.clone();
    tampered.extend_from_slice(b" ");
    let signature = ctx.state.upload_handler.token_service.sign_body(&tampered).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(("x-vercel-signature", signature))
        .set_payload(body.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_unknown_event_type() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header(ctx.bearer())
        .set_json(json!({ "type": "blob.something-else", "payload": {} }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
