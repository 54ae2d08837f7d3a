#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{sample_request, TestContext, ADMIN_EMAIL, ADMIN_PASSWORD, BLOB_HOST};

fn project_body(title: &str) -> Value {
    let mut body = serde_json::to_value(sample_request()).unwrap();
    body["title"] = json!(title);
    body
}

#[actix_rt::test]
async fn test_home_is_public() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["projects"], json!([]));
}

#[actix_rt::test]
async fn test_health_reports_database() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_admin_routes_require_token() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    for uri in ["/admin", "/admin/projects", "/admin/projects/new"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .set_json(project_body("Portfolio"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.repo.len(), 0);
}

#[actix_rt::test]
async fn test_garbage_token_is_rejected() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_login_with_configured_admin() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/admin")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": "guess" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_create_then_list_newest_first() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    for title in ["First", "Second"] {
        let req = test::TestRequest::post()
            .uri("/admin/projects")
            .insert_header(ctx.bearer())
            .set_json(project_body(title))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get("Location").unwrap(), "/admin/projects");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["redirectTo"], "/admin/projects");
    }

    let req = test::TestRequest::get()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 2);
    assert_eq!(body["projects"][0]["title"], "Second");
    assert_eq!(body["projects"][1]["title"], "First");

    let req = test::TestRequest::get().uri("/").to_request();
    let home: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(home["projects"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_title_length_boundary() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(project_body("A"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid data, check the form");
    assert_eq!(ctx.repo.len(), 0);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(project_body("AB"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(ctx.repo.len(), 1);
}

#[actix_rt::test]
async fn test_color_rules() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    for (color, status) in [
        ("#FFF", StatusCode::CREATED),
        ("#abcdef", StatusCode::CREATED),
        ("#ABCD", StatusCode::BAD_REQUEST),
        ("3b82f6", StatusCode::BAD_REQUEST),
    ] {
        let mut body = project_body("Colorful");
        body["color"] = json!(color);

        let req = test::TestRequest::post()
            .uri("/admin/projects")
            .insert_header(ctx.bearer())
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{}", color);
    }

    assert_eq!(ctx.repo.len(), 2);
}

#[actix_rt::test]
async fn test_relative_link_is_rejected() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let mut body = project_body("Portfolio");
    body["link"] = json!("/projects/portfolio");

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.repo.len(), 0);
}

#[actix_rt::test]
async fn test_duplicate_tags_are_stored_once() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let mut body = project_body("Portfolio");
    body["tags"] = json!(["rust", "rust", "actix"]);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(ctx.repo.all()[0].tags, vec!["rust", "actix"]);
}

#[actix_rt::test]
async fn test_validate_endpoint_lists_field_errors() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let mut body = project_body("A");
    body["tags"] = json!([]);

    let req = test::TestRequest::post()
        .uri("/admin/projects/validate")
        .insert_header(ctx.bearer())
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["tags", "title"]);
    assert_eq!(body["details"][1]["message"], "Title must be at least 2 characters");
    assert_eq!(ctx.repo.len(), 0);
}

#[actix_rt::test]
async fn test_form_defaults() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/admin/projects/new")
        .insert_header(ctx.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["defaults"]["color"], "#3b82f6");
    assert_eq!(body["allowedImageTypes"].as_array().unwrap().len(), 4);
}

#[actix_rt::test]
async fn test_edit_replaces_all_fields() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(project_body("Portfolio"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let mut body = project_body("Portfolio v2");
    body["tags"] = json!(["svelte"]);
    body["imageUrl"] = json!(format!("https://store.{}/v2.png", BLOB_HOST));

    let req = test::TestRequest::put()
        .uri(&format!("/admin/projects/{}", id))
        .insert_header(ctx.bearer())
        .set_json(body)
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(updated["title"], "Portfolio v2");
    assert_eq!(updated["tags"], json!(["svelte"]));
    assert_eq!(ctx.blobs.deleted(), vec![sample_request().image_url]);

    let req = test::TestRequest::get()
        .uri(&format!("/admin/projects/{}", id))
        .insert_header(ctx.bearer())
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["title"], "Portfolio v2");
}

#[actix_rt::test]
async fn test_delete_twice() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(project_body("Portfolio"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/admin/projects/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::delete().uri(&uri).insert_header(ctx.bearer()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(ctx.blobs.deleted().len(), 1);

    let req = test::TestRequest::delete().uri(&uri).insert_header(ctx.bearer()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.repo.len(), 0);
}

#[actix_rt::test]
async fn test_deleted_project_leaves_home_page() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(project_body("Portfolio"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;

    // Warm the cached home page.
    let req = test::TestRequest::get().uri("/").to_request();
    let home: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(home["projects"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/projects/{}", created["id"].as_str().unwrap()))
        .insert_header(ctx.bearer())
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let home: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(home["projects"], json!([]));
}

#[actix_rt::test]
async fn test_malformed_json_body() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("JSON payload error"));
}

#[actix_rt::test]
async fn test_trailing_slash_is_normalized() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/admin/projects/")
        .insert_header(ctx.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_dashboard_drops_deleted_project() {
    let ctx = TestContext::new();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(ctx.bearer())
        .set_json(project_body("Portfolio"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/admin").insert_header(ctx.bearer()).to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dashboard["totalProjects"], 1);
    assert_eq!(dashboard["recentProjects"][0]["id"], id.as_str());

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/projects/{}", id))
        .insert_header(ctx.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/admin").insert_header(ctx.bearer()).to_request();
    let dashboard: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dashboard["totalProjects"], 0);
    assert!(!dashboard["recentProjects"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == id.as_str()));
}
