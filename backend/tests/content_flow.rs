//! End-to-end content management flow over in-memory adapters.

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::json;

use common::{ADMIN_EMAIL, MEMBER_EMAIL, harness, login_as, session_middleware};
use plateworks_backend::inbound::http::auth::login;
use plateworks_backend::inbound::http::content::{
    create_content_block, delete_content_block, get_page_content, update_content_block,
};

macro_rules! content_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(session_middleware())
                .app_data(web::Data::new($state))
                .service(
                    web::scope("/api/v1")
                        .service(login)
                        .service(get_page_content)
                        .service(create_content_block)
                        .service(update_content_block)
                        .service(delete_content_block),
                ),
        )
        .await
    };
}

fn hero_block(page: &str) -> serde_json::Value {
    json!({
        "page": page,
        "section": "hero",
        "title": "Zinc plating",
        "body": "<p>Corrosion protection for steel fasteners.</p>",
        "position": 0,
    })
}

#[actix_web::test]
async fn created_blocks_appear_on_the_public_page() {
    let h = harness();
    let app = content_app!(h.state.clone());
    let cookie = login_as(&app, ADMIN_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/content")
        .cookie(cookie.clone())
        .set_json(hero_block("zinc-plating"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let mut second = hero_block("zinc-plating");
    second["section"] = json!("process");
    second["title"] = json!("Our process");
    second["position"] = json!(1);
    let req = test::TestRequest::post()
        .uri("/api/v1/content")
        .cookie(cookie)
        .set_json(second)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/content/zinc-plating")
        .to_request();
    let blocks: Vec<serde_json::Value> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["section"], "hero");
    assert_eq!(blocks[1]["section"], "process");
}

#[actix_web::test]
async fn updates_invalidate_the_cached_page() {
    let h = harness();
    let app = content_app!(h.state.clone());
    let cookie = login_as(&app, ADMIN_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/content")
        .cookie(cookie.clone())
        .set_json(hero_block("zinc-plating"))
        .to_request();
    let created: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["id"].as_str().expect("id").to_owned();

    // Prime the cache with a public read.
    let req = test::TestRequest::get()
        .uri("/api/v1/content/zinc-plating")
        .to_request();
    test::call_service(&app, req).await;

    let mut updated = hero_block("zinc-plating");
    updated["title"] = json!("Zinc plating v2");
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/content/{id}"))
        .cookie(cookie)
        .set_json(updated)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    // The public read reflects the change, not a stale cached copy.
    let req = test::TestRequest::get()
        .uri("/api/v1/content/zinc-plating")
        .to_request();
    let blocks: Vec<serde_json::Value> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(blocks[0]["title"], "Zinc plating v2");
}

#[actix_web::test]
async fn deleted_blocks_disappear_from_the_page() {
    let h = harness();
    let app = content_app!(h.state.clone());
    let cookie = login_as(&app, ADMIN_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/content")
        .cookie(cookie.clone())
        .set_json(hero_block("aerospace"))
        .to_request();
    let created: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["id"].as_str().expect("id").to_owned();

    // Prime the cache before deleting.
    let req = test::TestRequest::get()
        .uri("/api/v1/content/aerospace")
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/content/{id}"))
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/content/aerospace")
        .to_request();
    let blocks: Vec<serde_json::Value> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert!(blocks.is_empty());
}

#[actix_web::test]
async fn member_cannot_edit_content() {
    let h = harness();
    let app = content_app!(h.state.clone());
    let cookie = login_as(&app, MEMBER_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/content")
        .cookie(cookie)
        .set_json(hero_block("zinc-plating"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn updating_a_missing_block_is_not_found() {
    let h = harness();
    let app = content_app!(h.state.clone());
    let cookie = login_as(&app, ADMIN_EMAIL).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/content/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .cookie(cookie)
        .set_json(hero_block("zinc-plating"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
