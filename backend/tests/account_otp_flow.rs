//! End-to-end OTP-gated account flows over in-memory adapters.

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::json;

use common::{ADMIN_EMAIL, MEMBER_EMAIL, PASSWORD, harness, login_as, session_middleware};
use plateworks_backend::domain::ports::UserRepository;
use plateworks_backend::domain::user::EmailAddress;
use plateworks_backend::inbound::http::account::{
    confirm_email_change, confirm_password_change, confirm_user_deletion, get_profile,
    list_users, request_email_change, request_password_change, request_user_deletion,
};
use plateworks_backend::inbound::http::auth::{login, logout};

macro_rules! account_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(session_middleware())
                .app_data(web::Data::new($state))
                .service(
                    web::scope("/api/v1")
                        .service(login)
                        .service(logout)
                        .service(get_profile)
                        .service(request_email_change)
                        .service(confirm_email_change)
                        .service(request_password_change)
                        .service(confirm_password_change)
                        .service(list_users)
                        .service(request_user_deletion)
                        .service(confirm_user_deletion),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn email_change_round_trip() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, MEMBER_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/profile/email/request")
        .cookie(cookie.clone())
        .set_json(json!({ "newEmail": "member2@plateworks.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    // The code goes to the current address, not the new one.
    let sent = h.mailer.sent();
    assert_eq!(sent.last().expect("otp email").to.as_ref(), MEMBER_EMAIL);

    let code = h.otps.latest().expect("stored challenge").code;
    let req = test::TestRequest::post()
        .uri("/api/v1/profile/email/confirm")
        .cookie(cookie.clone())
        .set_json(json!({ "code": code.as_str() }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let profile: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(profile["email"], "member2@plateworks.example");

    let stored = h
        .users
        .find_by_email(&EmailAddress::new("member2@plateworks.example").expect("email"))
        .await
        .expect("lookup");
    assert!(stored.is_some());
}

#[actix_web::test]
async fn wrong_code_is_rejected_with_a_reason() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, MEMBER_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/profile/email/request")
        .cookie(cookie.clone())
        .set_json(json!({ "newEmail": "member2@plateworks.example" }))
        .to_request();
    test::call_service(&app, req).await;

    let issued = h.otps.latest().expect("stored challenge").code;
    let wrong = if issued.as_str() == "000000" { "000001" } else { "000000" };

    let req = test::TestRequest::post()
        .uri("/api/v1/profile/email/confirm")
        .cookie(cookie)
        .set_json(json!({ "code": wrong }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["reason"], "otp_mismatch");
}

#[actix_web::test]
async fn a_code_is_single_use() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, MEMBER_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/profile/password/request")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::ACCEPTED
    );

    let code = h.otps.latest().expect("stored challenge").code;
    let confirm = |code: String, cookie: actix_web::cookie::Cookie<'static>| {
        test::TestRequest::post()
            .uri("/api/v1/profile/password/confirm")
            .cookie(cookie)
            .set_json(json!({ "code": code, "newPassword": "galvanise-2" }))
            .to_request()
    };

    let res = test::call_service(&app, confirm(code.as_str().to_owned(), cookie.clone())).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Replaying the same code fails.
    let res = test::call_service(&app, confirm(code.as_str().to_owned(), cookie)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn password_change_takes_effect_at_next_login() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, MEMBER_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/profile/password/request")
        .cookie(cookie.clone())
        .to_request();
    test::call_service(&app, req).await;

    let code = h.otps.latest().expect("stored challenge").code;
    let req = test::TestRequest::post()
        .uri("/api/v1/profile/password/confirm")
        .cookie(cookie)
        .set_json(json!({ "code": code.as_str(), "newPassword": "galvanise-2" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": MEMBER_EMAIL, "password": PASSWORD }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": MEMBER_EMAIL, "password": "galvanise-2" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn admin_deletes_a_user_with_a_code() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, ADMIN_EMAIL).await;

    let member = h
        .users
        .find_by_email(&EmailAddress::new(MEMBER_EMAIL).expect("email"))
        .await
        .expect("lookup")
        .expect("member exists");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/delete/request", member.id))
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::ACCEPTED
    );

    // The code goes to the acting admin.
    assert_eq!(
        h.mailer.sent().last().expect("otp email").to.as_ref(),
        ADMIN_EMAIL
    );

    let code = h.otps.latest().expect("stored challenge").code;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/delete/confirm", member.id))
        .cookie(cookie.clone())
        .set_json(json!({ "code": code.as_str() }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .cookie(cookie)
        .to_request();
    let listed: Vec<serde_json::Value> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["email"], ADMIN_EMAIL);
}

#[actix_web::test]
async fn admin_cannot_delete_their_own_account() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, ADMIN_EMAIL).await;

    let admin = h
        .users
        .find_by_email(&EmailAddress::new(ADMIN_EMAIL).expect("email"))
        .await
        .expect("lookup")
        .expect("admin exists");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/delete/request", admin.id))
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn logout_invalidates_the_session() {
    let h = harness();
    let app = account_app!(h.state.clone());
    let cookie = login_as(&app, MEMBER_EMAIL).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/logout")
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let cleared = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("clearing cookie")
        .into_owned();
    let req = test::TestRequest::get()
        .uri("/api/v1/profile")
        .cookie(cleared)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
