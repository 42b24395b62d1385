//! End-to-end HTTP scenarios over the in-memory store.
//!
//! Requests go through the same scope, middleware and extractors as the
//! production server; only the storage and hashing adapters differ.

mod support;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};

use social::Trace;
use social::domain::{RoleName, TRACE_ID_HEADER};
use social::inbound::http::configure_api;

use support::{Harness, PASSWORD};

async fn app(
    harness: &Harness,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(harness.state.clone()))
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

async fn login_token<S>(service: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(
        service,
        test::TestRequest::post()
            .uri("/api/v1/auth/token")
            .set_json(json!({ "email": email, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    body.get("token")
        .and_then(Value::as_str)
        .expect("token in body")
        .to_owned()
}

#[rstest]
#[actix_web::test]
async fn account_lifecycle_from_registration_to_first_post() {
    let harness = Harness::new();
    let service = app(&harness).await;

    let registered = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/auth/user")
            .set_json(json!({
                "username": "ada",
                "email": "Ada@Example.com",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(registered).await;
    assert_eq!(body.pointer("/user/email"), Some(&json!("ada@example.com")));
    assert_eq!(body.pointer("/user/isActive"), Some(&json!(false)));
    let activation = body
        .get("token")
        .and_then(Value::as_str)
        .expect("activation token")
        .to_owned();

    let activated = test::call_service(
        &service,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/activate/{activation}"))
            .to_request(),
    )
    .await;
    assert_eq!(activated.status(), StatusCode::NO_CONTENT);

    let token = login_token(&service, "ada@example.com").await;

    let created = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "Hello",
                "content": "First post",
                "tags": ["intro"],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(created).await;
    assert_eq!(post.get("version"), Some(&json!(0)));
    let post_id = post
        .get("id")
        .and_then(Value::as_str)
        .expect("post id")
        .to_owned();

    let edited = test::call_service(
        &service,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Hello again", "version": 0 }))
            .to_request(),
    )
    .await;
    assert_eq!(edited.status(), StatusCode::OK);
    let edited: Value = test::read_body_json(edited).await;
    assert_eq!(edited.get("version"), Some(&json!(1)));
    assert_eq!(edited.get("content"), Some(&json!("First post")));

    let stale = test::call_service(
        &service,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Lost update", "version": 0 }))
            .to_request(),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::NOT_FOUND);

    let fetched = test::call_service(
        &service,
        test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(fetched).await;
    assert_eq!(fetched.get("title"), Some(&json!("Hello again")));
}

#[rstest]
#[actix_web::test]
async fn following_an_author_fills_the_feed() {
    let harness = Harness::new();
    let author = harness.seed_user("author", &RoleName::user());
    harness.seed_user("reader", &RoleName::user());
    let service = app(&harness).await;
    let author_token = login_token(&service, "author@example.com").await;
    let reader_token = login_token(&service, "reader@example.com").await;

    let created = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(bearer(&author_token))
            .set_json(json!({ "title": "News", "content": "Something happened" }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let followed = test::call_service(
        &service,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/follow", author.id()))
            .insert_header(bearer(&reader_token))
            .to_request(),
    )
    .await;
    assert_eq!(followed.status(), StatusCode::NO_CONTENT);

    let feed = test::call_service(
        &service,
        test::TestRequest::get()
            .uri("/api/v1/users/feed?limit=10&sort=desc")
            .insert_header(bearer(&reader_token))
            .to_request(),
    )
    .await;
    assert_eq!(feed.status(), StatusCode::OK);
    let items: Value = test::read_body_json(feed).await;
    let items = items.as_array().expect("feed array");
    assert_eq!(items.len(), 1);
    let item = items.first().expect("one item");
    assert_eq!(item.get("authorUsername"), Some(&json!("author")));
    assert_eq!(item.get("commentCount"), Some(&json!(0)));
}

#[rstest]
#[case::no_header(None)]
#[case::garbage(Some("Bearer not-a-jwt"))]
#[case::wrong_scheme(Some("Basic YWRhOnB3"))]
#[actix_web::test]
async fn protected_routes_reject_missing_or_bad_tokens(#[case] header: Option<&str>) {
    let harness = Harness::new();
    let service = app(&harness).await;

    let mut request = test::TestRequest::get().uri("/api/v1/users/feed");
    if let Some(value) = header {
        request = request.insert_header((AUTHORIZATION, value));
    }
    let response = test::call_service(&service, request.to_request()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
    assert_eq!(body.get("traceId"), Some(&json!(trace_id)));
}

#[rstest]
#[actix_web::test]
async fn storage_outage_is_service_unavailable() {
    let harness = Harness::new();
    let service = app(&harness).await;
    harness.store.set_unavailable(true);

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/auth/user")
            .set_json(json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body.get("code"), Some(&json!("service_unavailable")));
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_names_the_field() {
    let harness = Harness::new();
    harness.seed_user("ada", &RoleName::user());
    let service = app(&harness).await;

    let response = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/v1/auth/user")
            .set_json(json!({
                "username": "someone",
                "email": "ada@example.com",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body.pointer("/details/field"), Some(&json!("email")));
    assert_eq!(body.pointer("/details/code"), Some(&json!("duplicate_email")));
}
