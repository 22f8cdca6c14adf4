// tests/http_api_tests.rs
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use common::*;
use serde_json::{json, Value};
use serial_test::serial;
use storefront::models::Role;
use storefront::web::configure_app_routes;
use uuid::Uuid;

macro_rules! app {
  ($h:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($h.state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
#[serial]
async fn health_is_public() {
  let h = harness();
  let app = app!(h);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn protected_routes_require_a_valid_token() {
  let h = harness();
  let app = app!(h);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/cart").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].is_string());

  let req = test::TestRequest::get()
    .uri("/cart")
    .insert_header(bearer("not-a-token"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn staff_token_opens_staff_routes_but_not_customer_only_checks() {
  let h = harness();
  let app = app!(h);
  let staff = h.access_token(Uuid::new_v4(), Role::Staff);
  let customer = h.access_token(Uuid::new_v4(), Role::Customer);

  let create = |token: &str| {
    test::TestRequest::post()
      .uri("/product")
      .insert_header(bearer(token))
      .set_json(json!({ "name": "Desk", "price_cents": 15000, "stock": 3 }))
      .to_request()
  };

  assert_eq!(test::call_service(&app, create(&customer)).await.status(), StatusCode::FORBIDDEN);
  let resp = test::call_service(&app, create(&staff)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let product: Value = test::read_body_json(resp).await;
  assert_eq!(product["price_cents"], 15000);

  // Staff also satisfies Customer-tier routes.
  let req = test::TestRequest::get()
    .uri("/orders")
    .insert_header(bearer(&staff))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn cart_disappears_after_last_remove() {
  let h = harness();
  let app = app!(h);
  let p1 = h.product("Lantern", 2_000).await;
  let user = h.access_token(Uuid::new_v4(), Role::Customer);

  let req = test::TestRequest::post()
    .uri("/cart/add")
    .insert_header(bearer(&user))
    .set_json(json!({ "product_id": p1.id, "quantity": 2 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::get().uri("/cart").insert_header(bearer(&user)).to_request();
  let view: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(view["items"][0]["name"], "Lantern");
  assert_eq!(view["items"][0]["quantity"], 2);

  let req = test::TestRequest::delete()
    .uri("/cart/remove")
    .insert_header(bearer(&user))
    .set_json(json!({ "product_id": p1.id }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::get().uri("/cart").insert_header(bearer(&user)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn malformed_bodies_are_bad_requests() {
  let h = harness();
  let app = app!(h);
  let user = h.access_token(Uuid::new_v4(), Role::Customer);

  let req = test::TestRequest::post()
    .uri("/cart/add")
    .insert_header(bearer(&user))
    .set_json(json!({ "product_id": "nope", "quantity": -1 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::get()
    .uri("/order/not-a-uuid")
    .insert_header(bearer(&user))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn checkout_then_cancel_by_other_customer_and_admin() {
  let h = harness();
  let app = app!(h);
  let p1 = h.product("Vinyl", 2_999).await;
  let alice = h.access_token(Uuid::new_v4(), Role::Customer);
  let bob = h.access_token(Uuid::new_v4(), Role::Customer);
  let admin = h.access_token(Uuid::new_v4(), Role::Admin);

  let req = test::TestRequest::post()
    .uri("/selecteditems/addMultiple")
    .insert_header(bearer(&alice))
    .set_json(json!([{ "product_id": p1.id, "quantity": 2 }]))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::post().uri("/order").insert_header(bearer(&alice)).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let order: Value = test::read_body_json(resp).await;
  assert_eq!(order["total_price_cents"], 5_998);
  let order_uri = format!("/order/{}", order["id"].as_str().unwrap());

  let req = test::TestRequest::post().uri("/order").insert_header(bearer(&alice)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::delete().uri(&order_uri).insert_header(bearer(&bob)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::delete().uri(&order_uri).insert_header(bearer(&admin)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::get().uri(&order_uri).insert_header(bearer(&alice)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn register_login_refresh_round() {
  let h = harness();
  let app = app!(h);
  let credentials = json!({ "email": "Dana@Example.com", "password": "long-enough-secret" });

  let req = test::TestRequest::post().uri("/register").set_json(&credentials).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["user"]["email"], "dana@example.com");
  assert_eq!(body["user"]["role"], 2);
  assert!(body["user"].get("password_hash").is_none());

  let req = test::TestRequest::post().uri("/register").set_json(&credentials).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri("/login")
    .set_json(json!({ "email": "dana@example.com", "password": "wrong-password" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post().uri("/login").set_json(&credentials).to_request();
  let tokens: Value = test::call_and_read_body_json(&app, req).await;
  let access = tokens["access_token"].as_str().unwrap().to_string();
  let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri("/refresh")
    .set_json(json!({ "refresh_token": access }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post()
    .uri("/refresh")
    .set_json(json!({ "refresh_token": refresh }))
    .to_request();
  let refreshed: Value = test::call_and_read_body_json(&app, req).await;
  let new_access = refreshed["access_token"].as_str().unwrap();

  let req = test::TestRequest::get().uri("/orders").insert_header(bearer(new_access)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  // Refresh tokens never open protected routes.
  let req = test::TestRequest::get().uri("/orders").insert_header(bearer(&refresh)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn user_administration_requires_admin() {
  let h = harness();
  let app = app!(h);
  let staff = h.access_token(Uuid::new_v4(), Role::Staff);
  let admin = h.access_token(Uuid::new_v4(), Role::Admin);

  let req = test::TestRequest::post()
    .uri("/register")
    .set_json(json!({ "email": "kim@example.com", "password": "long-enough-secret" }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let user_uri = format!("/user/{}", body["user"]["id"].as_str().unwrap());
  let promote = json!({ "role": 1 });

  let req = test::TestRequest::put()
    .uri(&user_uri)
    .insert_header(bearer(&staff))
    .set_json(&promote)
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::get().uri("/users").insert_header(bearer(&staff)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::put()
    .uri(&user_uri)
    .insert_header(bearer(&admin))
    .set_json(&promote)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let updated: Value = test::read_body_json(resp).await;
  assert_eq!(updated["role"], 1);
  assert_eq!(updated["email"], "kim@example.com");

  let req = test::TestRequest::get().uri("/users").insert_header(bearer(&admin)).to_request();
  let listed: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(listed["count"], 1);

  let req = test::TestRequest::delete().uri(&user_uri).insert_header(bearer(&admin)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
  let req = test::TestRequest::get().uri(&user_uri).insert_header(bearer(&admin)).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
