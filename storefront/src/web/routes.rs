// storefront/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{
  auth_handlers, booking_handlers, cart_handlers, catalog_handlers, order_handlers, selection_handlers,
  user_handlers,
};
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Called from `main.rs` and the HTTP tests to mount every route.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Malformed bodies and path ids answer 400 with the usual error body.
  cfg
    .app_data(
      web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
      web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    );

  cfg
    .route("/health", web::get().to(health_check_handler))
    // Accounts
    .route("/register", web::post().to(auth_handlers::register_handler))
    .route("/login", web::post().to(auth_handlers::login_handler))
    .route("/refresh", web::post().to(auth_handlers::refresh_handler))
    .route("/users", web::get().to(user_handlers::list_users_handler))
    .service(
      web::resource("/user/{user_id}")
        .route(web::get().to(user_handlers::get_user_handler))
        .route(web::put().to(user_handlers::update_user_handler))
        .route(web::delete().to(user_handlers::delete_user_handler)),
    )
    // Cart
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::get_cart_handler))
        .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
        .route("/update", web::post().to(cart_handlers::update_cart_handler))
        .route("/remove", web::delete().to(cart_handlers::remove_from_cart_handler)),
    )
    // Selected items
    .service(
      web::scope("/selecteditems")
        .route("", web::get().to(selection_handlers::get_selection_handler))
        .route("/add", web::post().to(selection_handlers::add_selected_item_handler))
        .route(
          "/addMultiple",
          web::post().to(selection_handlers::add_multiple_selected_items_handler),
        )
        .route("/update", web::post().to(selection_handlers::update_selected_item_handler))
        .route("/remove", web::delete().to(selection_handlers::remove_selected_item_handler))
        .route("/clear", web::delete().to(selection_handlers::clear_selection_handler)),
    )
    // Orders
    .route("/order", web::post().to(order_handlers::place_order_handler))
    .route("/orders", web::get().to(order_handlers::list_orders_handler))
    .service(
      web::resource("/order/{order_id}")
        .route(web::get().to(order_handlers::get_order_handler))
        .route(web::delete().to(order_handlers::cancel_order_handler)),
    )
    .route(
      "/order/{order_id}/reconcile",
      web::post().to(order_handlers::reconcile_order_handler),
    )
    .route(
      "/order/{order_id}/status",
      web::put().to(order_handlers::update_order_status_handler),
    )
    // Catalog
    .service(
      web::resource("/products")
        .route(web::get().to(catalog_handlers::list_products)),
    )
    .route("/product", web::post().to(catalog_handlers::create_product))
    .service(
      web::resource("/product/{id}")
        .route(web::get().to(catalog_handlers::get_product))
        .route(web::put().to(catalog_handlers::update_product))
        .route(web::delete().to(catalog_handlers::delete_product)),
    )
    .service(
      web::resource("/services")
        .route(web::get().to(catalog_handlers::list_services)),
    )
    .route("/service", web::post().to(catalog_handlers::create_service))
    .service(
      web::resource("/service/{id}")
        .route(web::get().to(catalog_handlers::get_service))
        .route(web::put().to(catalog_handlers::update_service))
        .route(web::delete().to(catalog_handlers::delete_service)),
    )
    // Bookings
    .route("/booking", web::post().to(booking_handlers::create_booking_handler))
    .route("/bookings", web::get().to(booking_handlers::list_bookings_handler))
    .route(
      "/booking/{booking_id}/status",
      web::put().to(booking_handlers::update_booking_status_handler),
    );
}
