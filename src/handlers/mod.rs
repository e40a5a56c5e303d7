//! HTTP routes for users and addresses.

pub mod addresses;
pub mod users;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

/// Health check for `GET /`.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Сервер работает!"
    }))
}

/// Register every route plus the extractor settings that turn malformed
/// bodies, paths, and query strings into `400 {"detail": ...}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .route("/", web::get().to(health_check))
    .service(
        web::scope("/users")
            // Fixed segments go before `/{id}` so they are not read as ids
            .route("/search", web::get().to(users::search_users))
            .route("/search/", web::get().to(users::search_users))
            .route("/search/{id_or_username}", web::get().to(users::resolve_user))
            .route("/email/{email}/exists", web::get().to(users::email_exists))
            .service(
                web::resource("")
                    .route(web::get().to(users::list_users))
                    .route(web::post().to(users::create_user)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(users::get_user))
                    .route(web::put().to(users::update_user))
                    .route(web::delete().to(users::delete_user)),
            )
            .route("/{id}/exists", web::get().to(users::user_exists))
            .route("/{id}/addresses", web::get().to(addresses::list_user_addresses)),
    )
    .service(
        web::scope("/addresses")
            .service(
                web::resource("")
                    .route(web::get().to(addresses::list_addresses))
                    .route(web::post().to(addresses::create_address)),
            )
            .route("/{id}", web::delete().to(addresses::delete_address)),
    );
}
