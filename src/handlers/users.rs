use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::db::{NewUser, PathId, UserLookup, UserSearch};
use crate::error::AppError;
use crate::{AppState, Result};

const USER_NOT_FOUND: &str = "User not found";

pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse> {
    let users = state.db.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = PathId::parse(&path)?.or_not_found(USER_NOT_FOUND)?;
    let user = state.db.get_user(id).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn create_user(
    req: web::Json<NewUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received create request for username: {}", req.username);
    req.validate()?;

    match state.db.create_user(&req).await {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(e) => {
            error!("Create failed for username {}: {}", req.username, e);
            Err(e)
        }
    }
}

pub async fn update_user(
    path: web::Path<String>,
    req: web::Json<NewUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let path_id = PathId::parse(&path)?;
    info!("Received update request for user {}", path.as_str());
    req.validate()?;

    let id = path_id.or_not_found(USER_NOT_FOUND)?;
    let user = state.db.update_user(id, &req).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = PathId::parse(&path)?.or_not_found(USER_NOT_FOUND)?;
    info!("Received delete request for user {}", id);

    state.db.delete_user(id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("User {} deleted", id)
    })))
}

pub async fn search_users(
    query: web::Query<UserSearch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let users = state.db.search_users(&query).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// `GET /users/search/{idOrUsername}`
pub async fn resolve_user(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let input = path.into_inner();
    let not_found = || AppError::NotFound(format!("User '{}' not found", input));

    let lookup = UserLookup::parse(&input).ok_or_else(not_found)?;
    let user = state.db.find_user(&lookup).await?.ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Always 200: a missing user is an answer, not an error.
pub async fn user_exists(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let body = match PathId::parse(&path)? {
        PathId::Id(id) => {
            let exists = state.db.user_exists(id).await?;
            json!({ "exists": exists, "user_id": id })
        }
        // Echo the number as given, even though no row can have it
        PathId::OutOfRange(raw) => {
            let user_id = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
            json!({ "exists": false, "user_id": user_id })
        }
    };
    Ok(HttpResponse::Ok().json(body))
}

pub async fn email_exists(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let email = path.into_inner();
    let exists = state.db.email_exists(&email).await?;
    Ok(HttpResponse::Ok().json(json!({ "exists": exists, "email": email })))
}
