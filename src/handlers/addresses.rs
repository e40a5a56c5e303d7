use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{error, info};

use crate::db::{NewAddress, PathId};
use crate::{AppState, Result};

pub async fn list_addresses(state: web::Data<AppState>) -> Result<HttpResponse> {
    let addresses = state.db.list_addresses().await?;
    Ok(HttpResponse::Ok().json(addresses))
}

/// Empty when the user has no addresses, including ids no user can have.
pub async fn list_user_addresses(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let addresses = match PathId::parse(&path)? {
        PathId::Id(user_id) => state.db.list_user_addresses(user_id).await?,
        PathId::OutOfRange(_) => Vec::new(),
    };
    Ok(HttpResponse::Ok().json(addresses))
}

pub async fn create_address(
    req: web::Json<NewAddress>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received address create request for user {}", req.user_id);
    req.validate()?;

    match state.db.create_address(&req).await {
        Ok(address) => Ok(HttpResponse::Created().json(address)),
        Err(e) => {
            error!("Address create failed for user {}: {}", req.user_id, e);
            Err(e)
        }
    }
}

pub async fn delete_address(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = PathId::parse(&path)?.or_not_found("Address not found")?;
    info!("Received delete request for address {}", id);

    state.db.delete_address(id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Address {} deleted", id)
    })))
}
