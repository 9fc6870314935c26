use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::{
    config::AdminConfig,
    errors::AppError,
    middleware::{authorize, passwords_match, AdminGuard},
    models::{AdminDeleteDto, AdminPasswordDto, PaginationParams},
    repositories::LinkRepositoryTrait,
    services::{LinkService, LinkServiceTrait},
    types::Result,
};

/// Admin password check route handler
pub async fn verify_password_handler(
    dto: web::Json<AdminPasswordDto>,
    admin: web::Data<AdminConfig>,
) -> Result<impl Responder> {
    if !passwords_match(&admin, &dto.password) {
        return Err(AppError::Forbidden("Invalid admin password".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// List links route handler
pub async fn list_links_handler<R: LinkRepositoryTrait + 'static>(
    _admin: AdminGuard,
    query: web::Query<PaginationParams>,
    service: web::Data<LinkService<R>>,
) -> Result<impl Responder> {
    let page = service.list(&query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Delete link route handler
pub async fn delete_link_handler<R: LinkRepositoryTrait + 'static>(
    req: HttpRequest,
    dto: web::Json<AdminDeleteDto>,
    service: web::Data<LinkService<R>>,
) -> Result<impl Responder> {
    let dto = dto.into_inner();
    authorize(&req, dto.password.as_deref())?;

    service.delete(&dto.key).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "key": dto.key.trim(),
    })))
}
