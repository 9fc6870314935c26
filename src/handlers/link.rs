use actix_web::{web, HttpResponse, Responder};
use log::{debug, warn};
use serde_json::json;

use crate::{
    models::{CreateLinkRequest, LinkDetails, LinkKeyQuery, UpdateLinkDto},
    repositories::LinkRepositoryTrait,
    services::{LinkAllocator, LinkService, LinkServiceTrait},
    types::Result,
    utils::qr,
};

const QR_SIZE: u32 = 300;

/// Create link route handler, single item or batch
pub async fn create_handler<R: LinkRepositoryTrait + 'static>(
    body: web::Json<CreateLinkRequest>,
    allocator: web::Data<LinkAllocator<R>>,
) -> Result<impl Responder> {
    match body.into_inner() {
        CreateLinkRequest::Single(dto) => {
            let allocation = allocator.allocate(&dto.url, dto.key.as_deref()).await?;
            let mut response = if allocation.existing {
                HttpResponse::Ok()
            } else {
                HttpResponse::Created()
            };
            Ok(response.json(allocation))
        }
        CreateLinkRequest::Batch { batch } => {
            debug!("Batch create requested with {} items", batch.len());
            let results = allocator.allocate_batch(batch).await?;
            Ok(HttpResponse::Ok().json(json!({ "results": results })))
        }
    }
}

/// Get link by key route handler
pub async fn get_handler<R: LinkRepositoryTrait + 'static>(
    query: web::Query<LinkKeyQuery>,
    service: web::Data<LinkService<R>>,
) -> Result<impl Responder> {
    let key = query.into_inner().key.unwrap_or_default();
    let link = service.get(&key).await?;
    let qr_code = qr::svg_data_uri(&link.url, QR_SIZE)
        .map_err(|e| warn!("QR encoding failed for '{}': {}", link.key, e))
        .ok();

    Ok(HttpResponse::Ok().json(LinkDetails { link, qr_code }))
}

/// Update link route handler
pub async fn update_handler<R: LinkRepositoryTrait + 'static>(
    dto: web::Json<UpdateLinkDto>,
    service: web::Data<LinkService<R>>,
) -> Result<impl Responder> {
    let outcome = service.update(dto.into_inner()).await?;
    let message = if outcome.changed {
        "URL updated"
    } else {
        "URL unchanged"
    };
    Ok(HttpResponse::Ok().json(json!({
        "key": outcome.key,
        "url": outcome.url,
        "message": message,
    })))
}
