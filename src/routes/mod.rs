use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Responder};

use crate::{
    db::DBHealthStatus,
    errors::AppError,
    handlers::{
        create_handler, delete_link_handler, get_handler, list_links_handler, redirect_handler,
        update_handler, verify_password_handler,
    },
    repositories::LinkRepositoryTrait,
    types::{AppState, HealthStatus, ResponsePayload},
};

/// Large enough for a full batch of long URLs.
const JSON_LIMIT: usize = 256 * 1024;

// Handler function for the root route "/"
async fn index() -> impl Responder {
    let welcome_message = ResponsePayload {
        status: 200,
        message: String::from("Welcome and have a great time!"),
    };

    HttpResponse::Ok().json(welcome_message)
}

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let uptime = data.start_time.elapsed().as_secs();

    let db_health = match &data.db {
        Some(db) => Some(db.health_check().await),
        None => None,
    };
    let healthy = db_health
        .as_ref()
        .map_or(true, |h| matches!(h.status, DBHealthStatus::Healthy));

    let status = HealthStatus {
        status: String::from(if healthy { "OK" } else { "DEGRADED" }),
        version: data.version.clone(),
        db_health,
        uptime_seconds: uptime,
    };

    if healthy {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "JSON payload too large".to_string()
        }
        JsonPayloadError::ContentType => "Expected an application/json body".to_string(),
        other => format!("Invalid JSON body: {}", other),
    };
    AppError::Validation(message).into()
}

// Configure all routes function
pub fn configure_routes<R: LinkRepositoryTrait + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(json_error),
    );

    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));

    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/links")
                    .route(web::post().to(create_handler::<R>))
                    .route(web::get().to(get_handler::<R>))
                    .route(web::put().to(update_handler::<R>)),
            )
            .service(
                web::scope("/admin")
                    .route("/verify", web::post().to(verify_password_handler))
                    .service(
                        web::resource("/links")
                            .route(web::get().to(list_links_handler::<R>))
                            .route(web::delete().to(delete_link_handler::<R>)),
                    ),
            ),
    );

    // Short keys; must stay last so they don't shadow the routes above
    cfg.route("/l/{key}", web::get().to(redirect_handler::<R>));
    cfg.route("/{key}", web::get().to(redirect_handler::<R>));
}
