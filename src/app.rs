use std::{sync::Arc, time::Instant};

use actix_cors::Cors;
use actix_web::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    middleware::Logger,
    web, App, HttpServer,
};
use env_logger::Env;
use log::{debug, info};

use crate::{
    config::{Config, Environment},
    db::Database,
    errors::AppError,
    middleware::RequestLogger,
    repositories::LinkRepository,
    routes, services,
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

/// CORS policy for the browser front-end and third-party callers.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![CONTENT_TYPE, AUTHORIZATION])
        .max_age(3600)
}

pub async fn server() -> AppResult<()> {
    let config = Config::load()?;

    setup_logging(&config)?;

    let start_time = Instant::now();

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );
    info!(
        "Key allocation: length={}, retries={}, batch limit={}",
        config.allocator.key_length, config.allocator.max_retries, config.allocator.max_batch_size
    );

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    let enable_debug_logging = config.app.environment != Environment::Production;

    let log_format = if enable_debug_logging {
        "%a \"%r\" %s %b %T"
    } else {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{x-request-id}o"
    };

    // One pool for the whole process, shared by every worker
    let db = Database::connect(&config.db).await?;
    let repository = Arc::new(LinkRepository::new(&db));

    let state = web::Data::new(AppState {
        start_time,
        db: Some(db.clone()),
        version: config.app.version.clone(),
    });
    let admin = web::Data::new(config.admin.clone());
    let allocator_config = config.allocator.clone();

    HttpServer::new(move || {
        let repository = repository.clone();
        let allocator_config = allocator_config.clone();

        App::new()
            .app_data(state.clone())
            .app_data(admin.clone())
            .wrap(RequestLogger::new(enable_debug_logging))
            .wrap(cors())
            .wrap(Logger::new(log_format))
            .configure(move |cfg| services::register(repository, allocator_config, cfg))
            .configure(routes::configure_routes::<LinkRepository>)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    db.shutdown().await;

    Ok(())
}
