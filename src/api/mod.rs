pub mod auth;
pub mod health;
pub mod metrics;
pub mod sessions;
pub mod swagger;

use actix_web::{error, web, HttpRequest, HttpResponse, ResponseError};

use crate::{middleware::AuthMiddleware, utils::AppError};

/// Registers every API route. Callers provide `web::Data<AppConfig>` and
/// `web::Data<dyn MeditationStore>` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::ContentType => "Expected a JSON body".to_string(),
                other => format!("Malformed JSON body: {}", other),
            };
            AppError::InvalidRequest(message).into()
        });

    let form_config = web::FormConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            AppError::InvalidRequest(format!("Malformed form body: {}", err)).into()
        });

    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Invalid query string: {}", err)).into()
    });

    cfg.app_data(json_config)
        .app_data(form_config)
        .app_data(query_config)
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Auth endpoints
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .service(
                    web::resource("/session")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::get_session)),
                ),
        )
        // Sessions: reads are public, logging one requires a signed-in user
        .service(
            web::scope("/api/sessions")
                .service(
                    web::resource("")
                        .guard(actix_web::guard::Post())
                        .wrap(AuthMiddleware)
                        .route(web::post().to(sessions::create_session)),
                )
                .route("", web::get().to(sessions::list_sessions))
                .route("/summary", web::get().to(sessions::get_summary))
                .route("/daily/{date}", web::get().to(sessions::get_daily))
                .route("/stats", web::get().to(sessions::get_stats)),
        );
}

/// JSON 404 for anything no route matched
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    log::debug!("🔍 No route for {} {}", req.method(), req.path());
    AppError::NotFound(format!("No route for {}", req.path())).error_response()
}
