use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::MeditationStore,
    middleware::auth::Claims,
    models::{SessionQuery, SessionRecord},
    services::session_service::{
        self, DailyResponse, InsertAcknowledgement, NewSessionRequest, StatsResponse, SummaryResponse,
    },
};

#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    params(SessionQuery),
    responses(
        (status = 200, description = "Logged sessions ordered by date", body = [SessionRecord]),
        (status = 400, description = "Malformed date filter"),
        (status = 500, description = "Failed to fetch sessions")
    )
)]
pub async fn list_sessions(
    store: web::Data<dyn MeditationStore>,
    query: web::Query<SessionQuery>,
) -> HttpResponse {
    log::info!("📋 GET /sessions - filters: {:?}", query);

    match session_service::list_sessions(store.get_ref(), &query).await {
        Ok(sessions) => {
            log::info!("✅ Listed {} sessions", sessions.len());
            HttpResponse::Ok().json(sessions)
        }
        Err(e) => {
            log::error!("❌ Error listing sessions: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    request_body = NewSessionRequest,
    responses(
        (status = 201, description = "Session logged", body = InsertAcknowledgement),
        (status = 400, description = "Invalid date or duration"),
        (status = 401, description = "Not signed in")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_session(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn MeditationStore>,
    request: web::Json<NewSessionRequest>,
) -> HttpResponse {
    let user_id = &claims.sub;
    log::info!("📝 POST /sessions - user {}", user_id);

    match session_service::create_session(store.get_ref(), &claims, &request).await {
        Ok(ack) => {
            log::info!("✅ Session logged: {}", ack.inserted_id);
            HttpResponse::Created().json(ack)
        }
        Err(e) => {
            log::warn!("❌ Failed to log session for {}: {}", user_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/summary",
    tag = "Sessions",
    responses(
        (status = 200, description = "Session counts and minutes by user and day", body = SummaryResponse)
    )
)]
pub async fn get_summary(store: web::Data<dyn MeditationStore>) -> HttpResponse {
    log::info!("📊 GET /sessions/summary");

    match session_service::summary(store.get_ref()).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            log::error!("❌ Error building summary: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/daily/{date}",
    tag = "Sessions",
    params(
        ("date" = String, Path, description = "Day as YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Per-user totals for the day, zero for idle users", body = DailyResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_daily(store: web::Data<dyn MeditationStore>, date: web::Path<String>) -> HttpResponse {
    log::info!("📅 GET /sessions/daily/{}", date);

    match session_service::daily(store.get_ref(), &date).await {
        Ok(daily) => HttpResponse::Ok().json(daily),
        Err(e) => {
            log::warn!("❌ Error building daily view: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/stats",
    tag = "Sessions",
    responses(
        (status = 200, description = "Totals and averages per user", body = StatsResponse)
    )
)]
pub async fn get_stats(store: web::Data<dyn MeditationStore>) -> HttpResponse {
    log::info!("📈 GET /sessions/stats");

    match session_service::stats(store.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            log::error!("❌ Error building stats: {}", e);
            e.error_response()
        }
    }
}
