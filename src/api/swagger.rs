use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meditation Tracker API",
        version = "1.0.0",
        description = "Log daily meditation sessions and browse shared statistics.\n\n**Authentication:** sign in through `/api/auth/login`; send the returned token as a Bearer header or rely on the session cookie. Only logging a session requires authentication."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::get_session,
        crate::api::auth::logout,

        // Sessions
        crate::api::sessions::list_sessions,
        crate::api::sessions::create_session,
        crate::api::sessions::get_summary,
        crate::api::sessions::get_daily,
        crate::api::sessions::get_stats,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::RegisterResponse,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::SessionInfo,
            crate::models::UserInfo,
            crate::models::SessionRecord,
            crate::services::session_service::NewSessionRequest,
            crate::services::session_service::InsertAcknowledgement,
            crate::services::session_service::SummaryResponse,
            crate::services::session_service::DailyResponse,
            crate::services::session_service::StatsResponse,
            crate::services::aggregation::DailyTotal,
            crate::services::aggregation::UserSessions,
            crate::services::aggregation::UserDay,
            crate::services::aggregation::UserStats,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Email/password registration and sign-in."),
        (name = "Sessions", description = "Meditation session log and aggregate views."),
        (name = "Health", description = "Health check and request counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/sessions"));
        assert!(doc.paths.paths.contains_key("/api/auth/register"));
        assert!(doc.paths.paths.contains_key("/api/sessions/daily/{date}"));
    }
}
