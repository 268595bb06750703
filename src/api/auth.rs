use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, Either, HttpResponse, ResponseError,
};

use crate::{
    config::{AppConfig, SESSION_COOKIE},
    database::MeditationStore,
    middleware::auth::Claims,
    services::auth_service::{self, AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, SessionInfo},
};

fn session_cookie(token: String, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(ttl_hours))
        .finish()
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Missing fields or user already exists"),
        (status = 500, description = "Failed to create user")
    )
)]
pub async fn register(
    store: web::Data<dyn MeditationStore>,
    config: web::Data<AppConfig>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let email_str = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /auth/register - email: {}", email_str);

    match auth_service::register(store.get_ref(), &config, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", response.user_id);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", email_str, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body(
        content = LoginRequest,
        description = "JSON or application/x-www-form-urlencoded credentials"
    ),
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    store: web::Data<dyn MeditationStore>,
    config: web::Data<AppConfig>,
    request: Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> HttpResponse {
    let request = match request {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let email_str = request.email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /auth/login - email: {}", email_str);

    match auth_service::login(store.get_ref(), &config, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", response.user.id);
            HttpResponse::Ok()
                .cookie(session_cookie(response.token.clone(), config.session_ttl_hours))
                .json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email_str, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionInfo),
        (status = 401, description = "Not signed in")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_session(claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /auth/session - user: {}", claims.sub);
    HttpResponse::Ok().json(SessionInfo::from(&*claims))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> HttpResponse {
    log::info!("👋 POST /auth/logout");

    let mut cookie = session_cookie(String::new(), 0);
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true,
        "message": "Signed out"
    }))
}
