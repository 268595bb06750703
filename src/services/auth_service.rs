use bcrypt::{hash, verify};
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    database::MeditationStore,
    models::{User, UserInfo},
    utils::{normalize_email, non_blank, AppError},
};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id (hex ObjectId)
    pub email: String,
    pub name: Option<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    /// RFC 3339 expiry of the token
    pub expires_at: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SessionInfo {
    pub user: UserInfo,
    pub expires: String,
}

impl From<&Claims> for SessionInfo {
    fn from(claims: &Claims) -> Self {
        Self {
            user: UserInfo {
                id: claims.sub.clone(),
                email: claims.email.clone(),
                name: claims.name.clone(),
            },
            expires: timestamp_to_rfc3339(claims.exp as i64),
        }
    }
}

fn timestamp_to_rfc3339(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

// Generate JWT token, returns the token and its expiry (unix seconds)
pub fn generate_jwt(config: &AppConfig, user: &User) -> Result<(String, i64), AppError> {
    let now = Utc::now();
    let exp = (now + Duration::hours(config.session_ttl_hours)).timestamp();

    let claims = Claims {
        sub: user.user_id(),
        email: user.email.clone(),
        name: Some(user.name.clone()),
        iat: now.timestamp() as usize,
        exp: exp as usize,
        jti: Uuid::new_v4().to_string(),
        aud: config.jwt_audience.clone(),
        iss: config.jwt_issuer.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

    Ok((token, exp))
}

// Verify JWT token
pub fn verify_token(config: &AppConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.jwt_audience.as_str()]);
    validation.set_issuer(&[config.jwt_issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| {
            log::error!("❌ Failed to hash password: {}", e);
            AppError::Internal("Failed to create user".to_string())
        })
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| {
            // A malformed stored hash never matches
            log::warn!("⚠️  Password verification error: {}", e);
            AppError::Unauthorized("Invalid credentials".to_string())
        })
}

// User registration
pub async fn register(
    store: &dyn MeditationStore,
    config: &AppConfig,
    request: &RegisterRequest,
) -> Result<RegisterResponse, AppError> {
    let (email, password, name) = match (
        non_blank(request.email.as_deref()),
        request.password.as_deref().filter(|p| !p.is_empty()),
        non_blank(request.name.as_deref()),
    ) {
        (Some(email), Some(password), Some(name)) => (normalize_email(email), password, name),
        _ => return Err(AppError::InvalidRequest("Missing required fields".to_string())),
    };

    // Check if user already exists
    let existing = store.find_user_by_email(&email).await.map_err(|e| {
        log::error!("❌ Registration lookup failed: {}", e);
        AppError::DatabaseError("Failed to create user".to_string())
    })?;

    if existing.is_some() {
        return Err(AppError::InvalidRequest("User already exists".to_string()));
    }

    let hashed_password = hash_password(password.to_string(), config.bcrypt_cost).await?;

    let user_id = store
        .insert_user(User::new(email.clone(), hashed_password, name.to_string()))
        .await
        .map_err(|e| {
            log::error!("❌ Failed to insert user: {}", e);
            AppError::DatabaseError("Failed to create user".to_string())
        })?;

    log::info!("✅ User registered successfully: {}", email);

    Ok(RegisterResponse {
        success: true,
        message: "User created successfully".to_string(),
        user_id,
    })
}

// User login
pub async fn login(
    store: &dyn MeditationStore,
    config: &AppConfig,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let (email, password) = match (
        non_blank(request.email.as_deref()),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) {
        (Some(email), Some(password)) => (normalize_email(email), password),
        _ => {
            return Err(AppError::InvalidRequest(
                "Please enter an email and password".to_string(),
            ))
        }
    };

    let user = store
        .find_user_by_email(&email)
        .await
        .map_err(|e| {
            log::error!("❌ Login lookup failed: {}", e);
            AppError::DatabaseError("Failed to sign in".to_string())
        })?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(password.to_string(), user.password.clone()).await? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let (token, exp) = generate_jwt(config, &user)?;

    Ok(AuthResponse {
        success: true,
        token,
        expires_at: timestamp_to_rfc3339(exp),
        user: UserInfo::from(&user),
    })
}
