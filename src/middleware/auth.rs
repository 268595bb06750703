use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::{
    config::{AppConfig, SESSION_COOKIE},
    services::auth_service,
    utils::AppError,
};

pub use crate::services::auth_service::Claims;

/// Rejects requests without a valid token with 401. On success the decoded
/// `Claims` are available to handlers through `web::ReqData<Claims>`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Bearer header first, then the session cookie set at login
pub fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    from_header.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = match req.app_data::<web::Data<AppConfig>>() {
            Some(config) => config.clone(),
            None => {
                log::error!("❌ AppConfig missing from app data");
                return reject(req, AppError::Internal("Server configuration error".to_string()));
            }
        };

        let token = match extract_token(&req) {
            Some(token) => token,
            None => {
                log::warn!("🔒 {} {} - missing token", req.method(), req.path());
                return reject(req, AppError::Unauthorized("Please sign in".to_string()));
            }
        };

        match auth_service::verify_token(&config, &token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(e) => {
                log::warn!("🔒 {} {} - {}", req.method(), req.path(), e);
                reject(req, AppError::Unauthorized("Invalid or expired session".to_string()))
            }
        }
    }
}

fn reject<B: 'static>(
    req: ServiceRequest,
    error: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req.into_response(error.error_response()).map_into_right_body();
    Box::pin(async move { Ok(response) })
}
