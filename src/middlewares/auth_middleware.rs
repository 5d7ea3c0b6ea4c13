//! 액세스 토큰 인증 미들웨어
//!
//! 업스트림 스코프마다 등록되어, 프록시 전에 게이트웨이 액세스 토큰을 검증합니다.
//! 검증된 uid는 [`AuthenticatedUser`](crate::domain::models::AuthenticatedUser)로
//! request extensions에 저장됩니다.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
    body::EitherBody,
};
use crate::middlewares::auth_inner::AuthGuardService;
use crate::services::auth::TokenService;

/// 액세스 토큰 필수 인증 미들웨어
///
/// 토큰이 없거나 유효하지 않으면 `401 {"error": ...}`로 응답하고
/// 요청을 백엔드로 넘기지 않습니다.
pub struct AuthGuard {
    token_service: Arc<TokenService>,
}

impl AuthGuard {
    /// 새로운 인증 미들웨어 생성
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService {
            service: Rc::new(service),
            token_service: self.token_service.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};
    use chrono::Duration;
    use crate::domain::models::AuthenticatedUser;
    use crate::services::auth::key_material::test_keys;
    use crate::services::auth::KeyMaterial;

    fn token_service() -> Arc<TokenService> {
        static SERVICE: OnceLock<Arc<TokenService>> = OnceLock::new();
        SERVICE
            .get_or_init(|| {
                let keys = KeyMaterial::from_pem(&test_keys::pkcs8_pem(test_keys::primary())).unwrap();
                Arc::new(TokenService::new(Arc::new(keys), Duration::minutes(30), Duration::days(7)))
            })
            .clone()
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.uid)
    }

    #[actix_web::test]
    async fn test_valid_bearer_token_reaches_handler() {
        let tokens = token_service();
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthGuard::new(tokens.clone()))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let access = tokens.issue_access_token("u1", 5).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", access)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, web::Bytes::from_static(b"u1"));
    }

    #[actix_web::test]
    async fn test_cookie_token_is_accepted() {
        let tokens = token_service();
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthGuard::new(tokens.clone()))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let access = tokens.issue_access_token("u2", 5).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Cookie", format!("access_token={}", access)))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_or_invalid_token_is_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthGuard::new(token_service()))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Bearer not.a.token"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
