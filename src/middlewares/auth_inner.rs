//! AuthGuard 인증 로직의 핵심적인 기능
use std::rc::Rc;
use std::sync::Arc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;
use crate::domain::models::AuthenticatedUser;
use crate::errors::{AppError, AppResult};
use crate::services::auth::TokenService;
use crate::utils::extract_access_token;

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthGuardService<S> {
    pub service: Rc<S>,
    pub token_service: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let token_service = self.token_service.clone();

        Box::pin(async move {
            match authenticate(&req, &token_service) {
                Ok(user) => {
                    log::debug!("인증 성공: uid {} → {}", user.uid, req.path());
                    req.extensions_mut().insert(user);
                }
                Err(err) => {
                    log::warn!("인증 실패 ({} {}): {}", req.method(), req.path(), err);
                    let response = err.error_response();
                    let (req, _) = req.into_parts();
                    let res = ServiceResponse::new(req, response)
                        .map_into_right_body();
                    return Ok(res);
                }
            }

            // 다음 서비스로 요청 전달
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 요청에서 액세스 토큰을 추출하고 검증
fn authenticate(req: &ServiceRequest, token_service: &TokenService) -> AppResult<AuthenticatedUser> {
    let token = extract_access_token(req.headers()).ok_or_else(|| {
        AppError::AuthenticationError("Missing access token".to_string())
    })?;

    let uid = token_service.verify_access_token(&token)?;

    Ok(AuthenticatedUser { uid })
}
