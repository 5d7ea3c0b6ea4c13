//! 고정 윈도우 Rate Limiting 미들웨어
//!
//! 앱 전체의 가장 바깥에 등록되어, 인증이나 본문 파싱보다 먼저
//! 클라이언트별 요청 수를 확인합니다.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::LocalBoxFuture;
use crate::services::gateway::RateLimiter;
use crate::utils::resolve_client_identity;

/// Rate Limiting 미들웨어
///
/// # Examples
///
/// ```rust,ignore
/// App::new()
///     .wrap(Logger::default())
///     .wrap(RateLimit::new(state.rate_limiter.clone()))
/// ```
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
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
        let identity = resolve_client_identity(req.headers(), req.peer_addr());

        // 락은 판정하는 동안만 잡고 다음 서비스 호출 전에 풀림
        if let Err(err) = self.limiter.admit(&identity) {
            log::warn!("🚫 Rate limit 초과: {} {} (client: {})", req.method(), req.path(), identity);
            let response = err.error_response();
            let (req, _) = req.into_parts();
            return Box::pin(async move {
                Ok(ServiceResponse::new(req, response).map_into_right_body())
            });
        }

        let service = self.service.clone();
        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
