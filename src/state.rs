//! 애플리케이션 공유 상태
//!
//! 시작 시 한 번 조립되어 모든 워커가 `Arc`로 공유합니다.
//! 리프레시 토큰 저장소와 Rate Limit 윈도우 저장소는 각 서비스가 소유하므로
//! 워커가 여러 개여도 같은 저장소를 봅니다.

use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::config::{
    CredentialBundle, CredentialConfig, IdentityProviderConfig, RateLimitConfig, TokenConfig,
    UpstreamConfig, UpstreamRoute,
};
use crate::errors::AppResult;
use crate::services::auth::{FirebaseIdentityProvider, IdentityProvider, KeyMaterial, TokenService};
use crate::services::gateway::{build_http_client, ProxyService, RateLimiter};

/// 핸들러와 미들웨어가 공유하는 서비스 묶음
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<TokenService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub proxy: Arc<ProxyService>,
    pub upstreams: Vec<UpstreamRoute>,
}

impl AppState {
    /// 환경 변수로부터 전체 상태를 조립합니다.
    ///
    /// # Errors
    ///
    /// 필수 설정 누락, 자격 증명 번들/개인키 오류, 업스트림 테이블 오류는
    /// 모두 `AppError::ConfigError`이며 서버는 바인딩 전에 종료해야 합니다.
    pub fn from_env() -> AppResult<Self> {
        let bundle_path = CredentialConfig::bundle_path()?;
        let api_key = IdentityProviderConfig::api_key()?;
        let upstreams = UpstreamConfig::routes()?;

        let bundle = CredentialBundle::load(&bundle_path)?;
        let keys = Arc::new(KeyMaterial::from_bundle(&bundle)?);

        // 두 값 모두 상한 검사를 거쳐 Duration 생성이 넘치지 않음
        let token_service = Arc::new(TokenService::new(
            keys.clone(),
            chrono::Duration::minutes(TokenConfig::access_ttl_minutes()?),
            chrono::Duration::days(TokenConfig::refresh_ttl_days()?),
        ));

        let rate_limiter = Arc::new(RateLimiter::new(
            RateLimitConfig::requests_per_window()?,
            RateLimitConfig::window(),
        ));

        let client = build_http_client(UpstreamConfig::timeout())?;
        let identity_provider: Arc<dyn IdentityProvider> = Arc::new(FirebaseIdentityProvider::new(
            client.clone(),
            IdentityProviderConfig::base_url(),
            api_key,
            keys,
            &bundle,
        ));

        for route in &upstreams {
            log::info!("🔀 라우트 등록: {}/* → {}", route.prefix, route.origin);
        }

        Ok(Self {
            token_service,
            rate_limiter,
            identity_provider,
            proxy: Arc::new(ProxyService::new(client)),
            upstreams,
        })
    }

    /// 만료된 리프레시 토큰과 끝난 Rate Limit 윈도우를 주기적으로 정리합니다.
    ///
    /// actix 런타임 안에서 호출해야 합니다.
    pub fn spawn_store_sweeper(&self, every: Duration) {
        let token_service = self.token_service.clone();
        let rate_limiter = self.rate_limiter.clone();

        actix_web::rt::spawn(async move {
            let mut ticker = actix_web::rt::time::interval(every);
            // 첫 tick은 즉시 완료됨
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let tokens = token_service.purge_expired();
                let windows = rate_limiter.purge_stale(Instant::now());
                if tokens > 0 || windows > 0 {
                    log::debug!("🧹 저장소 정리 - 리프레시 토큰 {}개, Rate Limit 윈도우 {}개", tokens, windows);
                }
            }
        });
    }
}
