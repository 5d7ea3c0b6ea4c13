//! # Firebase Identity Toolkit 어댑터
//!
//! Identity Toolkit REST API로 [`IdentityProvider`]를 구현합니다.
//!
//! | 용도 | 엔드포인트 | 메서드 |
//! |------|------------|--------|
//! | **회원가입** | `{base}/accounts:signUp?key=` | POST |
//! | **비밀번호 로그인** | `{base}/accounts:signInWithPassword?key=` | POST |
//! | **ID 토큰 검증** | `{base}/accounts:lookup?key=` | POST |
//! | **세션 폐기** | `{base}/projects/{project_id}/accounts:update` | POST |
//!
//! 세션 폐기는 관리자 API라서 API 키가 아닌 서비스 계정 토큰이 필요합니다.
//! 서비스 계정 JWT(JWT-bearer 그랜트)를 게이트웨이 서명 키로 만든 뒤
//! `token_uri`에서 OAuth 액세스 토큰으로 교환해 사용합니다.
//!
//! ## 에러 매핑
//!
//! - 회원가입 거부 → `ValidationError`
//! - 로그인/토큰 검증 거부 → `AuthenticationError`
//! - 전송 실패, 5xx, 응답 파싱 실패 → `UpstreamError`

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::config::{CredentialBundle, IdentityProviderConfig};
use crate::errors::{AppError, AppResult};
use crate::services::auth::identity_provider::IdentityProvider;
use crate::services::auth::key_material::KeyMaterial;

const IDENTITY_TOOLKIT_SCOPE: &str = "https://www.googleapis.com/auth/identitytoolkit";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// 세션 폐기에 필요한 서비스 계정 정보
#[derive(Debug, Clone)]
struct ServiceAccount {
    private_key_id: Option<String>,
    client_email: String,
    project_id: String,
    token_uri: String,
}

/// 서비스 계정 assertion 클레임
#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountResponse>,
}

#[derive(Debug, Deserialize)]
struct ServiceTokenResponse {
    access_token: String,
}

/// Identity Toolkit 에러 응답 `{"error": {"message": "EMAIL_EXISTS"}}`
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Firebase REST 기반 Identity Provider
pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    keys: Arc<KeyMaterial>,
    service_account: Option<ServiceAccount>,
}

impl FirebaseIdentityProvider {
    /// 어댑터를 만듭니다.
    ///
    /// 번들에 `client_email`/`project_id`가 없으면 세션 폐기만 비활성화됩니다.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        keys: Arc<KeyMaterial>,
        bundle: &CredentialBundle,
    ) -> Self {
        let service_account = match (&bundle.client_email, &bundle.project_id) {
            (Some(client_email), Some(project_id)) => Some(ServiceAccount {
                private_key_id: bundle.private_key_id.clone(),
                client_email: client_email.clone(),
                project_id: project_id.clone(),
                token_uri: bundle
                    .token_uri
                    .clone()
                    .unwrap_or_else(IdentityProviderConfig::default_token_uri),
            }),
            _ => {
                log::warn!("⚠️ 자격 증명 번들에 client_email/project_id가 없어 업스트림 세션 폐기가 비활성화됩니다");
                None
            }
        };

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            keys,
            service_account,
        }
    }

    /// API 키 인증 엔드포인트에 JSON을 POST 합니다.
    ///
    /// 4xx는 `Ok(Err((status, message)))`로 돌려주어 호출자가 에러 종류를 고르게 하고,
    /// 연결 실패와 5xx는 `UpstreamError`로 돌려줍니다.
    async fn call(&self, method: &str, body: serde_json::Value) -> AppResult<Result<reqwest::Response, (u16, String)>> {
        let response = self
            .client
            .post(format!("{}/accounts:{}", self.base_url, method))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Identity provider unreachable: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(Ok(response));
        }

        if status.is_server_error() {
            return Err(AppError::UpstreamError(format!(
                "Identity provider returned {}",
                status
            )));
        }

        let message = response
            .json::<ProviderErrorBody>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| status.to_string());

        Ok(Err((status.as_u16(), message)))
    }

    /// 서비스 계정 JWT-bearer assertion
    ///
    /// 토큰 엔드포인트는 `kid`로 서비스 계정 공개키를 찾으므로
    /// 게이트웨이 키 ID가 아닌 번들의 `private_key_id`를 싣습니다.
    fn service_assertion(&self, account: &ServiceAccount) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = ServiceAccountClaims {
            iss: &account.client_email,
            scope: IDENTITY_TOOLKIT_SCOPE,
            aud: &account.token_uri,
            iat: now,
            exp: now + 3600,
        };

        self.keys.sign_with_key_id(&claims, account.private_key_id.as_deref())
    }

    async fn service_access_token(&self, account: &ServiceAccount) -> AppResult<String> {
        let assertion = self.service_assertion(account)?;

        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(&account.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Service account token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamError(format!(
                "Service account token exchange failed: {}",
                response.status()
            )));
        }

        response
            .json::<ServiceTokenResponse>()
            .await
            .map(|body| body.access_token)
            .map_err(|e| AppError::UpstreamError(format!("Malformed service account token response: {}", e)))
    }
}

fn parse_account(body: Result<AccountResponse, reqwest::Error>) -> AppResult<String> {
    body.map(|account| account.local_id)
        .map_err(|e| AppError::UpstreamError(format!("Malformed identity provider response: {}", e)))
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn register(&self, email: &str, password: &str, name: Option<&str>) -> AppResult<String> {
        let mut body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": false,
        });
        if let Some(name) = name {
            body["displayName"] = json!(name);
        }

        match self.call("signUp", body).await? {
            Ok(response) => {
                let uid = parse_account(response.json::<AccountResponse>().await)?;
                log::info!("✅ Identity provider 계정 생성 - uid: {}", uid);
                Ok(uid)
            }
            Err((status, message)) => {
                log::warn!("회원가입 거부 ({}): {}", status, message);
                Err(AppError::ValidationError(format!("Registration rejected: {}", message)))
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<String> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        match self.call("signInWithPassword", body).await? {
            Ok(response) => parse_account(response.json::<AccountResponse>().await),
            Err((status, message)) => {
                log::warn!("비밀번호 로그인 거부 ({}): {}", status, message);
                Err(AppError::AuthenticationError("Invalid email or password".to_string()))
            }
        }
    }

    async fn verify_federated_token(&self, token: &str) -> AppResult<String> {
        match self.call("lookup", json!({ "idToken": token })).await? {
            Ok(response) => {
                let lookup = response.json::<LookupResponse>().await.map_err(|e| {
                    AppError::UpstreamError(format!("Malformed identity provider response: {}", e))
                })?;

                lookup
                    .users
                    .into_iter()
                    .next()
                    .map(|account| account.local_id)
                    .ok_or_else(|| AppError::AuthenticationError("Invalid federated token".to_string()))
            }
            Err((status, message)) => {
                log::warn!("연동 토큰 검증 실패 ({}): {}", status, message);
                Err(AppError::AuthenticationError("Invalid federated token".to_string()))
            }
        }
    }

    async fn revoke_sessions(&self, uid: &str) -> AppResult<()> {
        let account = self.service_account.as_ref().ok_or_else(|| {
            AppError::InternalError("Service account is not configured".to_string())
        })?;

        let access_token = self.service_access_token(account).await?;

        let response = self
            .client
            .post(format!(
                "{}/projects/{}/accounts:update",
                self.base_url, account.project_id
            ))
            .bearer_auth(access_token)
            .json(&json!({
                "localId": uid,
                "validSince": Utc::now().timestamp().to_string(),
            }))
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Identity provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamError(format!(
                "Session revocation failed: {}",
                response.status()
            )));
        }

        log::info!("🔒 Identity provider 세션 폐기 - uid: {}", uid);
        Ok(())
    }
}
