//! 액세스/리프레시 토큰 관리 서비스
//!
//! - 액세스 토큰: RS256 서명 JWT. 저장소 조회 없이 공개키만으로 검증됩니다.
//! - 리프레시 토큰: 48바이트 난수의 불투명 문자열. 메모리 저장소에 보관되며
//!   한 번 사용하면 즉시 새 토큰으로 교체(rotation)됩니다.
//!
//! 리프레시 저장소에 대한 모든 조회-변경은 하나의 락 구간에서 수행되므로
//! 같은 토큰을 동시에 두 번 사용해도 한 번만 성공합니다.

use std::collections::HashMap;
use std::sync::Arc;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::Validation;
use parking_lot::Mutex;
use rsa::rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use crate::domain::models::{AccessClaims, RefreshTokenRecord, TokenPair, TOKEN_ISSUER};
use crate::errors::{AppError, AppResult, ErrorContext};
use crate::services::auth::key_material::{KeyMaterial, SIGNING_ALGORITHM};

/// 리프레시 토큰 엔트로피 (바이트)
const REFRESH_TOKEN_BYTES: usize = 48;

/// 토큰 발급/검증/교체 서비스
///
/// 리프레시 저장소를 직접 소유하며, 전역 상태 없이 `AppState`를 통해 공유됩니다.
pub struct TokenService {
    keys: Arc<KeyMaterial>,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl TokenService {
    /// 새 토큰 서비스를 만듭니다.
    ///
    /// # Arguments
    ///
    /// * `keys` - 서명 키
    /// * `access_ttl` - 로그인/갱신 시 발급하는 액세스 토큰 수명
    /// * `refresh_ttl` - 리프레시 토큰 수명
    pub fn new(keys: Arc<KeyMaterial>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            keys,
            validation,
            access_ttl,
            refresh_ttl,
            refresh_tokens: Mutex::new(HashMap::new()),
        }
    }

    /// 서명 키에 접근합니다. (JWKS 노출, 서비스 계정 assertion 서명)
    pub fn keys(&self) -> &Arc<KeyMaterial> {
        &self.keys
    }

    /// 액세스 토큰 수명 (초)
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// `{sub, iat, exp, iss}` 클레임으로 액세스 토큰을 발급합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let token = token_service.issue_access_token("u1", 30)?;
    /// assert_eq!(token.split('.').count(), 3);
    /// ```
    pub fn issue_access_token(&self, uid: &str, ttl_minutes: i64) -> AppResult<String> {
        let claims = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| AccessClaims::new(uid, Utc::now(), ttl))
            .ok_or_else(|| {
                AppError::InternalError(format!("Access token TTL out of range: {}m", ttl_minutes))
            })?;
        self.keys.sign(&claims)
    }

    /// 액세스 토큰을 검증하고 uid를 반환합니다.
    ///
    /// # Errors
    ///
    /// 서명 불일치, RS256이 아닌 알고리즘, 만료, 발급자 불일치, 형식 오류는
    /// 모두 `AppError::AuthenticationError`로 처리됩니다.
    pub fn verify_access_token(&self, token: &str) -> AppResult<String> {
        let claims: AccessClaims = self.keys.verify(token, &self.validation).map_err(|e| {
            log::debug!("액세스 토큰 검증 실패: {}", e);
            AppError::AuthenticationError("Invalid or expired access token".to_string())
        })?;

        if claims.sub.is_empty() {
            return Err(AppError::AuthenticationError(
                "Access token has no subject".to_string(),
            ));
        }

        Ok(claims.sub)
    }

    /// 새 리프레시 토큰을 발급하고 저장합니다.
    pub fn issue_refresh_token(&self, uid: &str) -> AppResult<String> {
        let record = self.new_refresh_record(uid)?;
        let token = record.token.clone();

        self.refresh_tokens.lock().insert(token.clone(), record);
        log::debug!("리프레시 토큰 발급 - uid: {}, token: {}", uid, fingerprint(&token));

        Ok(token)
    }

    /// 로그인 응답용 토큰 쌍 (설정된 수명의 액세스 토큰 + 리프레시 토큰)
    pub fn issue_token_pair(&self, uid: &str) -> AppResult<TokenPair> {
        let access_token = self.issue_access_token(uid, self.access_ttl.num_minutes())?;
        let refresh_token = self.issue_refresh_token(uid)?;

        Ok(TokenPair {
            uid: uid.to_string(),
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs(),
        })
    }

    /// 리프레시 토큰을 사용해 새 토큰 쌍을 발급합니다 (rotation).
    ///
    /// 조회, 만료 확인, 이전 토큰 삭제, 새 토큰 저장이 하나의 락 구간에서 수행됩니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InvalidToken` - 저장소에 없는 토큰 (이미 사용되었거나 폐기됨)
    /// * `AppError::ExpiredToken` - 만료된 토큰 (저장소에서 제거됨)
    pub fn redeem_refresh_token(&self, token: &str) -> AppResult<TokenPair> {
        let now = Utc::now();
        // 난수 생성은 락 밖에서
        let mut replacement = self.new_refresh_record("")?;

        let uid = {
            let mut store = self.refresh_tokens.lock();

            let (uid, expired) = match store.get(token) {
                Some(record) => (record.uid.clone(), record.is_expired_at(now)),
                None => {
                    log::warn!("알 수 없는 리프레시 토큰 사용 시도: {}", fingerprint(token));
                    return Err(AppError::InvalidToken);
                }
            };

            // 만료 여부와 관계없이 사용된 토큰은 저장소에서 제거
            store.remove(token);
            if expired {
                log::info!("만료된 리프레시 토큰 제거 - uid: {}", uid);
                return Err(AppError::ExpiredToken);
            }

            replacement.uid = uid.clone();
            store.insert(replacement.token.clone(), replacement.clone());
            uid
        };

        let access_token = self.issue_access_token(&uid, self.access_ttl.num_minutes())?;
        log::info!(
            "🔄 리프레시 토큰 교체 - uid: {}, {} -> {}",
            uid,
            fingerprint(token),
            fingerprint(&replacement.token)
        );

        Ok(TokenPair {
            uid,
            access_token,
            refresh_token: replacement.token,
            expires_in: self.access_ttl_secs(),
        })
    }

    /// 리프레시 토큰을 폐기합니다. 없는 토큰이어도 에러가 아닙니다.
    ///
    /// 제거된 레코드를 반환하므로 로그아웃 시 소유자 uid를 알 수 있습니다.
    pub fn revoke_refresh_token(&self, token: &str) -> Option<RefreshTokenRecord> {
        let removed = self.refresh_tokens.lock().remove(token);
        if let Some(record) = &removed {
            log::info!("리프레시 토큰 폐기 - uid: {}", record.uid);
        }
        removed
    }

    /// 사용자의 모든 리프레시 토큰을 폐기하고 폐기된 개수를 반환합니다.
    pub fn revoke_all_for_user(&self, uid: &str) -> usize {
        let mut store = self.refresh_tokens.lock();
        let before = store.len();
        store.retain(|_, record| record.uid != uid);
        before - store.len()
    }

    /// 만료된 리프레시 레코드를 제거하고 제거된 개수를 반환합니다.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut store = self.refresh_tokens.lock();
        let before = store.len();
        store.retain(|_, record| !record.is_expired_at(now));
        before - store.len()
    }

    /// 저장소에 남아 있는 리프레시 토큰 수
    pub fn live_refresh_tokens(&self) -> usize {
        self.refresh_tokens.lock().len()
    }

    fn new_refresh_record(&self, uid: &str) -> AppResult<RefreshTokenRecord> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("Failed to generate refresh token")?;

        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.refresh_ttl).ok_or_else(|| {
            AppError::InternalError("Refresh token TTL out of range".to_string())
        })?;

        Ok(RefreshTokenRecord {
            token: URL_SAFE_NO_PAD.encode(bytes),
            uid: uid.to_string(),
            created_at: now,
            expires_at,
        })
    }
}

/// 로그용 토큰 지문 (원문은 절대 로그에 남기지 않음)
pub(crate) fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use crate::services::auth::key_material::test_keys;

    fn shared_keys() -> Arc<KeyMaterial> {
        static KEYS: OnceLock<Arc<KeyMaterial>> = OnceLock::new();
        KEYS.get_or_init(|| {
            Arc::new(KeyMaterial::from_pem(&test_keys::pkcs8_pem(test_keys::primary())).unwrap())
        })
        .clone()
    }

    fn service() -> TokenService {
        TokenService::new(shared_keys(), Duration::minutes(30), Duration::days(7))
    }

    fn now_claims(uid: &str, ttl: Duration) -> AccessClaims {
        AccessClaims::new(uid, Utc::now(), ttl).unwrap()
    }

    #[test]
    fn test_issue_then_verify_yields_uid() {
        let service = service();
        let token = service.issue_access_token("u1", 30).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(service.verify_access_token(&token).unwrap(), "u1");
    }

    #[test]
    fn test_expired_token_fails_even_with_valid_signature() {
        let service = service();
        let claims = AccessClaims::new("u1", Utc::now() - Duration::hours(2), Duration::minutes(30))
            .unwrap();
        let token = shared_keys().sign(&claims).unwrap();

        assert!(matches!(
            service.verify_access_token(&token),
            Err(AppError::AuthenticationError(_))
        ));
    }

    #[test]
    fn test_token_from_other_keypair_fails() {
        let service = service();
        let foreign = KeyMaterial::from_pem(&test_keys::pkcs8_pem(test_keys::secondary())).unwrap();
        let token = foreign.sign(&now_claims("u1", Duration::minutes(30))).unwrap();

        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_hs256_signed_with_public_key_fails() {
        let service = service();
        let public_pem = test_keys::primary()
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &now_claims("attacker", Duration::minutes(30)),
            &EncodingKey::from_secret(public_pem.as_bytes()),
        )
        .unwrap();

        assert!(service.verify_access_token(&forged).is_err());
    }

    #[test]
    fn test_alg_none_token_fails() {
        let service = service();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&now_claims("attacker", Duration::minutes(30))).unwrap());
        let token = format!("{}.{}.", header, payload);

        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_and_malformed_tokens_fail() {
        let service = service();
        let mut claims = now_claims("u1", Duration::minutes(30));
        claims.iss = "someone-else".to_string();
        let token = shared_keys().sign(&claims).unwrap();

        assert!(service.verify_access_token(&token).is_err());
        assert!(service.verify_access_token("").is_err());
        assert!(service.verify_access_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_refresh_token_shape() {
        let service = service();
        let token = service.issue_refresh_token("u1").unwrap();

        // 48바이트 → 패딩 없는 base64url 64자
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, service.issue_refresh_token("u1").unwrap());
    }

    #[test]
    fn test_redeem_rotates_and_is_single_use() {
        let service = service();
        let original = service.issue_refresh_token("u1").unwrap();

        let pair = service.redeem_refresh_token(&original).unwrap();
        assert_eq!(pair.uid, "u1");
        assert_ne!(pair.refresh_token, original);
        assert_eq!(service.verify_access_token(&pair.access_token).unwrap(), "u1");

        assert!(matches!(
            service.redeem_refresh_token(&original),
            Err(AppError::InvalidToken)
        ));
        assert!(service.redeem_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_redeem_unknown_token_is_invalid() {
        assert!(matches!(
            service().redeem_refresh_token("never-issued"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_redeem_expired_token_removes_it() {
        let service = TokenService::new(shared_keys(), Duration::minutes(30), Duration::zero());
        let token = service.issue_refresh_token("u1").unwrap();
        assert_eq!(service.live_refresh_tokens(), 1);

        assert!(matches!(
            service.redeem_refresh_token(&token),
            Err(AppError::ExpiredToken)
        ));
        assert_eq!(service.live_refresh_tokens(), 0);
        assert!(matches!(
            service.redeem_refresh_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let service = service();
        let token = service.issue_refresh_token("u1").unwrap();

        let removed = service.revoke_refresh_token(&token).unwrap();
        assert_eq!(removed.uid, "u1");
        assert!(service.revoke_refresh_token(&token).is_none());
        assert!(service.revoke_refresh_token("never-issued").is_none());
    }

    #[test]
    fn test_revoke_all_for_user_keeps_other_users() {
        let service = service();
        service.issue_refresh_token("u1").unwrap();
        service.issue_refresh_token("u1").unwrap();
        let other = service.issue_refresh_token("u2").unwrap();

        assert_eq!(service.revoke_all_for_user("u1"), 2);
        assert_eq!(service.live_refresh_tokens(), 1);
        assert!(service.redeem_refresh_token(&other).is_ok());
    }

    #[test]
    fn test_purge_expired() {
        let expiring = TokenService::new(shared_keys(), Duration::minutes(30), Duration::zero());
        expiring.issue_refresh_token("u1").unwrap();
        expiring.issue_refresh_token("u2").unwrap();
        assert_eq!(expiring.purge_expired(), 2);
        assert_eq!(expiring.live_refresh_tokens(), 0);

        let service = service();
        service.issue_refresh_token("u1").unwrap();
        assert_eq!(service.purge_expired(), 0);
    }

    #[test]
    fn test_token_pair_uses_configured_ttl() {
        let service = service();
        let pair = service.issue_token_pair("u1").unwrap();

        assert_eq!(pair.expires_in, 1800);
        assert_eq!(service.verify_access_token(&pair.access_token).unwrap(), "u1");
        assert!(service.redeem_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_oversized_ttl_is_an_error_not_a_panic() {
        let service = TokenService::new(shared_keys(), Duration::minutes(30), Duration::days(100_000_000));

        assert!(matches!(service.issue_token_pair("u1"), Err(AppError::InternalError(_))));
        assert!(matches!(service.issue_refresh_token("u1"), Err(AppError::InternalError(_))));
        assert!(matches!(
            service.issue_access_token("u1", i64::MAX),
            Err(AppError::InternalError(_))
        ));
        assert_eq!(service.live_refresh_tokens(), 0);
    }

    #[test]
    fn test_concurrent_redemption_has_single_winner() {
        let service = service();
        let token = service.issue_refresh_token("u1").unwrap();

        let results: Vec<AppResult<TokenPair>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| service.redeem_refresh_token(&token)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let invalid = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::InvalidToken)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(invalid, 15);
        assert_eq!(service.live_refresh_tokens(), 1);
    }
}
