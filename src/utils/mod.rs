use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::{hash, verify};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::result::ApiResult;

pub const SESSION_COOKIE: &str = "session_id";

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 生成会话ID：128 位随机数，32 位十六进制
pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 会话 Cookie，有效期与会话 TTL 一致
pub fn session_cookie(session_id: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(
            i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

pub fn success_to_api_response<T: Serialize>(message: &str, data: T) -> Json<ApiResult<T>> {
    Json(ApiResult::success(message, data))
}

pub fn ack_to_api_response(message: &str) -> Json<ApiResult<()>> {
    Json(ApiResult::ack(message))
}

pub fn error_to_api_response<T>(msg: String) -> Json<ApiResult<T>> {
    Json(ApiResult::error(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_hex() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn session_cookie_matches_config() {
        let config = Config::default();
        let cookie = session_cookie("abc".to_string(), &config);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(600)));
    }

    #[test]
    fn password_hash_rejects_other_passwords() {
        let hashed = hash_password("password123", 4).unwrap();
        assert_ne!(hashed, "password123");
        assert!(verify_password("password123", &hashed).unwrap());
        assert!(!verify_password("password124", &hashed).unwrap());
    }
}
