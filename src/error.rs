use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::error_to_api_response;

/// 注册校验错误，按校验顺序排列，注册阶段可以原样返回给调用方
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("邮箱格式无效")]
    InvalidEmail,
    #[error("登录名不能少于3个字符")]
    LoginTooShort,
    #[error("该登录名已被注册")]
    DuplicateLogin,
    #[error("用户名不能少于3个字符")]
    UsernameTooShort,
    #[error("密码不能少于6个字符")]
    PasswordTooShort,
    #[error("不支持的角色: {0}")]
    RoleNotAllowed(String),
    #[error("创建用户失败")]
    Internal,
}

/// 登录错误，不区分“用户不存在”和“密码错误”
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("登录名或密码错误")]
    InvalidCredentials,
    #[error("验证凭据失败")]
    Hashing,
}

/// 会话错误，不存在与已过期对外是同一种结果
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("会话无效或已过期")]
    Invalid,
}

/// 跨越 HTTP 边界的统一错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("内部服务器错误")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Hashing) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Session(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, error_to_api_response::<()>(self.to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::from(ValidationError::DuplicateLogin).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(ValidationError::Internal).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::from(AuthError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(SessionError::Invalid).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
