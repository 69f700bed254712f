use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::{AppError, SessionError},
    utils::SESSION_COOKIE,
};

/// 校验会话 Cookie，把 `UserSessionInfo` 放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(SessionError::Invalid)?;

    let user_info = state.manager.who_am_i(&session_id).inspect_err(|_| {
        tracing::debug!("Rejected request to {} with invalid session", request.uri().path())
    })?;

    request.extensions_mut().insert(user_info);
    Ok(next.run(request).await)
}
