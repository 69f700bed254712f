use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::AppError,
    store::{Credentials, NewUser, UserSessionInfo},
    utils::{
        SESSION_COOKIE, ack_to_api_response, removal_cookie, session_cookie,
        success_to_api_response,
    },
};

use super::model::{LoginResponse, RegisterResponse};

// bcrypt 计算放到阻塞线程池，不占用异步工作线程
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Blocking credential task failed: {}", e);
        AppError::Internal
    })?
}

/// 注册，`register_auto_login` 打开时同时下发会话 Cookie
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<NewUser>,
) -> Result<Response, AppError> {
    let manager = state.manager.clone();

    if !state.config.register_auto_login {
        let user = run_blocking(move || Ok(manager.register(req)?)).await?;
        return Ok((
            StatusCode::OK,
            success_to_api_response(
                "注册成功",
                RegisterResponse {
                    user,
                    logged_in: false,
                },
            ),
        )
            .into_response());
    }

    let (user, session_id) = run_blocking(move || Ok(manager.register_and_login(req)?)).await?;
    let jar = jar.add(session_cookie(session_id, &state.config));
    Ok((
        StatusCode::OK,
        jar,
        success_to_api_response(
            "注册成功",
            RegisterResponse {
                user,
                logged_in: true,
            },
        ),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<Credentials>,
) -> Result<Response, AppError> {
    let manager = state.manager.clone();
    let (user_info, session_id) = run_blocking(move || Ok(manager.login(&req)?)).await?;
    let jar = jar.add(session_cookie(session_id, &state.config));

    Ok((
        StatusCode::OK,
        jar,
        success_to_api_response(
            "登录成功",
            LoginResponse {
                id: user_info.user_id,
                login: user_info.login,
            },
        ),
    )
        .into_response())
}

/// 退出登录，没有会话也返回成功
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.manager.logout(cookie.value());
        tracing::info!("Session closed by logout");
    }

    (
        StatusCode::OK,
        jar.remove(removal_cookie()),
        ack_to_api_response("已退出登录"),
    )
}

/// 返回当前会话的身份信息，会话已由中间件校验
#[axum::debug_handler]
pub async fn me(Extension(user_info): Extension<UserSessionInfo>) -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response("success", user_info))
}
