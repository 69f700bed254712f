// 两个需要登录才能访问的模拟资源

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, store::UserSessionInfo, utils::success_to_api_response};

use super::model::{FeedItem, FeedResponse, StatsResponse};

const FEED_TITLES: [&str; 3] = ["欢迎回来", "今日推荐", "系统公告"];

#[axum::debug_handler]
pub async fn feed(Extension(user_info): Extension<UserSessionInfo>) -> impl IntoResponse {
    let items = FEED_TITLES
        .iter()
        .zip(1..)
        .map(|(title, id)| FeedItem {
            id,
            title: title.to_string(),
            author: "system".to_string(),
        })
        .collect();

    (
        StatusCode::OK,
        success_to_api_response(
            "success",
            FeedResponse {
                owner: user_info.login,
                items,
            },
        ),
    )
}

#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    Extension(user_info): Extension<UserSessionInfo>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(
            "success",
            StatsResponse {
                user_id: user_info.user_id,
                login: user_info.login,
                registered_users: state.manager.users().len(),
                active_sessions: state.manager.sessions().len(),
                server_time: chrono::Utc::now().timestamp(),
            },
        ),
    )
}
