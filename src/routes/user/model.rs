use serde::{Deserialize, Serialize};

use crate::store::PublicUser;

/// 注册响应，不含密码
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    /// 是否已同时创建会话
    pub logged_in: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: u64,
    pub login: String,
}
