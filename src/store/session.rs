use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::utils::generate_session_id;

/// 会话中携带的最小身份信息，不包含密码和邮箱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSessionInfo {
    pub user_id: u64,
    pub login: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_info: UserSessionInfo,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// 内存会话表，按会话ID索引
///
/// 过期在读取时惰性检查，`sweep` 用于批量清理被遗弃的会话。
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: TimeDelta,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 创建会话，返回会话ID
    pub fn create(&self, user_info: UserSessionInfo) -> String {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.insert_with_expiration(user_info, now, expires_at)
    }

    pub(crate) fn insert_with_expiration(
        &self,
        user_info: UserSessionInfo,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> String {
        let session_id = generate_session_id();
        let session = Session {
            session_id: session_id.clone(),
            user_info,
            created_at,
            expires_at,
        };
        self.write().insert(session_id.clone(), session);
        session_id
    }

    /// 检查会话，过期的会话会在这里被删除
    pub fn check(&self, session_id: &str) -> Result<UserSessionInfo, SessionError> {
        let now = Utc::now();
        match self.read().get(session_id) {
            None => return Err(SessionError::Invalid),
            Some(session) if !session.is_expired(now) => return Ok(session.user_info.clone()),
            Some(_) => {}
        }

        let mut sessions = self.write();
        if sessions
            .get(session_id)
            .is_some_and(|session| session.is_expired(now))
        {
            sessions.remove(session_id);
            tracing::debug!("Removed expired session on access");
        }
        Err(SessionError::Invalid)
    }

    /// 删除会话，会话不存在时也视为成功
    pub fn delete(&self, session_id: &str) {
        self.write().remove(session_id);
    }

    /// 删除所有已过期的会话，返回删除数量
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.read().contains_key(session_id)
    }
}
