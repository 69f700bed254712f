use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::config::Config;
use crate::error::{AuthError, SessionError, ValidationError};
use crate::store::session::{SessionStore, UserSessionInfo};
use crate::store::user::{Credentials, NewUser, PublicUser, RegistrationPolicy, UserStore};

/// 组合用户表和会话表
///
/// 任何操作都不会同时持有两张表的锁。
#[derive(Debug)]
pub struct SessionManager {
    users: UserStore,
    sessions: SessionStore,
}

impl SessionManager {
    pub fn new(users: UserStore, sessions: SessionStore) -> Self {
        Self { users, sessions }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            UserStore::new(RegistrationPolicy::from(config)),
            SessionStore::new(config.session_ttl()),
        )
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// 登录成功返回身份信息和会话ID
    pub fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<(UserSessionInfo, String), AuthError> {
        let user = self
            .users
            .authenticate(&credentials.login, &credentials.password)
            .inspect_err(|_| tracing::debug!("Rejected login attempt for {}", credentials.login))?;

        let user_info = user.session_info();
        let session_id = self.sessions.create(user_info.clone());
        tracing::info!("User {} logged in", user.login);
        Ok((user_info, session_id))
    }

    /// 只注册，不创建会话
    pub fn register(&self, candidate: NewUser) -> Result<PublicUser, ValidationError> {
        let user = self.users.register(candidate)?;
        tracing::info!("Registered user {} with id {}", user.login, user.id);
        Ok(user.to_public())
    }

    /// 注册成功后立即创建会话
    pub fn register_and_login(
        &self,
        candidate: NewUser,
    ) -> Result<(PublicUser, String), ValidationError> {
        let user = self.users.register(candidate)?;
        let session_id = self.sessions.create(user.session_info());
        tracing::info!("Registered user {} with id {} and logged in", user.login, user.id);
        Ok((user.to_public(), session_id))
    }

    pub fn logout(&self, session_id: &str) {
        self.sessions.delete(session_id);
    }

    pub fn who_am_i(&self, session_id: &str) -> Result<UserSessionInfo, SessionError> {
        self.sessions.check(session_id)
    }

    pub fn sweep(&self) -> usize {
        let removed = self.sessions.sweep();
        if removed > 0 {
            tracing::info!("Swept {} expired sessions", removed);
        } else {
            tracing::debug!("Session sweep found nothing to remove");
        }
        removed
    }

    /// 启动后台定时清理任务
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;

    fn test_manager() -> SessionManager {
        SessionManager::new(
            UserStore::new(RegistrationPolicy {
                bcrypt_cost: 4,
                allowed_roles: None,
            }),
            SessionStore::new(Duration::from_secs(600)),
        )
    }

    fn test_user() -> NewUser {
        NewUser {
            login: "testUser".to_string(),
            username: "Test Username".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            role: Some("user".to_string()),
        }
    }

    fn credentials(login: &str, password: &str) -> Credentials {
        Credentials {
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn login_after_register_yields_session() {
        let manager = test_manager();
        let user = manager.register(test_user()).unwrap();
        assert!(manager.sessions().is_empty());

        let (granted, session_id) = manager
            .login(&credentials("testUser", "password123"))
            .unwrap();
        let info = manager.who_am_i(&session_id).unwrap();

        assert_eq!(info.user_id, user.id);
        assert_eq!(info.login, "testUser");
        assert_eq!(granted, info);
    }

    #[test]
    fn login_errors_are_generic() {
        let manager = test_manager();
        manager.register(test_user()).unwrap();

        assert_eq!(
            manager.login(&credentials("testUser", "wrong-password")),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            manager.login(&credentials("nobody", "password123")),
            Err(AuthError::InvalidCredentials)
        );
        assert!(manager.sessions().is_empty());
    }

    #[test]
    fn register_and_login_returns_public_user_and_session() {
        let manager = test_manager();
        let (user, session_id) = manager.register_and_login(test_user()).unwrap();

        assert_eq!(user.login, "testUser");
        assert_eq!(manager.who_am_i(&session_id).unwrap().user_id, user.id);
    }

    #[test]
    fn register_and_login_propagates_validation_error() {
        let manager = test_manager();
        let mut candidate = test_user();
        candidate.password = "123".to_string();

        assert_eq!(
            manager.register_and_login(candidate),
            Err(ValidationError::PasswordTooShort)
        );
        assert!(manager.users().is_empty());
        assert!(manager.sessions().is_empty());
    }

    #[test]
    fn logout_invalidates_session_and_is_idempotent() {
        let manager = test_manager();
        let (_, session_id) = manager.register_and_login(test_user()).unwrap();

        manager.logout(&session_id);
        manager.logout(&session_id);

        assert_eq!(manager.who_am_i(&session_id), Err(SessionError::Invalid));
    }

    #[test]
    fn sweep_reports_removed_count() {
        let manager = test_manager();
        let (user, live) = manager.register_and_login(test_user()).unwrap();
        let now = Utc::now();
        let info = UserSessionInfo {
            user_id: user.id,
            login: user.login.clone(),
        };
        for _ in 0..3 {
            manager.sessions().insert_with_expiration(
                info.clone(),
                now - TimeDelta::minutes(20),
                now - TimeDelta::minutes(10),
            );
        }

        assert_eq!(manager.sweep(), 3);
        assert!(manager.who_am_i(&live).is_ok());
    }

    #[tokio::test]
    async fn sweeper_removes_expired_sessions_in_background() {
        let manager = Arc::new(test_manager());
        let now = Utc::now();
        manager.sessions().insert_with_expiration(
            UserSessionInfo {
                user_id: 1,
                login: "user1".to_string(),
            },
            now - TimeDelta::minutes(20),
            now - TimeDelta::minutes(10),
        );

        let handle = manager.clone().spawn_sweeper(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(manager.sessions().is_empty());
        handle.abort();
    }
}
