use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AuthError, ValidationError};
use crate::store::session::UserSessionInfo;
use crate::utils::{hash_password, verify_password};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("valid email pattern")
});

const MIN_LOGIN_LEN: usize = 3;
const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

// 登录名不存在时用于校验的占位密码
const DUMMY_PASSWORD: &str = "not-a-real-password";

/// 已注册用户，密码只保存 bcrypt 哈希
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// 注册请求字段
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub login: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// 登录凭据
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// 可以返回给客户端的用户字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: u64,
    pub login: String,
    pub username: String,
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            login: self.login.clone(),
            username: self.username.clone(),
        }
    }

    pub fn session_info(&self) -> UserSessionInfo {
        UserSessionInfo {
            user_id: self.id,
            login: self.login.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationPolicy {
    pub bcrypt_cost: u32,
    pub allowed_roles: Option<Vec<String>>,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allowed_roles: None,
        }
    }
}

impl From<&Config> for RegistrationPolicy {
    fn from(config: &Config) -> Self {
        Self {
            bcrypt_cost: config.bcrypt_cost,
            allowed_roles: config.allowed_roles.clone(),
        }
    }
}

#[derive(Debug)]
struct UserTable {
    users: HashMap<String, User>,
    next_user_id: u64,
}

/// 内存用户表，按登录名索引
#[derive(Debug)]
pub struct UserStore {
    table: RwLock<UserTable>,
    policy: RegistrationPolicy,
    /// 与真实密码同成本的哈希，未知登录名也要完整跑一次 bcrypt
    dummy_hash: String,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new(RegistrationPolicy::default())
    }
}

impl UserStore {
    pub fn new(policy: RegistrationPolicy) -> Self {
        let dummy_hash = hash_password(DUMMY_PASSWORD, policy.bcrypt_cost).unwrap_or_else(|e| {
            tracing::error!("Failed to prepare dummy password hash: {}", e);
            String::new()
        });

        Self {
            table: RwLock::new(UserTable {
                users: HashMap::new(),
                next_user_id: 1,
            }),
            policy,
            dummy_hash,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, UserTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 注册新用户，失败时用户表保持不变
    ///
    /// 哈希计算在锁外进行，插入前在写锁内重新检查登录名，
    /// 两个并发的同名注册只会有一个成功。
    pub fn register(&self, candidate: NewUser) -> Result<User, ValidationError> {
        validate_new_user(&candidate, &self.read().users, &self.policy)?;

        let password_hash =
            hash_password(&candidate.password, self.policy.bcrypt_cost).map_err(|e| {
                tracing::error!("Failed to hash password for {}: {}", candidate.login, e);
                ValidationError::Internal
            })?;

        let mut table = self.write();
        if table.users.contains_key(&candidate.login) {
            return Err(ValidationError::DuplicateLogin);
        }

        let user = User {
            id: table.next_user_id,
            login: candidate.login,
            username: candidate.username,
            email: candidate.email,
            password_hash,
            role: candidate.role,
        };
        table.next_user_id += 1;
        table.users.insert(user.login.clone(), user.clone());

        Ok(user)
    }

    /// 校验登录凭据，未知登录名和密码错误返回同一个错误
    ///
    /// 未知登录名同样对占位哈希做一次校验，两条路径耗时相近。
    pub fn authenticate(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.read().users.get(login).cloned() else {
            let _ = verify_password(password, &self.dummy_hash);
            return Err(AuthError::InvalidCredentials);
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                tracing::error!("Failed to verify password for {}: {}", login, e);
                Err(AuthError::Hashing)
            }
        }
    }

    pub fn find(&self, login: &str) -> Option<User> {
        self.read().users.get(login).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 按顺序校验，返回第一个失败的规则
fn validate_new_user(
    candidate: &NewUser,
    users: &HashMap<String, User>,
    policy: &RegistrationPolicy,
) -> Result<(), ValidationError> {
    if !EMAIL_REGEX.is_match(&candidate.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if candidate.login.chars().count() < MIN_LOGIN_LEN {
        return Err(ValidationError::LoginTooShort);
    }
    if users.contains_key(&candidate.login) {
        return Err(ValidationError::DuplicateLogin);
    }
    if candidate.username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if candidate.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if let (Some(allowed), Some(role)) = (&policy.allowed_roles, &candidate.role) {
        if !allowed.iter().any(|r| r == role) {
            return Err(ValidationError::RoleNotAllowed(role.clone()));
        }
    }
    Ok(())
}
