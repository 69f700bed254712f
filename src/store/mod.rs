// 会话与凭据核心
// 用户表、会话表各自持有一把读写锁

pub mod manager;
pub mod session;
pub mod user;

pub use manager::SessionManager;
pub use session::{Session, SessionStore, UserSessionInfo};
pub use user::{Credentials, NewUser, PublicUser, RegistrationPolicy, User, UserStore};
