use std::env;
use std::str::FromStr;
use std::time::Duration;

// bcrypt 支持的成本范围
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
    pub cookie_secure: bool,
    pub register_auto_login: bool,
    pub bcrypt_cost: u32,
    /// 为空表示不校验角色
    pub allowed_roles: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
            session_ttl_secs: 600,
            session_sweep_interval_secs: 60,
            cookie_secure: true,
            register_auto_login: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allowed_roles: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            api_base_uri: env::var("API_BASE_URI").unwrap_or(defaults.api_base_uri),
            session_ttl_secs: parse_var("SESSION_TTL_SECS", defaults.session_ttl_secs),
            session_sweep_interval_secs: parse_var(
                "SESSION_SWEEP_INTERVAL_SECS",
                defaults.session_sweep_interval_secs,
            ),
            cookie_secure: parse_var("COOKIE_SECURE", defaults.cookie_secure),
            register_auto_login: parse_var("REGISTER_AUTO_LOGIN", defaults.register_auto_login),
            bcrypt_cost: checked_bcrypt_cost(parse_var("BCRYPT_COST", defaults.bcrypt_cost)),
            allowed_roles: env::var("ALLOWED_ROLES").ok().map(|raw| parse_roles(&raw)),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// 至少 1 秒
    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs.max(1))
    }
}

// 解析失败时回退到默认值
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn checked_bcrypt_cost(cost: u32) -> u32 {
    if BCRYPT_COST_RANGE.contains(&cost) {
        cost
    } else {
        tracing::warn!(
            "BCRYPT_COST {} outside {:?}, using default {}",
            cost,
            BCRYPT_COST_RANGE,
            bcrypt::DEFAULT_COST
        );
        bcrypt::DEFAULT_COST
    }
}

fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}
